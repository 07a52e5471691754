//! Compact, immutable sorted string-to-integer maps.
//!
//! A [`SortedStringMap`] stores its keys front-coded in fixed-cardinality groups.
//! The first key of every group is kept verbatim and is reachable through a sparse
//! array of group offsets (the skip array), which makes key lookups a binary search
//! over groups followed by a short linear decode inside one group. Values are
//! stored next to their keys through a [`ValueCodec`]:
//!
//! - [`Identity`]: nothing is stored, the value of a key is its insertion rank;
//! - [`Raw`]: the value is stored as a varint;
//! - [`Delta`]: the difference to the previous value of the group is stored.
//!
//! Maps are produced once by a [`SortedStringMapBuilder`] and are read-only
//! afterwards. See [`SortedStringMap::persist`] for the storage format.

pub mod builder;
pub mod codec;
mod group;
pub mod map;
mod storage;

pub use builder::SortedStringMapBuilder;
pub use codec::{Delta, Identity, Raw, ValueCodec};
pub use map::{Iter, SortedStringMap};

/// Number of entries per group unless configured otherwise.
pub const DEFAULT_GROUP_SIZE: usize = 16;

/// A map whose values are the insertion ranks of its keys.
pub type RankMap = SortedStringMap<Identity>;

/// A map storing arbitrary integer values.
pub type RawMap = SortedStringMap<Raw>;

/// A map storing mostly increasing integer values (such as file offsets).
pub type DeltaMap = SortedStringMap<Delta>;
