//! Value codecs of a [`SortedStringMap`](crate::SortedStringMap).
//!
//! A codec is a small stateful object driven in lock-step with the key decoder.
//! Both the writer and the reader call [`ValueCodec::start_group`] at the start of
//! every group, so each group can be decoded without looking at its predecessors.

use sift_common::Result;
use sift_encodings::varbyte::{ByteCursor, write_varint};

pub trait ValueCodec: Default + Clone + Send + Sync + 'static {
    /// The value accepted by the builder for each key.
    type Input: Copy;

    /// Tag written in the first line of the persisted map.
    const FORMAT_TAG: &'static str;

    /// Resets the codec state at a group boundary. `first_ordinal` is the
    /// insertion rank of the first entry of the group.
    fn start_group(&mut self, first_ordinal: usize);

    fn write(&mut self, value: Self::Input, out: &mut Vec<u8>);

    fn read(&mut self, cursor: &mut ByteCursor) -> Result<u64>;
}

/// Stores no value. Reading yields the insertion rank of the entry.
#[derive(Debug, Default, Clone)]
pub struct Identity {
    next_rank: u64,
}

impl ValueCodec for Identity {
    type Input = ();

    const FORMAT_TAG: &'static str = "sorted-map.rank.1";

    fn start_group(&mut self, first_ordinal: usize) {
        self.next_rank = first_ordinal as u64;
    }

    fn write(&mut self, _value: (), _out: &mut Vec<u8>) {}

    fn read(&mut self, _cursor: &mut ByteCursor) -> Result<u64> {
        let rank = self.next_rank;
        self.next_rank += 1;
        Ok(rank)
    }
}

/// Stores every value verbatim as a varint.
#[derive(Debug, Default, Clone)]
pub struct Raw;

impl ValueCodec for Raw {
    type Input = u64;

    const FORMAT_TAG: &'static str = "sorted-map.raw.1";

    fn start_group(&mut self, _first_ordinal: usize) {}

    fn write(&mut self, value: u64, out: &mut Vec<u8>) {
        write_varint(out, value);
    }

    fn read(&mut self, cursor: &mut ByteCursor) -> Result<u64> {
        cursor.read_varint()
    }
}

/// Stores the difference to the previous value of the same group.
///
/// Arithmetic wraps, so decreasing sequences are representable; they just do not
/// compress.
#[derive(Debug, Default, Clone)]
pub struct Delta {
    last: u64,
}

impl ValueCodec for Delta {
    type Input = u64;

    const FORMAT_TAG: &'static str = "sorted-map.delta.1";

    fn start_group(&mut self, _first_ordinal: usize) {
        self.last = 0;
    }

    fn write(&mut self, value: u64, out: &mut Vec<u8>) {
        write_varint(out, value.wrapping_sub(self.last));
        self.last = value;
    }

    fn read(&mut self, cursor: &mut ByteCursor) -> Result<u64> {
        self.last = self.last.wrapping_add(cursor.read_varint()?);
        Ok(self.last)
    }
}
