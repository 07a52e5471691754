//! Positional reads over postings files.
//!
//! The query side never scans a postings file: every term costs one
//! [`ReadAt::read_at`] of its record. [`FileReader`] serves those reads from
//! disk; a `Vec<u8>` serves them from memory in tests and tools.

use std::{io, ops::Range};

pub mod file;
pub mod memory;
pub mod utils;

pub use file::FileReader;

/// Random-access byte source of a known, fixed size.
pub trait ReadAt: Send + Sync + 'static {
    fn size(&self) -> io::Result<u64>;

    /// Reads the bytes in `range`. The result is shorter than requested only
    /// when the range extends past the end of the source; a range starting at
    /// or after the end yields no bytes. An inverted range is an error.
    fn read_at(&self, range: Range<u64>) -> io::Result<Vec<u8>>;
}
