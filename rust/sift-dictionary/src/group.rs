//! Sequential decoding of the entries of one group.

use sift_common::{Result, verify_data};
use sift_encodings::varbyte::ByteCursor;

use crate::codec::ValueCodec;

/// Key bytes of a decoded entry, as stored.
pub(crate) enum EntryKey<'a> {
    /// First entry of a group.
    Verbatim(&'a [u8]),
    /// Any other entry: `prefix` bytes shared with the previous key, then `suffix`.
    Coded { prefix: usize, suffix: &'a [u8] },
}

impl EntryKey<'_> {
    /// Replaces the previous key held in `key` with this entry's key.
    pub fn apply_to(&self, key: &mut Vec<u8>) -> Result<()> {
        match *self {
            EntryKey::Verbatim(bytes) => {
                key.clear();
                key.extend_from_slice(bytes);
            }
            EntryKey::Coded { prefix, suffix } => {
                verify_data!(prefix, prefix <= key.len());
                key.truncate(prefix);
                key.extend_from_slice(suffix);
            }
        }
        Ok(())
    }
}

pub(crate) struct GroupReader<'a, C> {
    cursor: ByteCursor<'a>,
    codec: C,
    remaining: usize,
    first: bool,
}

impl<'a, C: ValueCodec> GroupReader<'a, C> {
    /// Positions a reader on `data[start..end]`, holding `entries` entries whose
    /// first insertion rank is `first_ordinal`.
    pub fn new(
        data: &'a [u8],
        start: usize,
        end: usize,
        first_ordinal: usize,
        entries: usize,
    ) -> Result<GroupReader<'a, C>> {
        let cursor = ByteCursor::with_range(data, start, end)?;
        let mut codec = C::default();
        codec.start_group(first_ordinal);
        Ok(GroupReader {
            cursor,
            codec,
            remaining: entries,
            first: true,
        })
    }

    pub fn next_entry(&mut self) -> Result<Option<(EntryKey<'a>, u64)>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        let key = if self.first {
            self.first = false;
            EntryKey::Verbatim(self.cursor.read_zero_terminated()?)
        } else {
            let (prefix, suffix_len) = self.cursor.read_packed_pair()?;
            let suffix = self.cursor.read_bytes(suffix_len as usize)?;
            EntryKey::Coded {
                prefix: prefix as usize,
                suffix,
            }
        };
        let value = self.codec.read(&mut self.cursor)?;
        self.remaining -= 1;
        Ok(Some((key, value)))
    }
}
