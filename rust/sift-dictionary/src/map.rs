use std::{cmp::Ordering, marker::PhantomData};

use sift_common::{Result, error::Error, try_or_ret_some_err, verify_arg, verify_data};
use sift_encodings::varbyte::ByteCursor;

use crate::{
    builder::common_prefix_len,
    codec::ValueCodec,
    group::{EntryKey, GroupReader},
};

/// An immutable sorted map from byte-string keys to `u64` values.
///
/// The map owns two buffers: the skip array (one offset per group plus the
/// end-of-data sentinel) and the data block (all groups followed by one zero
/// byte). Lookups never allocate except for key reconstruction.
pub struct SortedStringMap<C: ValueCodec> {
    skips: Vec<u32>,
    data: Vec<u8>,
    group_size: usize,
    len: usize,
    positional: bool,
    _codec: PhantomData<fn() -> C>,
}

impl<C: ValueCodec> SortedStringMap<C> {
    pub(crate) fn from_parts(
        skips: Vec<u32>,
        data: Vec<u8>,
        group_size: usize,
        len: usize,
        positional: bool,
    ) -> SortedStringMap<C> {
        SortedStringMap {
            skips,
            data,
            group_size,
            len,
            positional,
            _codec: PhantomData,
        }
    }

    /// Marks the map as positional, disabling key lookups.
    ///
    /// Used for maps loaded from storage whose keys were added out of order.
    pub fn into_positional(mut self) -> Self {
        self.positional = true;
        self
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn group_size(&self) -> usize {
        self.group_size
    }

    pub fn group_count(&self) -> usize {
        self.skips.len() - 1
    }

    pub fn is_positional(&self) -> bool {
        self.positional
    }

    /// Memory held by the skip array and the data block.
    pub fn size_in_bytes(&self) -> usize {
        self.skips.len() * 4 + self.data.len()
    }

    #[cfg(test)]
    pub(crate) fn raw_parts(&self) -> (&[u32], &[u8]) {
        (&self.skips, &self.data)
    }

    pub(crate) fn skips(&self) -> &[u32] {
        &self.skips
    }

    pub(crate) fn data(&self) -> &[u8] {
        &self.data
    }

    /// Looks up the value stored for `key`.
    ///
    /// Returns `Ok(None)` when the key is absent. Fails with an invalid operation
    /// error on a positional map.
    pub fn get(&self, key: &[u8]) -> Result<Option<u64>> {
        if self.positional {
            return Err(Error::invalid_operation("key lookup on a positional map"));
        }
        let Some(group) = self.find_group(key)? else {
            return Ok(None);
        };
        let mut reader = self.group_reader(group)?;

        let Some((EntryKey::Verbatim(first), value)) = reader.next_entry()? else {
            return Err(Error::invalid_format("sorted map", "group without a first key"));
        };
        let mut matched = common_prefix_len(first, key);
        if matched == key.len() && matched == first.len() {
            return Ok(Some(value));
        }

        // `matched` is the length of the common prefix of `key` and the last
        // decoded key, which is always smaller than `key`.
        while let Some((entry, value)) = reader.next_entry()? {
            let EntryKey::Coded { prefix, suffix } = entry else {
                return Err(Error::invalid_format("sorted map", "unexpected verbatim key"));
            };
            match prefix.cmp(&matched) {
                // Shares the byte where the previous key fell below `key`.
                Ordering::Greater => continue,
                // Differs from the previous key at a position where that key
                // matched, so it is past `key`.
                Ordering::Less => return Ok(None),
                Ordering::Equal => {}
            }
            let rest = &key[matched..];
            let common = common_prefix_len(suffix, rest);
            if common == suffix.len() {
                if common == rest.len() {
                    return Ok(Some(value));
                }
                // A proper prefix of `key`.
                matched += common;
                continue;
            }
            if common == rest.len() || suffix[common] > rest[common] {
                return Ok(None);
            }
            matched += common;
        }
        Ok(None)
    }

    /// Returns the value of the entry with insertion rank `id`.
    pub fn value_at(&self, id: usize) -> Result<u64> {
        self.entry_at(id, |_| Ok(()))
    }

    /// Reconstructs the key of the entry with insertion rank `id`.
    pub fn key_at(&self, id: usize) -> Result<Vec<u8>> {
        let mut key = Vec::new();
        self.entry_at(id, |entry| entry.apply_to(&mut key))?;
        Ok(key)
    }

    /// Like [`key_at`](Self::key_at), keeping at most `capacity` bytes of the key.
    pub fn key_at_truncated(&self, id: usize, capacity: usize) -> Result<Vec<u8>> {
        let mut key = self.key_at(id)?;
        key.truncate(capacity);
        Ok(key)
    }

    /// Iterates over all `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> Iter<'_, C> {
        Iter {
            map: self,
            group: 0,
            reader: None,
            key: Vec::new(),
        }
    }

    fn entry_at(
        &self,
        id: usize,
        mut on_key: impl FnMut(&EntryKey) -> Result<()>,
    ) -> Result<u64> {
        verify_arg!(id, id < self.len);
        let mut reader = self.group_reader(id / self.group_size)?;
        for _ in 0..id % self.group_size {
            let (entry, _) = reader.next_entry()?.ok_or_else(truncated_group)?;
            on_key(&entry)?;
        }
        let (entry, value) = reader.next_entry()?.ok_or_else(truncated_group)?;
        on_key(&entry)?;
        Ok(value)
    }

    /// Returns the last group whose first key is not greater than `key`.
    fn find_group(&self, key: &[u8]) -> Result<Option<usize>> {
        let mut lo = 0;
        let mut hi = self.group_count();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.group_first_key(mid)? <= key {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        Ok(lo.checked_sub(1))
    }

    fn group_first_key(&self, group: usize) -> Result<&[u8]> {
        let start = self.skips[group] as usize;
        let end = self.skips[group + 1] as usize;
        ByteCursor::with_range(&self.data, start, end)?.read_zero_terminated()
    }

    fn group_reader(&self, group: usize) -> Result<GroupReader<'_, C>> {
        verify_data!(group, group < self.group_count());
        let first_ordinal = group * self.group_size;
        let entries = self.group_size.min(self.len - first_ordinal);
        GroupReader::new(
            &self.data,
            self.skips[group] as usize,
            self.skips[group + 1] as usize,
            first_ordinal,
            entries,
        )
    }
}

impl<C: ValueCodec> std::fmt::Debug for SortedStringMap<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SortedStringMap")
            .field("codec", &C::FORMAT_TAG)
            .field("len", &self.len)
            .field("group_size", &self.group_size)
            .field("groups", &self.group_count())
            .field("data_size", &self.data.len())
            .field("positional", &self.positional)
            .finish()
    }
}

#[cold]
fn truncated_group() -> Error {
    Error::invalid_format("sorted map", "group ends before its last entry")
}

/// Iterator over the entries of a [`SortedStringMap`] in insertion order.
pub struct Iter<'a, C: ValueCodec> {
    map: &'a SortedStringMap<C>,
    group: usize,
    reader: Option<GroupReader<'a, C>>,
    key: Vec<u8>,
}

impl<C: ValueCodec> Iterator for Iter<'_, C> {
    type Item = Result<(Vec<u8>, u64)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.reader.is_none() {
                if self.group >= self.map.group_count() {
                    return None;
                }
                let reader = self.map.group_reader(self.group);
                self.group += 1;
                self.reader = Some(try_or_ret_some_err!(reader));
            }
            let reader = self.reader.as_mut()?;
            match reader.next_entry() {
                Ok(Some((entry, value))) => {
                    try_or_ret_some_err!(entry.apply_to(&mut self.key));
                    return Some(Ok((self.key.clone(), value)));
                }
                Ok(None) => self.reader = None,
                Err(e) => {
                    self.group = self.map.group_count();
                    self.reader = None;
                    return Some(Err(e));
                }
            }
        }
    }
}
