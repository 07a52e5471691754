use sift_common::{Result, error::Error, verify_arg};
use sift_encodings::varbyte::write_packed_pair;

use crate::{DEFAULT_GROUP_SIZE, codec::ValueCodec, map::SortedStringMap};

/// Builds a [`SortedStringMap`] from keys added in increasing byte order.
///
/// Every `group_size` entries a new group is started: its offset is recorded in
/// the skip array and its first key is written verbatim. The remaining entries of
/// a group are front-coded against the key added just before them.
///
/// In positional mode the ordering requirement is lifted. The resulting map can
/// then only be addressed by insertion rank.
pub struct SortedStringMapBuilder<C: ValueCodec> {
    codec: C,
    skips: Vec<u32>,
    data: Vec<u8>,
    group_size: usize,
    len: usize,
    last_key: Vec<u8>,
    positional: bool,
}

impl<C: ValueCodec> Default for SortedStringMapBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ValueCodec> SortedStringMapBuilder<C> {
    pub fn new() -> SortedStringMapBuilder<C> {
        SortedStringMapBuilder {
            codec: C::default(),
            skips: Vec::new(),
            data: Vec::new(),
            group_size: DEFAULT_GROUP_SIZE,
            len: 0,
            last_key: Vec::new(),
            positional: false,
        }
    }

    pub fn with_group_size(group_size: usize) -> Result<SortedStringMapBuilder<C>> {
        verify_arg!(group_size, group_size >= 1 && group_size <= u32::MAX as usize);
        Ok(SortedStringMapBuilder {
            group_size,
            ..Self::new()
        })
    }

    /// Switches the builder to positional mode: keys may arrive in any order.
    pub fn positional(mut self) -> Self {
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

    /// Size of the encoded entries so far.
    pub fn data_size(&self) -> usize {
        self.data.len()
    }

    /// Appends an entry.
    ///
    /// Fails when `key` contains a zero byte, or (outside positional mode) when it
    /// is not strictly greater than the previously added key.
    pub fn add(&mut self, key: &[u8], value: C::Input) -> Result<()> {
        if key.contains(&0) {
            return Err(Error::invalid_arg("key", "contains a zero byte"));
        }
        if !self.positional && self.len > 0 && key <= self.last_key.as_slice() {
            return Err(Error::invalid_arg(
                "key",
                format!(
                    "'{}' does not follow '{}'",
                    String::from_utf8_lossy(key),
                    String::from_utf8_lossy(&self.last_key)
                ),
            ));
        }
        verify_arg!(key, key.len() < u32::MAX as usize);

        if self.len % self.group_size == 0 {
            let offset = self.offset()?;
            self.skips.push(offset);
            self.codec.start_group(self.len);
            self.data.extend_from_slice(key);
            self.data.push(0);
        } else {
            let prefix = common_prefix_len(&self.last_key, key);
            write_packed_pair(&mut self.data, prefix as u32, (key.len() - prefix) as u32);
            self.data.extend_from_slice(&key[prefix..]);
        }
        self.codec.write(value, &mut self.data);

        self.last_key.clear();
        self.last_key.extend_from_slice(key);
        self.len += 1;
        Ok(())
    }

    /// Seals the map: records the end-of-data offset and the trailing zero byte.
    pub fn finish(mut self) -> Result<SortedStringMap<C>> {
        let end = self.offset()?;
        self.skips.push(end);
        self.data.push(0);
        self.data.shrink_to_fit();
        Ok(SortedStringMap::from_parts(
            self.skips,
            self.data,
            self.group_size,
            self.len,
            self.positional,
        ))
    }

    fn offset(&self) -> Result<u32> {
        u32::try_from(self.data.len())
            .map_err(|_| Error::invalid_operation("map data exceeds 4 GiB"))
    }
}

pub(crate) fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}
