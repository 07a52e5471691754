use std::{io, ops::Range};

use crate::{ReadAt, utils::clamp_range};

impl ReadAt for Vec<u8> {
    fn size(&self) -> io::Result<u64> {
        Ok(self.len() as u64)
    }

    fn read_at(&self, range: Range<u64>) -> io::Result<Vec<u8>> {
        let range = clamp_range(range, self.len() as u64)?;
        Ok(self[range.start as usize..range.end as usize].to_vec())
    }
}
