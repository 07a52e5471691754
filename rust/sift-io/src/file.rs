use std::{fs::File, io, ops::Range, path::Path};

use crate::{ReadAt, utils::clamp_range};

/// A read-only file served by positional reads, so that point lookups from
/// several threads need no seeking or locking. The size is taken once at open:
/// index files are never modified in place.
pub struct FileReader {
    file: File,
    size: u64,
}

impl FileReader {
    pub fn open(path: impl AsRef<Path>) -> io::Result<FileReader> {
        FileReader::new(File::open(path)?)
    }

    pub fn new(file: File) -> io::Result<FileReader> {
        let size = file.metadata()?.len();
        Ok(FileReader { file, size })
    }
}

impl ReadAt for FileReader {
    fn size(&self) -> io::Result<u64> {
        Ok(self.size)
    }

    fn read_at(&self, range: Range<u64>) -> io::Result<Vec<u8>> {
        let range = clamp_range(range, self.size)?;
        let mut buf = vec![0u8; (range.end - range.start) as usize];
        if !buf.is_empty() {
            read_exact_at(&self.file, &mut buf, range.start)?;
        }
        Ok(buf)
    }
}

#[cfg(unix)]
fn read_exact_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<()> {
    std::os::unix::fs::FileExt::read_exact_at(file, buf, offset)
}

#[cfg(windows)]
fn read_exact_at(file: &File, mut buf: &mut [u8], mut offset: u64) -> io::Result<()> {
    use std::os::windows::fs::FileExt;

    while !buf.is_empty() {
        let n = file.seek_read(buf, offset)?;
        if n == 0 {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
        buf = &mut buf[n..];
        offset += n as u64;
    }
    Ok(())
}
