use std::{
    io::{self, Read},
    ops::Range,
};

/// Clips `range` to a source of `size` bytes.
pub fn clamp_range(range: Range<u64>, size: u64) -> io::Result<Range<u64>> {
    if range.start > range.end {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("inverted range {}..{}", range.start, range.end),
        ));
    }
    let start = range.start.min(size);
    Ok(start..range.end.min(size))
}

/// Fills `buffer` from `source`, stopping early only at end of stream.
/// Returns the number of bytes placed in `buffer`.
pub fn read_fully<R: Read>(mut source: R, buffer: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match source.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
