//! Persisted form of a [`SortedStringMap`].
//!
//! ```text
//! <tag>\n
//! <skip_len>\t<data_len>\t<group_size>\t<len>\n
//! <skip_len little-endian u32 offsets>\n
//! <data_len bytes of data>\n
//! ```

use std::io::{BufRead, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use sift_common::{Result, error::Error};

use crate::{codec::ValueCodec, map::SortedStringMap};

impl<C: ValueCodec> SortedStringMap<C> {
    /// Writes the map to `sink` in its persisted form.
    pub fn persist<W: Write>(&self, sink: &mut W) -> Result<()> {
        let skips = self.skips();
        let data = self.data();
        write!(
            sink,
            "{}\n{}\t{}\t{}\t{}\n",
            C::FORMAT_TAG,
            skips.len(),
            data.len(),
            self.group_size(),
            self.len()
        )?;
        for &offset in skips {
            sink.write_u32::<LittleEndian>(offset)?;
        }
        sink.write_all(b"\n")?;
        sink.write_all(data)?;
        sink.write_all(b"\n")?;
        Ok(())
    }

    /// Reads a map previously written by [`persist`](Self::persist).
    ///
    /// `name` identifies the map in error messages. The source is left positioned
    /// right after the map, so several maps can be read from one stream.
    pub fn load<R: BufRead>(source: &mut R, name: &str) -> Result<SortedStringMap<C>> {
        let tag = read_line(source, name)?;
        if tag != C::FORMAT_TAG {
            return Err(Error::invalid_format(
                name,
                format!("expected tag '{}', found '{tag}'", C::FORMAT_TAG),
            ));
        }

        let header = read_line(source, name)?;
        let fields = header
            .split('\t')
            .map(|f| f.parse::<usize>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::invalid_format(name, format!("bad header '{header}': {e}")))?;
        let [skip_len, data_len, group_size, len] = fields[..] else {
            return Err(Error::invalid_format(
                name,
                format!("expected 4 header fields, found '{header}'"),
            ));
        };
        if group_size == 0 {
            return Err(Error::invalid_format(name, "group size is zero"));
        }
        if skip_len != len.div_ceil(group_size) + 1 {
            return Err(Error::invalid_format(
                name,
                format!("{skip_len} group offsets for {len} entries in groups of {group_size}"),
            ));
        }
        if data_len == 0 || u32::try_from(data_len - 1).is_err() {
            return Err(Error::invalid_format(name, format!("data size {data_len}")));
        }

        let mut skips = vec![0u32; skip_len];
        source
            .read_u32_into::<LittleEndian>(&mut skips)
            .map_err(|e| read_error(name, e))?;
        expect_newline(source, name)?;

        let mut data = vec![0u8; data_len];
        source.read_exact(&mut data).map_err(|e| read_error(name, e))?;
        expect_newline(source, name)?;

        validate_layout(&skips, &data, name)?;
        log::debug!(
            "loaded {name}: {len} entries in {} groups, {data_len} data bytes",
            skip_len - 1
        );
        Ok(SortedStringMap::from_parts(skips, data, group_size, len, false))
    }
}

/// Checks that the group offsets are increasing and end at the trailing zero byte.
fn validate_layout(skips: &[u32], data: &[u8], name: &str) -> Result<()> {
    let end = data.len() - 1;
    if data[end] != 0 {
        return Err(Error::invalid_format(name, "missing trailing zero byte"));
    }
    let sentinel = *skips.last().unwrap_or(&0) as usize;
    if sentinel != end {
        return Err(Error::invalid_format(
            name,
            format!("end offset {sentinel} does not match data size {}", data.len()),
        ));
    }
    if skips.len() > 1 && skips[0] != 0 {
        return Err(Error::invalid_format(name, "first group does not start at zero"));
    }
    if let Some(w) = skips.windows(2).find(|w| w[0] >= w[1]) {
        return Err(Error::invalid_format(
            name,
            format!("group offsets {} and {} are not increasing", w[0], w[1]),
        ));
    }
    Ok(())
}

fn read_line<R: BufRead>(source: &mut R, name: &str) -> Result<String> {
    let mut line = Vec::new();
    source
        .read_until(b'\n', &mut line)
        .map_err(|e| Error::io(name, e))?;
    if line.pop() != Some(b'\n') {
        return Err(Error::invalid_format(name, "unexpected end of file"));
    }
    String::from_utf8(line).map_err(|_| Error::invalid_format(name, "header is not UTF-8"))
}

fn expect_newline<R: Read>(source: &mut R, name: &str) -> Result<()> {
    let byte = source.read_u8().map_err(|e| read_error(name, e))?;
    if byte != b'\n' {
        return Err(Error::invalid_format(name, "missing section separator"));
    }
    Ok(())
}

fn read_error(name: &str, e: std::io::Error) -> Error {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        Error::invalid_format(name, "unexpected end of file")
    } else {
        Error::io(name, e)
    }
}
