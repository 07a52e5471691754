//! Variable-byte integer encoding.
//!
//! Integers are split into 7-bit groups written most significant group first.
//! Every byte except the last carries the continuation flag `0x80`. A `u64` takes
//! at most [`MAX_VARINT_LEN`] bytes.
//!
//! The packed pair stores two small integers in the two nibbles of one byte; a
//! nibble value of 15 means "15 or more" and is followed by a varint holding the
//! excess (first for the high nibble, then for the low one).

use sift_common::{Result, error::Error};

/// Maximum encoded length of a `u64` varint.
pub const MAX_VARINT_LEN: usize = 10;

const CONTINUATION: u8 = 0x80;
const PAYLOAD: u8 = 0x7F;
const NIBBLE_OVERFLOW: u32 = 15;

/// Appends `value` to `out` as a varint.
pub fn write_varint(out: &mut Vec<u8>, value: u64) {
    let mut tmp = [0u8; MAX_VARINT_LEN];
    let mut pos = MAX_VARINT_LEN - 1;
    let mut v = value;
    tmp[pos] = (v as u8) & PAYLOAD;
    v >>= 7;
    while v != 0 {
        pos -= 1;
        tmp[pos] = ((v as u8) & PAYLOAD) | CONTINUATION;
        v >>= 7;
    }
    out.extend_from_slice(&tmp[pos..]);
}

/// Returns the number of bytes [`write_varint`] emits for `value`.
pub fn varint_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}

/// Appends the packed `(a, b)` pair to `out`.
pub fn write_packed_pair(out: &mut Vec<u8>, a: u32, b: u32) {
    let hi = a.min(NIBBLE_OVERFLOW) as u8;
    let lo = b.min(NIBBLE_OVERFLOW) as u8;
    out.push((hi << 4) | lo);
    if a >= NIBBLE_OVERFLOW {
        write_varint(out, (a - NIBBLE_OVERFLOW) as u64);
    }
    if b >= NIBBLE_OVERFLOW {
        write_varint(out, (b - NIBBLE_OVERFLOW) as u64);
    }
}

/// A bounds-checked read position over a borrowed byte buffer.
///
/// All reads advance the position; reading past the end of the buffer is reported
/// as a format error rather than a panic.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> ByteCursor<'a> {
        ByteCursor { data, pos: 0 }
    }

    /// Creates a cursor over `data[..end]` positioned at `start`.
    pub fn with_range(data: &'a [u8], start: usize, end: usize) -> Result<ByteCursor<'a>> {
        if start > end || end > data.len() {
            return Err(Error::invalid_format(
                "cursor",
                format!("range {start}..{end} outside of {} bytes", data.len()),
            ));
        }
        Ok(ByteCursor {
            data: &data[..end],
            pos: start,
        })
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Returns the unread part of the buffer without consuming it.
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Moves the position to the end of the buffer.
    pub fn skip_to_end(&mut self) {
        self.pos = self.data.len();
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        match self.data.get(self.pos) {
            Some(&b) => {
                self.pos += 1;
                Ok(b)
            }
            None => Err(unexpected_end("byte")),
        }
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(unexpected_end("bytes"));
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.read_bytes(len).map(|_| ())
    }

    /// Reads bytes up to (not including) the next zero byte and consumes the terminator.
    pub fn read_zero_terminated(&mut self) -> Result<&'a [u8]> {
        let rest = self.rest();
        match rest.iter().position(|&b| b == 0) {
            Some(len) => {
                self.pos += len + 1;
                Ok(&rest[..len])
            }
            None => Err(unexpected_end("zero-terminated string")),
        }
    }

    pub fn read_varint(&mut self) -> Result<u64> {
        let mut value = 0u64;
        for _ in 0..MAX_VARINT_LEN {
            let byte = self.read_u8()?;
            if value > (u64::MAX >> 7) {
                return Err(Error::invalid_format("varint", "value exceeds 64 bits"));
            }
            value = (value << 7) | (byte & PAYLOAD) as u64;
            if byte & CONTINUATION == 0 {
                return Ok(value);
            }
        }
        Err(Error::invalid_format(
            "varint",
            format!("longer than {MAX_VARINT_LEN} bytes"),
        ))
    }

    pub fn read_varint_u32(&mut self) -> Result<u32> {
        let value = self.read_varint()?;
        u32::try_from(value)
            .map_err(|_| Error::invalid_format("varint", format!("{value} exceeds 32 bits")))
    }

    pub fn read_packed_pair(&mut self) -> Result<(u32, u32)> {
        let byte = self.read_u8()?;
        let mut a = (byte >> 4) as u32;
        let mut b = (byte & 0x0F) as u32;
        if a == NIBBLE_OVERFLOW {
            a = a
                .checked_add(self.read_varint_u32()?)
                .ok_or_else(|| Error::invalid_format("packed pair", "length overflow"))?;
        }
        if b == NIBBLE_OVERFLOW {
            b = b
                .checked_add(self.read_varint_u32()?)
                .ok_or_else(|| Error::invalid_format("packed pair", "length overflow"))?;
        }
        Ok((a, b))
    }
}

#[cold]
fn unexpected_end(what: &str) -> Error {
    Error::invalid_format(what, "unexpected end of buffer")
}
