//! Posting list codec.
//!
//! Layout of an encoded list:
//!
//! ```text
//! varint count
//! varint last_doc_id          (only when count > 1)
//! (varint delta, varint freq) * count
//! ```
//!
//! The first delta is the absolute id of the first document; every following
//! delta is the distance to the previous document id. Document ids are strictly
//! increasing and every frequency is at least 1.

use sift_common::{Result, error::Error, try_or_ret_some_err, verify_arg, verify_data};

use crate::varbyte::{ByteCursor, write_varint};

/// A single `(document, term frequency)` entry of a posting list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Posting {
    pub doc_id: u32,
    pub freq: u32,
}

impl Posting {
    pub fn new(doc_id: u32, freq: u32) -> Posting {
        Posting { doc_id, freq }
    }
}

/// Encodes a complete posting list.
///
/// Fails with an invalid argument error when `postings` is empty, when the
/// document ids are not strictly increasing, or when a frequency is zero.
pub fn encode(postings: &[Posting]) -> Result<Vec<u8>> {
    verify_arg!(postings, !postings.is_empty());
    let mut builder = PostingListBuilder::new();
    for posting in postings {
        builder.push(posting.doc_id, posting.freq)?;
    }
    builder.finish()
}

/// Decodes a complete posting list.
pub fn decode(buf: &[u8]) -> Result<Vec<Posting>> {
    PostingDecoder::new(buf)?.collect()
}

/// Incrementally accumulates a posting list in document order.
///
/// The `(delta, freq)` body is encoded as postings arrive, so memory use is
/// proportional to the compressed size. The header is produced by
/// [`finish`](Self::finish) once the count and last id are known.
#[derive(Debug, Default, Clone)]
pub struct PostingListBuilder {
    body: Vec<u8>,
    len: u32,
    last_doc_id: Option<u32>,
}

impl PostingListBuilder {
    pub fn new() -> PostingListBuilder {
        Default::default()
    }

    pub fn push(&mut self, doc_id: u32, freq: u32) -> Result<()> {
        verify_arg!(freq, freq >= 1);
        let delta = match self.last_doc_id {
            Some(last) => {
                verify_arg!(doc_id, doc_id > last);
                doc_id - last
            }
            None => doc_id,
        };
        verify_arg!(len, self.len < u32::MAX);
        write_varint(&mut self.body, delta as u64);
        write_varint(&mut self.body, freq as u64);
        self.len += 1;
        self.last_doc_id = Some(doc_id);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn last_doc_id(&self) -> Option<u32> {
        self.last_doc_id
    }

    /// Appends the encoded list (header followed by body) to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) -> Result<()> {
        let Some(last_doc_id) = self.last_doc_id else {
            return Err(Error::invalid_operation("encoding an empty posting list"));
        };
        write_header(out, self.len, last_doc_id);
        out.extend_from_slice(&self.body);
        Ok(())
    }

    pub fn finish(self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.body.len() + 10);
        self.write_to(&mut out)?;
        Ok(out)
    }
}

/// Writes a list header: the count, and the last document id when `len > 1`.
pub fn write_header(out: &mut Vec<u8>, len: u32, last_doc_id: u32) {
    write_varint(out, len as u64);
    if len > 1 {
        write_varint(out, last_doc_id as u64);
    }
}

/// The header and first posting of an encoded list, with the remaining bytes left
/// undecoded.
///
/// `tail` starts with the frequency of the first posting, so a list can be
/// re-based onto a different id space by rewriting only its header and first
/// delta and copying `tail` verbatim.
#[derive(Debug, Clone, Copy)]
pub struct ListHead<'a> {
    pub len: u32,
    pub first_doc_id: u32,
    pub last_doc_id: u32,
    pub tail: &'a [u8],
}

impl<'a> ListHead<'a> {
    pub fn parse(buf: &'a [u8]) -> Result<ListHead<'a>> {
        let mut cursor = ByteCursor::new(buf);
        let len = cursor.read_varint_u32()?;
        verify_data!(len, len > 0);
        let hint = if len > 1 {
            Some(cursor.read_varint_u32()?)
        } else {
            None
        };
        let first_doc_id = cursor.read_varint_u32()?;
        let last_doc_id = hint.unwrap_or(first_doc_id);
        verify_data!(last_doc_id, last_doc_id >= first_doc_id);
        Ok(ListHead {
            len,
            first_doc_id,
            last_doc_id,
            tail: cursor.rest(),
        })
    }
}

/// Forward-only cursor over an encoded posting list.
///
/// A freshly created iterator is positioned *before* the first posting;
/// [`advance`](Self::advance) moves to the next one and reports `false` once the
/// list is exhausted, after which [`current`](Self::current) is `None`.
#[derive(Debug, Clone)]
pub struct PostingListIterator<'a> {
    cursor: ByteCursor<'a>,
    len: u32,
    last_doc_id: u32,
    decoded: u32,
    doc_id: u32,
    current: Option<Posting>,
}

impl<'a> PostingListIterator<'a> {
    pub fn new(buf: &'a [u8]) -> Result<PostingListIterator<'a>> {
        let mut cursor = ByteCursor::new(buf);
        let len = cursor.read_varint_u32()?;
        verify_data!(len, len > 0);
        let last_doc_id = if len > 1 {
            cursor.read_varint_u32()?
        } else {
            u32::MAX
        };
        Ok(PostingListIterator {
            cursor,
            len,
            last_doc_id,
            decoded: 0,
            doc_id: 0,
            current: None,
        })
    }

    /// Number of postings in the list (the term's document frequency).
    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn current(&self) -> Option<Posting> {
        self.current
    }

    #[inline]
    pub fn doc_id(&self) -> Option<u32> {
        self.current.map(|p| p.doc_id)
    }

    pub fn advance(&mut self) -> Result<bool> {
        if self.cursor.is_at_end() {
            if self.current.is_some() || self.decoded == 0 {
                self.finish()?;
            }
            return Ok(false);
        }
        let delta = self.cursor.read_varint_u32()?;
        let freq = self.cursor.read_varint_u32()?;
        verify_data!(freq, freq >= 1);
        if self.decoded > 0 {
            verify_data!(delta, delta > 0);
        }
        self.doc_id = self
            .doc_id
            .checked_add(delta)
            .ok_or_else(|| Error::invalid_format("posting list", "document id overflow"))?;
        self.decoded += 1;
        verify_data!(len, self.decoded <= self.len);
        self.current = Some(Posting::new(self.doc_id, freq));
        Ok(true)
    }

    /// Advances to the first posting whose document id is at least `target`.
    ///
    /// Returns `false` when the list is exhausted before reaching `target`.
    pub fn advance_to(&mut self, target: u32) -> Result<bool> {
        if self.len > 1 && target > self.last_doc_id {
            self.cursor.skip_to_end();
            self.current = None;
            self.decoded = self.len;
            return Ok(false);
        }
        loop {
            if let Some(p) = self.current {
                if p.doc_id >= target {
                    return Ok(true);
                }
            }
            if !self.advance()? {
                return Ok(false);
            }
        }
    }

    fn finish(&mut self) -> Result<()> {
        self.current = None;
        if self.decoded != self.len {
            return Err(Error::invalid_format(
                "posting list",
                format!("expected {} postings, found {}", self.len, self.decoded),
            ));
        }
        if self.len > 1 && self.doc_id != self.last_doc_id {
            return Err(Error::invalid_format(
                "posting list",
                format!(
                    "last document id {} does not match header {}",
                    self.doc_id, self.last_doc_id
                ),
            ));
        }
        Ok(())
    }
}

/// Adapts a [`PostingListIterator`] to a fallible `Iterator`.
pub struct PostingDecoder<'a> {
    inner: PostingListIterator<'a>,
    done: bool,
}

impl<'a> PostingDecoder<'a> {
    pub fn new(buf: &'a [u8]) -> Result<PostingDecoder<'a>> {
        Ok(PostingDecoder {
            inner: PostingListIterator::new(buf)?,
            done: false,
        })
    }
}

impl Iterator for PostingDecoder<'_> {
    type Item = Result<Posting>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        self.done = true;
        let more = try_or_ret_some_err!(self.inner.advance());
        if !more {
            return None;
        }
        self.done = false;
        self.inner.current().map(Ok)
    }
}
