//! Reader for TREC-style tagged corpora.
//!
//! ```text
//! <DOC>
//! <DOCNO>name</DOCNO>
//! <DOCHDR>
//! optional header, skipped
//! </DOCHDR>
//! content
//! </DOC>
//! ```

use std::io::Read;

use sift_common::{Result, error::Error};
use sift_io::utils::read_fully;

const CHUNK_SIZE: usize = 1 << 20;

const DOC_START: &[u8] = b"<DOC>";
const DOC_END: &[u8] = b"</DOC>";
const DOCNO_START: &[u8] = b"<DOCNO>";
const DOCNO_END: &[u8] = b"</DOCNO>";
const DOCHDR_END: &[u8] = b"</DOCHDR>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrecDocument {
    pub name: String,
    pub content: String,
}

/// Incrementally extracts documents from a TREC corpus.
///
/// Input is read in chunks, so corpora much larger than memory can be processed
/// as long as every single document fits.
pub struct TrecReader<R> {
    source: R,
    buf: Vec<u8>,
    pos: usize,
    eof: bool,
    started: bool,
    source_name: String,
}

impl<R: Read> TrecReader<R> {
    pub fn new(source: R, source_name: impl Into<String>) -> TrecReader<R> {
        TrecReader {
            source,
            buf: Vec::new(),
            pos: 0,
            eof: false,
            started: false,
            source_name: source_name.into(),
        }
    }

    /// Returns the next document, or `None` at the end of the corpus.
    pub fn next_document(&mut self) -> Result<Option<TrecDocument>> {
        if !self.started {
            self.check_start()?;
            self.started = true;
        }
        loop {
            while self.pos < self.buf.len() && self.buf[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            let rest = &self.buf[self.pos..];
            let Some(doc_start) = find(rest, DOC_START) else {
                if self.eof {
                    if rest.iter().any(|b| !b.is_ascii_whitespace()) {
                        log::warn!(
                            "{}: ignoring {} trailing bytes after the last document",
                            self.source_name,
                            rest.len()
                        );
                    }
                    self.pos = self.buf.len();
                    return Ok(None);
                }
                self.fill()?;
                continue;
            };
            let body = &rest[doc_start + DOC_START.len()..];
            let Some(doc_len) = find(body, DOC_END) else {
                if self.eof {
                    log::warn!(
                        "{}: unterminated final document ({} bytes)",
                        self.source_name,
                        body.len()
                    );
                    self.pos = self.buf.len();
                    return Ok(None);
                }
                self.fill()?;
                continue;
            };
            if doc_start > 0 {
                log::warn!(
                    "{}: non-whitespace between documents: {:?}",
                    self.source_name,
                    String::from_utf8_lossy(&rest[..doc_start.min(80)])
                );
            }
            let document = self.parse_document(&body[..doc_len])?;
            self.pos += doc_start + DOC_START.len() + doc_len + DOC_END.len();
            return Ok(Some(document));
        }
    }

    fn parse_document(&self, doc: &[u8]) -> Result<TrecDocument> {
        let name_start = find(doc, DOCNO_START)
            .ok_or_else(|| Error::invalid_format(&self.source_name, "<DOCNO> missing"))?
            + DOCNO_START.len();
        let name_len = find(&doc[name_start..], DOCNO_END)
            .ok_or_else(|| Error::invalid_format(&self.source_name, "</DOCNO> missing"))?;
        let name_end = name_start + name_len;
        let after_name = name_end + DOCNO_END.len();
        let content_start = match find(&doc[after_name..], DOCHDR_END) {
            Some(hdr_end) => after_name + hdr_end + DOCHDR_END.len(),
            None => after_name,
        };
        let name = text_without_nul(&doc[name_start..name_end]).trim().to_string();
        Ok(TrecDocument {
            name,
            content: text_without_nul(&doc[content_start..]),
        })
    }

    fn check_start(&mut self) -> Result<()> {
        loop {
            let rest = self.buf.trim_ascii_start();
            if rest.len() >= DOC_START.len() || self.eof {
                if rest.is_empty() {
                    return Err(Error::invalid_format(&self.source_name, "empty corpus"));
                }
                if !rest.starts_with(DOC_START) {
                    return Err(Error::invalid_format(
                        &self.source_name,
                        format!(
                            "expected <DOC>, found {:?}",
                            String::from_utf8_lossy(&rest[..rest.len().min(16)])
                        ),
                    ));
                }
                return Ok(());
            }
            self.fill()?;
        }
    }

    /// Appends the next chunk of input to the buffer, compacting consumed bytes.
    fn fill(&mut self) -> Result<()> {
        if self.pos > 0 {
            self.buf.drain(..self.pos);
            self.pos = 0;
        }
        let len = self.buf.len();
        self.buf.resize(len + CHUNK_SIZE, 0);
        let read = read_fully(&mut self.source, &mut self.buf[len..])
            .map_err(|e| Error::io(&self.source_name, e))?;
        self.buf.truncate(len + read);
        if read < CHUNK_SIZE {
            self.eof = true;
        }
        Ok(())
    }
}

impl<R: Read> Iterator for TrecReader<R> {
    type Item = Result<TrecDocument>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_document().transpose()
    }
}

/// Decodes `bytes` lossily, zero bytes becoming spaces.
fn text_without_nul(bytes: &[u8]) -> String {
    let bytes: Vec<u8> = bytes.iter().map(|&b| if b == 0 { b' ' } else { b }).collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
