//! The postings file.
//!
//! ```text
//! <kind>.postings.1\n
//! <doc_count>\n
//! <token_count>\t<document name>\n      (doc_count times, in document id order)
//! \n
//! <token>\t<byte_len>\n<posting list bytes>\n      (per term, in token byte order)
//! ```
//!
//! Posting lists use the encoding of [`sift_encodings::posting_list`].

use std::io::{BufRead, Read, Write};

use sift_common::{Result, error::Error};

const FORMAT_SUFFIX: &str = ".postings.1";

/// What the indexed content is. Math indexes weigh `#`-prefixed formula tokens
/// separately from text tokens at query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentKind {
    #[default]
    Text,
    Math,
}

impl ContentKind {
    pub const fn name(&self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::Math => "math",
        }
    }

    pub fn format_tag(&self) -> String {
        format!("{}{FORMAT_SUFFIX}", self.name())
    }

    pub fn from_format_tag(tag: &str) -> Option<ContentKind> {
        match tag.strip_suffix(FORMAT_SUFFIX)? {
            "text" => Some(ContentKind::Text),
            "math" => Some(ContentKind::Math),
            _ => None,
        }
    }
}

/// One row of the document table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEntry {
    pub name: String,
    pub token_count: u32,
}

/// A term record read from a postings file.
#[derive(Debug, Clone)]
pub struct TermRecord {
    pub token: String,
    /// Byte offset of the record (its token line) within the file.
    pub offset: u64,
    pub postings: Vec<u8>,
}

/// Streams a postings file: the document table first, then the term records.
pub struct PostingsFileWriter<W: Write> {
    sink: W,
    kind: ContentKind,
    doc_count: usize,
    docs_written: usize,
    terms_started: bool,
    last_token: Option<String>,
    term_count: usize,
}

impl<W: Write> PostingsFileWriter<W> {
    pub fn new(mut sink: W, kind: ContentKind, doc_count: usize) -> Result<PostingsFileWriter<W>> {
        write!(sink, "{}\n{doc_count}\n", kind.format_tag())?;
        Ok(PostingsFileWriter {
            sink,
            kind,
            doc_count,
            docs_written: 0,
            terms_started: false,
            last_token: None,
            term_count: 0,
        })
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn add_document(&mut self, name: &str, token_count: u32) -> Result<()> {
        if self.docs_written == self.doc_count {
            return Err(Error::invalid_operation("document table is already complete"));
        }
        if name.is_empty() || name.contains('\n') {
            return Err(Error::invalid_arg("name", format!("invalid document name {name:?}")));
        }
        writeln!(self.sink, "{token_count}\t{name}")?;
        self.docs_written += 1;
        Ok(())
    }

    /// Appends a term record. Tokens must arrive in strictly increasing byte order.
    pub fn add_term(&mut self, token: &str, postings: &[u8]) -> Result<()> {
        self.begin_terms()?;
        if token.is_empty() || token.contains(['\t', '\n', ' ', '\r', '\0']) {
            return Err(Error::invalid_arg("token", format!("invalid token {token:?}")));
        }
        if let Some(last) = &self.last_token {
            if token <= last.as_str() {
                return Err(Error::invalid_arg(
                    "token",
                    format!("'{token}' does not follow '{last}'"),
                ));
            }
        }
        writeln!(self.sink, "{token}\t{}", postings.len())?;
        self.sink.write_all(postings)?;
        self.sink.write_all(b"\n")?;
        self.last_token = Some(token.to_string());
        self.term_count += 1;
        Ok(())
    }

    pub fn term_count(&self) -> usize {
        self.term_count
    }

    pub fn finish(mut self) -> Result<W> {
        self.begin_terms()?;
        self.sink.flush()?;
        Ok(self.sink)
    }

    fn begin_terms(&mut self) -> Result<()> {
        if self.terms_started {
            return Ok(());
        }
        if self.docs_written != self.doc_count {
            return Err(Error::invalid_operation(format!(
                "document table has {} of {} documents",
                self.docs_written, self.doc_count
            )));
        }
        self.sink.write_all(b"\n")?;
        self.terms_started = true;
        Ok(())
    }
}

/// Sequential reader of a postings file.
pub struct PostingsFileReader<R> {
    source: R,
    name: String,
    kind: ContentKind,
    doc_count: usize,
    docs_read: usize,
    table_done: bool,
    position: u64,
    last_token: Option<String>,
}

impl<R: BufRead> PostingsFileReader<R> {
    /// Reads the format tag and the document count.
    pub fn open(source: R, name: impl Into<String>) -> Result<PostingsFileReader<R>> {
        let mut reader = PostingsFileReader {
            source,
            name: name.into(),
            kind: ContentKind::Text,
            doc_count: 0,
            docs_read: 0,
            table_done: false,
            position: 0,
            last_token: None,
        };
        let tag = reader
            .read_line()?
            .ok_or_else(|| Error::invalid_format(&reader.name, "empty postings file"))?;
        reader.kind = ContentKind::from_format_tag(&tag).ok_or_else(|| {
            Error::invalid_format(&reader.name, format!("unknown file format '{tag}'"))
        })?;
        let count = reader
            .read_line()?
            .ok_or_else(|| Error::invalid_format(&reader.name, "missing document count"))?;
        reader.doc_count = count.parse().map_err(|_| {
            Error::invalid_format(&reader.name, format!("bad document count '{count}'"))
        })?;
        Ok(reader)
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn doc_count(&self) -> usize {
        self.doc_count
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reads the next document table row; `None` once the table is exhausted
    /// (the blank line closing the table is consumed then).
    pub fn next_document(&mut self) -> Result<Option<DocumentEntry>> {
        if self.table_done {
            return Ok(None);
        }
        if self.docs_read == self.doc_count {
            let line = self.read_line()?;
            if line.as_deref() != Some("") {
                return Err(Error::invalid_format(
                    &self.name,
                    format!("unexpected line after document names: {line:?}"),
                ));
            }
            self.table_done = true;
            return Ok(None);
        }
        let line = self
            .read_line()?
            .ok_or_else(|| Error::invalid_format(&self.name, "truncated document table"))?;
        let entry = line
            .split_once('\t')
            .and_then(|(count, name)| {
                Some(DocumentEntry {
                    name: name.to_string(),
                    token_count: count.parse().ok()?,
                })
            })
            .ok_or_else(|| Error::invalid_format(&self.name, format!("bad document line {line:?}")))?;
        self.docs_read += 1;
        Ok(Some(entry))
    }

    /// Reads the rest of the document table.
    pub fn read_documents(&mut self) -> Result<Vec<DocumentEntry>> {
        let mut docs = Vec::with_capacity(self.doc_count.saturating_sub(self.docs_read));
        while let Some(doc) = self.next_document()? {
            docs.push(doc);
        }
        Ok(docs)
    }

    /// Reads the next term record; `None` at the end of the file.
    ///
    /// Fails if the document table has not been fully read.
    pub fn next_term(&mut self) -> Result<Option<TermRecord>> {
        if !self.table_done {
            return Err(Error::invalid_operation("term read before the document table"));
        }
        let offset = self.position;
        let Some(line) = self.read_line()? else {
            return Ok(None);
        };
        let (token, len) = parse_record_header(&line, &self.name)?;
        if let Some(last) = &self.last_token {
            if token <= last.as_str() {
                return Err(Error::invalid_format(
                    &self.name,
                    format!("token '{token}' out of order after '{last}'"),
                ));
            }
        }
        let mut postings = vec![0u8; len];
        self.source
            .read_exact(&mut postings)
            .map_err(|e| read_error(&self.name, e))?;
        self.position += len as u64;
        let mut newline = [0u8; 1];
        self.source
            .read_exact(&mut newline)
            .map_err(|e| read_error(&self.name, e))?;
        self.position += 1;
        if newline[0] != b'\n' {
            return Err(Error::invalid_format(
                &self.name,
                format!("extra posting bytes for '{token}'"),
            ));
        }
        let token = token.to_string();
        self.last_token = Some(token.clone());
        Ok(Some(TermRecord {
            token,
            offset,
            postings,
        }))
    }

    /// Byte position of the next unread byte.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Reads one line without its terminator; `None` at end of file.
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = Vec::new();
        let read = self
            .source
            .read_until(b'\n', &mut line)
            .map_err(|e| Error::io(&self.name, e))?;
        if read == 0 {
            return Ok(None);
        }
        self.position += read as u64;
        if line.pop() != Some(b'\n') {
            return Err(Error::invalid_format(&self.name, "unterminated line"));
        }
        String::from_utf8(line)
            .map(Some)
            .map_err(|_| Error::invalid_format(&self.name, "line is not UTF-8"))
    }
}

/// Splits a `<token>\t<byte_len>` record header line.
pub fn parse_record_header<'a>(line: &'a str, name: &str) -> Result<(&'a str, usize)> {
    line.split_once('\t')
        .and_then(|(token, len)| Some((token, len.parse().ok()?)))
        .filter(|(token, _)| !token.is_empty())
        .ok_or_else(|| Error::invalid_format(name, format!("bad term record header {line:?}")))
}

fn read_error(name: &str, e: std::io::Error) -> Error {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        Error::invalid_format(name, "unexpected end of file")
    } else {
        Error::io(name, e)
    }
}
