use std::{io::Cursor, ops::Range, path::Path};

use sift_common::{Result, error::Error};
use sift_encodings::posting_list::ListHead;
use sift_io::{FileReader, ReadAt};

use crate::{
    meta::{DocumentNameStore, IndexMetadata},
    postings_file::{ContentKind, PostingsFileReader, parse_record_header},
};

/// Size of the initial read for a term record. Most records (header line and
/// posting list) fit; longer ones take a second read for the remainder.
const RECORD_READ_WINDOW: u64 = 4096;

/// Size of the read covering the postings file header lines.
const HEADER_READ_SIZE: u64 = 256;

/// An opened index: the metadata in memory, the postings file accessed by point
/// reads on demand.
pub struct SearchIndex {
    name: String,
    kind: ContentKind,
    metadata: IndexMetadata,
    postings: Box<dyn ReadAt>,
}

impl SearchIndex {
    /// Opens the postings file at `postings_path` together with its metadata file.
    pub fn open(postings_path: impl AsRef<Path>) -> Result<SearchIndex> {
        let path = postings_path.as_ref();
        let name = path.display().to_string();
        let metadata = IndexMetadata::load(path)?;
        let postings = FileReader::open(path).map_err(|e| Error::io(&name, e))?;
        SearchIndex::open_with(name, Box::new(postings), metadata)
    }

    /// Wraps an already available postings source and its metadata.
    pub fn open_with(
        name: impl Into<String>,
        postings: Box<dyn ReadAt>,
        metadata: IndexMetadata,
    ) -> Result<SearchIndex> {
        let name = name.into();
        let size = postings.size().map_err(|e| Error::io(&name, e))?;
        if size != metadata.postings_size() {
            return Err(Error::invalid_format(
                &name,
                format!(
                    "postings file has {size} bytes, metadata expects {}",
                    metadata.postings_size()
                ),
            ));
        }
        let header = postings
            .read_at(0..HEADER_READ_SIZE)
            .map_err(|e| Error::io(&name, e))?;
        let reader = PostingsFileReader::open(Cursor::new(header), &name)?;
        if reader.doc_count() != metadata.doc_count() {
            return Err(Error::invalid_format(
                &name,
                format!(
                    "postings file has {} documents, metadata {}",
                    reader.doc_count(),
                    metadata.doc_count()
                ),
            ));
        }
        log::info!(
            "opened {} index {name}: {} documents, {} terms",
            reader.kind().name(),
            metadata.doc_count(),
            metadata.dictionary().len()
        );
        Ok(SearchIndex {
            name,
            kind: reader.kind(),
            metadata,
            postings,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn metadata(&self) -> &IndexMetadata {
        &self.metadata
    }

    pub fn documents(&self) -> &DocumentNameStore {
        self.metadata.documents()
    }

    pub fn doc_count(&self) -> usize {
        self.metadata.doc_count()
    }

    pub fn total_tokens(&self) -> u64 {
        self.metadata.total_tokens()
    }

    pub fn average_doc_len(&self) -> f32 {
        self.metadata.average_doc_len()
    }

    /// Fetches the encoded posting list of `token`, or `None` if the token is not
    /// indexed.
    ///
    /// The record found through the dictionary must carry the requested token and
    /// its list may not be longer than the number of documents; either violation
    /// is an integrity error.
    pub fn posting_list(&self, token: &str) -> Result<Option<Vec<u8>>> {
        match self.metadata.term_offset(token)? {
            Some(offset) => self.read_record(offset, token).map(Some),
            None => Ok(None),
        }
    }

    /// Reads the posting list of the term record at `offset`, which must belong to
    /// `token`.
    pub fn read_record(&self, offset: u64, token: &str) -> Result<Vec<u8>> {
        let window = RECORD_READ_WINDOW.max(token.len() as u64 + 32);
        let mut record = self.read(offset..offset + window)?;
        let line_len = record
            .iter()
            .position(|&b| b == b'\n')
            .ok_or_else(|| Error::invalid_format(&self.name, format!("no record at {offset}")))?;
        let line = std::str::from_utf8(&record[..line_len])
            .map_err(|_| Error::invalid_format(&self.name, format!("bad record at {offset}")))?;
        let (record_token, len) = parse_record_header(line, &self.name)?;
        if record_token != token {
            return Err(Error::integrity(
                &self.name,
                format!("dictionary entry of '{token}' points to the record of '{record_token}'"),
            ));
        }

        let start = line_len + 1;
        let end = start + len + 1;
        if record.len() < end {
            let missing = self.read(offset + record.len() as u64..offset + end as u64)?;
            record.extend_from_slice(&missing);
        }
        if record.len() < end || record[end - 1] != b'\n' {
            return Err(Error::invalid_format(
                &self.name,
                format!("truncated posting list of '{token}'"),
            ));
        }
        record.truncate(end - 1);
        record.drain(..start);

        let head = ListHead::parse(&record)?;
        if head.len as usize > self.doc_count() {
            return Err(Error::integrity(
                &self.name,
                format!(
                    "posting list of '{token}' has {} entries, more than {} documents",
                    head.len,
                    self.doc_count()
                ),
            ));
        }
        Ok(record)
    }

    /// Number of documents containing `token`.
    pub fn document_frequency(&self, token: &str) -> Result<u32> {
        match self.posting_list(token)? {
            Some(list) => Ok(ListHead::parse(&list)?.len),
            None => Ok(0),
        }
    }

    fn read(&self, range: Range<u64>) -> Result<Vec<u8>> {
        self.postings
            .read_at(range)
            .map_err(|e| Error::io(&self.name, e))
    }
}

#[cfg(test)]
mod tests {
    use sift_encodings::{
        PostingListBuilder,
        posting_list::{Posting, decode},
    };

    use super::*;
    use crate::{postings_file::PostingsFileWriter, tokenizers::WhitespaceTokenizer, write::IndexBuilder};

    fn open(data: Vec<u8>) -> Result<SearchIndex> {
        let reader = PostingsFileReader::open(Cursor::new(&data), "postings")?;
        let metadata = IndexMetadata::from_postings(reader, data.len() as u64)?;
        SearchIndex::open_with("test", Box::new(data), metadata)
    }

    fn small_index() -> Vec<u8> {
        let mut builder = IndexBuilder::new(ContentKind::Text, WhitespaceTokenizer::new());
        builder.add_document("first", "red green red").unwrap();
        builder.add_document("second", "green blue").unwrap();
        builder.add_document("third", "blue blue blue green").unwrap();
        builder.write(Vec::new()).unwrap()
    }

    #[test]
    fn test_lookup() {
        let index = open(small_index()).unwrap();
        assert_eq!(index.kind(), ContentKind::Text);
        assert_eq!(index.doc_count(), 3);
        assert_eq!(index.total_tokens(), 9);
        assert_eq!(index.average_doc_len(), 3.0);
        assert_eq!(index.documents().name(2).unwrap(), "third");

        let green = index.posting_list("green").unwrap().unwrap();
        assert_eq!(
            decode(&green).unwrap(),
            vec![Posting::new(0, 1), Posting::new(1, 1), Posting::new(2, 1)]
        );
        let red = index.posting_list("red").unwrap().unwrap();
        assert_eq!(decode(&red).unwrap(), vec![Posting::new(0, 2)]);
        assert_eq!(index.document_frequency("blue").unwrap(), 2);
        assert!(index.posting_list("purple").unwrap().is_none());
        assert_eq!(index.document_frequency("purple").unwrap(), 0);
    }

    #[test]
    fn test_long_record_takes_second_read() {
        let doc_count = 5000u32;
        let mut list = PostingListBuilder::new();
        for doc in 0..doc_count {
            list.push(doc, doc % 7 + 1).unwrap();
        }
        let list = list.finish().unwrap();
        assert!(list.len() as u64 > RECORD_READ_WINDOW);

        let mut writer =
            PostingsFileWriter::new(Vec::new(), ContentKind::Text, doc_count as usize).unwrap();
        for doc in 0..doc_count {
            writer.add_document(&format!("d{doc}"), 10).unwrap();
        }
        writer.add_term("every", &list).unwrap();
        writer.add_term("zz", &[1, 3, 1]).unwrap();
        let index = open(writer.finish().unwrap()).unwrap();

        assert_eq!(index.posting_list("every").unwrap().unwrap(), list);
        assert_eq!(index.posting_list("zz").unwrap().unwrap(), vec![1, 3, 1]);
    }

    #[test]
    fn test_mismatched_record_is_integrity_error() {
        let write = |second: &str| {
            let mut writer = PostingsFileWriter::new(Vec::new(), ContentKind::Text, 1).unwrap();
            writer.add_document("d", 1).unwrap();
            writer.add_term("apple", &[1, 0, 1]).unwrap();
            writer.add_term(second, &[1, 0, 1]).unwrap();
            writer.finish().unwrap()
        };
        let original = write("pear");
        let reader = PostingsFileReader::open(Cursor::new(&original), "postings").unwrap();
        let metadata = IndexMetadata::from_postings(reader, original.len() as u64).unwrap();

        // Same size, different token at the same offset.
        let replaced = write("peas");
        let index = SearchIndex::open_with("replaced", Box::new(replaced), metadata).unwrap();
        assert!(index.posting_list("apple").unwrap().is_some());
        assert!(index.posting_list("pear").unwrap_err().is_integrity_error());
    }

    #[test]
    fn test_list_longer_than_corpus() {
        let mut writer = PostingsFileWriter::new(Vec::new(), ContentKind::Text, 1).unwrap();
        writer.add_document("only", 2).unwrap();
        writer.add_term("dup", &[2, 1, 0, 1, 1, 1]).unwrap();
        let index = open(writer.finish().unwrap()).unwrap();
        assert!(index.posting_list("dup").unwrap_err().is_integrity_error());
    }

    #[test]
    fn test_size_mismatch() {
        let data = small_index();
        let reader = PostingsFileReader::open(Cursor::new(&data), "postings").unwrap();
        let metadata = IndexMetadata::from_postings(reader, data.len() as u64).unwrap();
        let mut longer = data.clone();
        longer.push(b'\n');
        assert!(SearchIndex::open_with("longer", Box::new(longer), metadata).is_err());
    }
}
