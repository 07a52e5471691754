//! The metadata file paired with a postings file.
//!
//! ```text
//! <postings file size>\n
//! <document name store: positional sorted map, name -> token count>
//! <total token count>\n
//! <term dictionary: sorted map, token -> offset of the term record>
//! ```
//!
//! The recorded postings file size guards against pairing a metadata file with a
//! postings file it was not built from.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use sift_common::{Result, error::Error};
use sift_dictionary::{DeltaMap, RawMap, SortedStringMapBuilder};

use crate::postings_file::{DocumentEntry, PostingsFileReader};

/// Document names and lengths, addressed by document id.
#[derive(Debug)]
pub struct DocumentNameStore {
    map: RawMap,
}

impl DocumentNameStore {
    pub fn build<'a>(docs: impl IntoIterator<Item = &'a DocumentEntry>) -> Result<DocumentNameStore> {
        let mut builder = SortedStringMapBuilder::new().positional();
        for doc in docs {
            builder.add(doc.name.as_bytes(), doc.token_count as u64)?;
        }
        Ok(DocumentNameStore {
            map: builder.finish()?,
        })
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn name(&self, doc_id: u32) -> Result<String> {
        let name = self.map.key_at(doc_id as usize)?;
        Ok(String::from_utf8_lossy(&name).into_owned())
    }

    /// The document name cut to at most `capacity` bytes.
    pub fn name_truncated(&self, doc_id: u32, capacity: usize) -> Result<String> {
        let name = self.map.key_at_truncated(doc_id as usize, capacity)?;
        Ok(String::from_utf8_lossy(&name).into_owned())
    }

    /// Number of tokens in the document.
    pub fn token_count(&self, doc_id: u32) -> Result<u32> {
        let count = self.map.value_at(doc_id as usize)?;
        u32::try_from(count).map_err(|_| {
            Error::invalid_format("document store", format!("token count {count} of {doc_id}"))
        })
    }

    /// All token counts in document id order.
    pub fn token_counts(&self) -> Result<Vec<u32>> {
        self.map
            .iter()
            .map(|entry| {
                let (_, count) = entry?;
                u32::try_from(count).map_err(|_| {
                    Error::invalid_format("document store", format!("token count {count}"))
                })
            })
            .collect()
    }

    pub fn persist<W: Write>(&self, sink: &mut W) -> Result<()> {
        self.map.persist(sink)
    }

    pub fn load<R: BufRead>(source: &mut R, name: &str) -> Result<DocumentNameStore> {
        Ok(DocumentNameStore {
            map: RawMap::load(source, name)?.into_positional(),
        })
    }
}

#[derive(Debug)]
pub struct IndexMetadata {
    postings_size: u64,
    documents: DocumentNameStore,
    total_tokens: u64,
    dictionary: DeltaMap,
}

impl IndexMetadata {
    /// Path of the metadata file paired with `postings_path`.
    pub fn meta_path(postings_path: &Path) -> PathBuf {
        let mut path = postings_path.as_os_str().to_owned();
        path.push(".meta");
        PathBuf::from(path)
    }

    /// Scans a postings file and builds its metadata.
    pub fn build(postings_path: &Path) -> Result<IndexMetadata> {
        let name = postings_path.display().to_string();
        let file = File::open(postings_path).map_err(|e| Error::io(&name, e))?;
        let size = file.metadata().map_err(|e| Error::io(&name, e))?.len();
        let reader = PostingsFileReader::open(BufReader::new(file), name)?;
        Self::from_postings(reader, size)
    }

    /// Builds metadata from a postings file reader positioned at its start.
    pub fn from_postings<R: BufRead>(
        mut reader: PostingsFileReader<R>,
        postings_size: u64,
    ) -> Result<IndexMetadata> {
        let docs = reader.read_documents()?;
        let total_tokens = docs.iter().map(|doc| doc.token_count as u64).sum();
        let documents = DocumentNameStore::build(&docs)?;
        log::info!("read {} document names from {}", docs.len(), reader.name());
        drop(docs);

        let mut dictionary = SortedStringMapBuilder::new();
        while let Some(record) = reader.next_term()? {
            dictionary.add(record.token.as_bytes(), record.offset)?;
        }
        if reader.position() != postings_size {
            return Err(Error::invalid_format(
                reader.name(),
                format!("read {} of {postings_size} bytes", reader.position()),
            ));
        }
        let dictionary = dictionary.finish()?;
        log::info!(
            "term dictionary: {} terms, {} bytes",
            dictionary.len(),
            dictionary.size_in_bytes()
        );
        Ok(IndexMetadata {
            postings_size,
            documents,
            total_tokens,
            dictionary,
        })
    }

    /// Writes the metadata file next to `postings_path`.
    pub fn write(&self, postings_path: &Path) -> Result<PathBuf> {
        let path = Self::meta_path(postings_path);
        let name = path.display().to_string();
        let file = File::create(&path).map_err(|e| Error::io(&name, e))?;
        let mut sink = BufWriter::new(file);
        self.write_to(&mut sink)?;
        sink.flush().map_err(|e| Error::io(&name, e))?;
        Ok(path)
    }

    pub fn write_to<W: Write>(&self, sink: &mut W) -> Result<()> {
        writeln!(sink, "{}", self.postings_size)?;
        self.documents.persist(sink)?;
        writeln!(sink, "{}", self.total_tokens)?;
        self.dictionary.persist(sink)
    }

    /// Loads the metadata of `postings_path`, checking that both files belong together.
    pub fn load(postings_path: &Path) -> Result<IndexMetadata> {
        let path = Self::meta_path(postings_path);
        let name = path.display().to_string();
        let file = File::open(&path).map_err(|e| Error::io(&name, e))?;
        let meta = Self::read_from(&mut BufReader::new(file), &name)?;
        let actual = std::fs::metadata(postings_path)
            .map_err(|e| Error::io(postings_path.display().to_string(), e))?
            .len();
        if actual != meta.postings_size {
            return Err(Error::invalid_format(
                name,
                format!(
                    "recorded size {} does not match {} bytes of {}",
                    meta.postings_size,
                    actual,
                    postings_path.display()
                ),
            ));
        }
        Ok(meta)
    }

    /// Reads a metadata file. The source must end right after the dictionary.
    pub fn read_from<R: BufRead>(source: &mut R, name: &str) -> Result<IndexMetadata> {
        let postings_size = read_number(source, name, "postings file size")?;
        let documents = DocumentNameStore::load(source, name)?;
        let total_tokens = read_number(source, name, "total token count")?;
        let dictionary = DeltaMap::load(source, name)?;
        let mut trailing = [0u8; 1];
        if source.read(&mut trailing).map_err(|e| Error::io(name, e))? != 0 {
            return Err(Error::invalid_format(name, "unexpected data after the dictionary"));
        }
        log::debug!(
            "{name}: {} documents, {total_tokens} tokens, {} terms",
            documents.len(),
            dictionary.len()
        );
        Ok(IndexMetadata {
            postings_size,
            documents,
            total_tokens,
            dictionary,
        })
    }

    pub fn postings_size(&self) -> u64 {
        self.postings_size
    }

    pub fn documents(&self) -> &DocumentNameStore {
        &self.documents
    }

    pub fn doc_count(&self) -> usize {
        self.documents.len()
    }

    pub fn total_tokens(&self) -> u64 {
        self.total_tokens
    }

    /// Mean document length in tokens; zero for an empty index.
    pub fn average_doc_len(&self) -> f32 {
        if self.documents.is_empty() {
            0.0
        } else {
            (self.total_tokens as f64 / self.documents.len() as f64) as f32
        }
    }

    pub fn dictionary(&self) -> &DeltaMap {
        &self.dictionary
    }

    /// Offset of the term record of `token` in the postings file.
    pub fn term_offset(&self, token: &str) -> Result<Option<u64>> {
        self.dictionary.get(token.as_bytes())
    }
}

fn read_number<R: BufRead>(source: &mut R, name: &str, what: &str) -> Result<u64> {
    let mut line = String::new();
    source
        .read_line(&mut line)
        .map_err(|e| Error::io(name, e))?;
    let Some(value) = line.strip_suffix('\n') else {
        return Err(Error::invalid_format(name, format!("missing {what}")));
    };
    value
        .parse()
        .map_err(|_| Error::invalid_format(name, format!("bad {what} {value:?}")))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::postings_file::{ContentKind, PostingsFileWriter};

    fn postings() -> Vec<u8> {
        let mut writer = PostingsFileWriter::new(Vec::new(), ContentKind::Text, 3).unwrap();
        writer.add_document("zulu", 4).unwrap();
        writer.add_document("alpha", 2).unwrap();
        writer.add_document("mike", 6).unwrap();
        writer.add_term("apple", &[2, 2, 0, 1, 2, 3]).unwrap();
        writer.add_term("pear", &[1, 1, 5]).unwrap();
        writer.finish().unwrap()
    }

    fn build(data: &[u8]) -> IndexMetadata {
        let reader = PostingsFileReader::open(Cursor::new(data), "postings").unwrap();
        IndexMetadata::from_postings(reader, data.len() as u64).unwrap()
    }

    #[test]
    fn test_build_and_reload() {
        let data = postings();
        let meta = build(&data);
        assert_eq!(meta.doc_count(), 3);
        assert_eq!(meta.total_tokens(), 12);
        assert_eq!(meta.average_doc_len(), 4.0);
        assert_eq!(meta.documents().name(1).unwrap(), "alpha");
        assert_eq!(meta.documents().token_count(2).unwrap(), 6);
        assert_eq!(meta.documents().token_counts().unwrap(), vec![4, 2, 6]);

        let offset = meta.term_offset("pear").unwrap().unwrap() as usize;
        assert!(data[offset..].starts_with(b"pear\t3\n"));
        assert_eq!(meta.term_offset("plum").unwrap(), None);

        let mut buf = Vec::new();
        meta.write_to(&mut buf).unwrap();
        assert!(buf.starts_with(format!("{}\nsorted-map.raw.1\n", data.len()).as_bytes()));
        let loaded = IndexMetadata::read_from(&mut Cursor::new(&buf), "meta").unwrap();
        assert_eq!(loaded.postings_size(), data.len() as u64);
        assert_eq!(loaded.documents().name(0).unwrap(), "zulu");
        assert_eq!(loaded.documents().name_truncated(0, 2).unwrap(), "zu");
        assert_eq!(loaded.term_offset("apple").unwrap(), meta.term_offset("apple").unwrap());
        // The name store is positional.
        assert!(loaded.documents().map.get(b"zulu").is_err());
    }

    #[test]
    fn test_rejects_trailing_data() {
        let meta = build(&postings());
        let mut buf = Vec::new();
        meta.write_to(&mut buf).unwrap();
        buf.push(b'x');
        let err = IndexMetadata::read_from(&mut Cursor::new(&buf), "meta").err().unwrap();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_size_mismatch() {
        let data = postings();
        let reader = PostingsFileReader::open(Cursor::new(&data), "postings").unwrap();
        assert!(IndexMetadata::from_postings(reader, data.len() as u64 + 1).is_err());
    }

    #[test]
    fn test_file_pairing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.postings");
        std::fs::write(&path, postings()).unwrap();

        let meta = IndexMetadata::build(&path).unwrap();
        let meta_path = meta.write(&path).unwrap();
        assert_eq!(meta_path, dir.path().join("index.postings.meta"));
        assert_eq!(IndexMetadata::load(&path).unwrap().doc_count(), 3);

        // Same content with a different size no longer matches.
        let mut grown = postings();
        grown.extend_from_slice(b"more\t1\n\x01\n");
        std::fs::write(&path, grown).unwrap();
        assert!(IndexMetadata::load(&path).unwrap_err().is_format_error());
    }
}
