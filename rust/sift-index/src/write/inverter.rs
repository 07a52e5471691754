use std::{
    io::{BufRead, Read, Write},
    time::Instant,
};

use ahash::{AHashMap, AHashSet};
use sift_common::{Result, error::Error};
use sift_encodings::PostingListBuilder;

use crate::{
    postings_file::{ContentKind, DocumentEntry, PostingsFileWriter},
    tokenizers::{Tokenizer, TokenizerType, WeightedTokens},
    trec::TrecReader,
};

const PROGRESS_INTERVAL: usize = 10_000;

/// Accumulates documents into per-term posting lists.
///
/// Documents receive consecutive ids in the order they are added; documents
/// without any token are dropped and do not consume an id. All posting lists are
/// kept in memory (compressed) until [`write`](Self::write).
///
/// With a keyword set, only `#` tokens and listed terms are indexed and counted
/// in the document length.
pub struct IndexBuilder<T: Tokenizer = TokenizerType> {
    kind: ContentKind,
    tokenizer: T,
    keywords: Option<AHashSet<String>>,
    documents: Vec<DocumentEntry>,
    terms: AHashMap<String, PostingListBuilder>,
    total_tokens: u64,
    total_postings: u64,
    dropped: usize,
    last_progress: Instant,
}

impl<T: Tokenizer> IndexBuilder<T> {
    pub fn new(kind: ContentKind, tokenizer: T) -> IndexBuilder<T> {
        IndexBuilder {
            kind,
            tokenizer,
            keywords: None,
            documents: Vec::new(),
            terms: AHashMap::new(),
            total_tokens: 0,
            total_postings: 0,
            dropped: 0,
            last_progress: Instant::now(),
        }
    }

    /// Restricts the non-`#` terms to `keywords`, compared after case folding.
    pub fn with_keywords(mut self, keywords: AHashSet<String>) -> IndexBuilder<T> {
        self.keywords = Some(keywords);
        self
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn doc_count(&self) -> usize {
        self.documents.len()
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Number of documents dropped because they contained no tokens.
    pub fn dropped_documents(&self) -> usize {
        self.dropped
    }

    pub fn total_tokens(&self) -> u64 {
        self.total_tokens
    }

    /// Tokenizes and indexes one document.
    ///
    /// Returns the assigned document id, or `None` if the document was dropped.
    pub fn add_document(&mut self, name: &str, content: &str) -> Result<Option<u32>> {
        if name.is_empty() || name.contains('\n') {
            return Err(Error::invalid_arg("name", format!("invalid document name {name:?}")));
        }
        let mut tokens = WeightedTokens::collect(&self.tokenizer, content);
        if let Some(keywords) = &self.keywords {
            tokens.retain(|term| term.starts_with('#') || keywords.contains(term));
        }
        if tokens.is_empty() {
            self.dropped += 1;
            return Ok(None);
        }
        let doc_id = u32::try_from(self.documents.len())
            .ok()
            .filter(|&id| id < u32::MAX)
            .ok_or_else(|| Error::invalid_operation("too many documents"))?;
        let token_count = u32::try_from(tokens.total())
            .map_err(|_| Error::invalid_arg("content", "document has too many tokens"))?;

        for token in &tokens {
            match self.terms.get_mut(token.term.as_str()) {
                Some(list) => list.push(doc_id, token.weight)?,
                None => {
                    let mut list = PostingListBuilder::new();
                    list.push(doc_id, token.weight)?;
                    self.terms.insert(token.term.clone(), list);
                }
            }
        }
        self.documents.push(DocumentEntry {
            name: name.to_string(),
            token_count,
        });
        self.total_tokens += tokens.total();
        self.total_postings += tokens.len() as u64;

        let indexed = self.documents.len();
        if indexed % PROGRESS_INTERVAL == 0 {
            log::info!(
                "{indexed} documents in {:?}, {} terms, {} postings",
                self.last_progress.elapsed(),
                self.terms.len(),
                self.total_postings
            );
            self.last_progress = Instant::now();
        }
        Ok(Some(doc_id))
    }

    /// Indexes every document of a TREC corpus. Returns the number of documents read.
    pub fn add_trec<R: Read>(&mut self, reader: TrecReader<R>) -> Result<usize> {
        let mut count = 0;
        for document in reader {
            let document = document?;
            self.add_document(&document.name, &document.content)?;
            count += 1;
        }
        Ok(count)
    }

    /// Writes the postings file, terms in byte order.
    pub fn write<W: Write>(self, sink: W) -> Result<W> {
        log::info!(
            "writing {} documents ({} dropped as empty), {} terms",
            self.documents.len(),
            self.dropped,
            self.terms.len()
        );
        let mut writer = PostingsFileWriter::new(sink, self.kind, self.documents.len())?;
        for doc in &self.documents {
            writer.add_document(&doc.name, doc.token_count)?;
        }
        let mut terms: Vec<_> = self.terms.into_iter().collect();
        terms.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        let mut buf = Vec::new();
        for (term, list) in terms {
            buf.clear();
            list.write_to(&mut buf)?;
            writer.add_term(&term, &buf)?;
        }
        writer.finish()
    }
}

/// Reads a keyword list: whitespace-separated words, any number per line.
pub fn read_keywords<R: BufRead>(source: R) -> Result<AHashSet<String>> {
    let mut keywords = AHashSet::new();
    for line in source.lines() {
        let line = line.map_err(|e| Error::io("keywords", e))?;
        keywords.extend(line.split_whitespace().map(str::to_string));
    }
    Ok(keywords)
}
