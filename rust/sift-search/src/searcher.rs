use std::{
    io::{BufRead, Write},
    time::Instant,
};

use sift_common::{Result, error::Error};
use sift_encodings::PostingListIterator;
use sift_index::{
    ContentKind, SearchIndex,
    tokenizers::{Tokenizer, TokenizerType, WeightedTokens},
};

use crate::{
    bm25::{idf, query_term_weight},
    cursor::TermCursor,
    exhaustive::exhaustive_top_k,
    options::{SearchOptions, Strategy},
    wand::{QueryStats, ScoringContext, wand_top_k},
};

/// Longest document name written to the results.
const MAX_NAME_LEN: usize = 1024;

/// A query line: optional `<name>;` label followed by the query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Query<'a> {
    pub name: Option<&'a str>,
    pub text: &'a str,
}

impl<'a> Query<'a> {
    pub fn parse(line: &'a str) -> Query<'a> {
        match line.split_once(';') {
            Some((name, text)) => Query {
                name: Some(name),
                text,
            },
            None => Query {
                name: None,
                text: line,
            },
        }
    }

    /// Prefix of every result line of this query.
    pub fn output_prefix(&self) -> String {
        self.name.map(|name| format!("{name}\t")).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub doc_id: u32,
    pub name: String,
    /// 1-based position in the results.
    pub rank: usize,
    pub score: f32,
}

#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    pub hits: Vec<SearchHit>,
    pub stats: QueryStats,
}

impl SearchResults {
    /// Writes one `<prefix><name>\t<rank>\t<score>` line per hit.
    pub fn write_to<W: Write>(&self, query: &Query, out: &mut W) -> Result<()> {
        let prefix = query.output_prefix();
        for hit in &self.hits {
            writeln!(out, "{prefix}{}\t{}\t{}", hit.name, hit.rank, hit.score)?;
        }
        Ok(())
    }
}

/// Runs BM25 top-k queries against an index.
pub struct Searcher<'a, T: Tokenizer = TokenizerType> {
    index: &'a SearchIndex,
    tokenizer: T,
    options: SearchOptions,
}

impl<'a, T: Tokenizer> Searcher<'a, T> {
    /// Math indexes can only be searched in math mode.
    pub fn new(index: &'a SearchIndex, tokenizer: T, options: SearchOptions) -> Result<Self> {
        options.validate()?;
        if index.kind() == ContentKind::Math && options.math_alpha.is_none() {
            return Err(Error::invalid_arg(
                "math_alpha",
                format!("{} is a math index, math mode is required", index.name()),
            ));
        }
        Ok(Searcher {
            index,
            tokenizer,
            options,
        })
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Evaluates a query text. Query terms absent from the index are ignored; an
    /// empty query has no results.
    pub fn search(&self, text: &str) -> Result<SearchResults> {
        let tokens = WeightedTokens::collect(&self.tokenizer, text);
        if tokens.is_empty() {
            log::debug!("empty query");
            return Ok(SearchResults::default());
        }

        let mut lists = Vec::with_capacity(tokens.len());
        for token in &tokens {
            match self.index.posting_list(&token.term)? {
                Some(list) => lists.push((token, list)),
                None => log::debug!("'{}' is not indexed", token.term),
            }
        }

        let doc_count = self.index.doc_count();
        let params = self.options.bm25;
        let cursors = lists
            .iter()
            .enumerate()
            .map(|(term, (token, list))| {
                let postings = PostingListIterator::new(list)?;
                let weight = self
                    .options
                    .balance(&token.term, query_term_weight(token.weight))
                    * idf(doc_count, postings.len());
                TermCursor::new(postings, weight, term, &params)
            })
            .collect::<Result<Vec<_>>>()?;

        let context = ScoringContext {
            lengths: self.index.documents(),
            avg_doc_len: self.index.average_doc_len(),
            params,
        };
        let results = match self.options.strategy {
            Strategy::Wand => wand_top_k(cursors, &context, self.options.k)?,
            Strategy::Exhaustive => exhaustive_top_k(cursors, &context, self.options.k)?,
        };
        log::debug!("{:?}", results.stats);

        let documents = self.index.documents();
        let hits = results
            .docs
            .iter()
            .enumerate()
            .map(|(i, doc)| {
                Ok(SearchHit {
                    doc_id: doc.doc_id,
                    name: documents.name_truncated(doc.doc_id, MAX_NAME_LEN)?,
                    rank: i + 1,
                    score: doc.score,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(SearchResults {
            hits,
            stats: results.stats,
        })
    }

    /// Answers one query per input line until the end of input or an empty line.
    /// Returns the number of queries run.
    pub fn run_queries<R: BufRead, W: Write>(&self, input: R, out: &mut W) -> Result<usize> {
        let mut count = 0;
        for line in input.lines() {
            let line = line.map_err(|e| Error::io("queries", e))?;
            if line.is_empty() {
                break;
            }
            let query = Query::parse(&line);
            log::info!("query: {}", query.name.unwrap_or(query.text));
            let started = Instant::now();
            let results = self.search(query.text)?;
            results.write_to(&query, out)?;
            log::info!(
                "{} results in {:.3}ms",
                results.hits.len(),
                started.elapsed().as_secs_f64() * 1000.0
            );
            count += 1;
        }
        out.flush()?;
        Ok(count)
    }
}
