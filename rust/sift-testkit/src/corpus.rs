//! Synthetic TREC-style corpora.

use std::io::{Seek, SeekFrom, Write};

/// A generated document: a name and its pre-tokenized content.
#[derive(Debug, Clone)]
pub struct SyntheticDoc {
    pub name: String,
    pub tokens: Vec<String>,
}

impl SyntheticDoc {
    pub fn content(&self) -> String {
        self.tokens.join(" ")
    }
}

/// Generates `count` documents over a vocabulary of `vocab_size` terms.
///
/// Term popularity is skewed (low term numbers are far more frequent) so that the
/// resulting posting lists range from a handful of entries to most of the corpus.
/// Roughly one term in ten is a `#`-prefixed math token. Lengths are drawn from
/// `0..=max_len`, so empty documents occur.
pub fn documents(seed: u64, count: usize, vocab_size: usize, max_len: usize) -> Vec<SyntheticDoc> {
    assert!(vocab_size > 0);
    let mut rng = fastrand::Rng::with_seed(seed);
    (0..count)
        .map(|i| {
            let len = rng.usize(0..=max_len);
            let tokens = (0..len)
                .map(|_| {
                    let r = rng.f64();
                    let term = ((r * r * r) * vocab_size as f64) as usize;
                    if term % 10 == 9 {
                        format!("#m{term}")
                    } else {
                        format!("t{term}")
                    }
                })
                .collect();
            SyntheticDoc {
                name: format!("doc-{seed}-{i:05}"),
                tokens,
            }
        })
        .collect()
}

/// Renders documents in the TREC format: `<DOC>`, `<DOCNO>`, `<DOCHDR>`, content.
pub fn to_trec(docs: &[SyntheticDoc]) -> String {
    let mut out = String::new();
    for (i, doc) in docs.iter().enumerate() {
        out.push_str("<DOC>\n<DOCNO>");
        out.push_str(&doc.name);
        out.push_str("</DOCNO>\n");
        if i % 2 == 0 {
            out.push_str("<DOCHDR>\nhttp://example.org/");
            out.push_str(&doc.name);
            out.push_str("\n</DOCHDR>\n");
        }
        out.push_str(&doc.content());
        out.push_str("\n</DOC>\n");
    }
    out
}

/// Writes `contents` into a new temporary file, rewound to the start.
pub fn write_temp_file(contents: &[u8]) -> anyhow::Result<tempfile::NamedTempFile> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(contents)?;
    file.flush()?;
    file.seek(SeekFrom::Start(0))?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_are_deterministic() {
        let a = documents(11, 20, 50, 30);
        let b = documents(11, 20, 50, 30);
        assert_eq!(a.len(), 20);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.name, y.name);
            assert_eq!(x.tokens, y.tokens);
        }
        let trec = to_trec(&a);
        assert_eq!(trec.matches("<DOC>").count(), 20);
        assert_eq!(trec.matches("</DOCHDR>").count(), 10);
    }
}
