use std::io::{BufRead, Write};

use sift_common::{Result, error::Error};
use sift_encodings::{
    posting_list::{ListHead, write_header},
    varbyte::write_varint,
};

use crate::postings_file::{PostingsFileReader, PostingsFileWriter, TermRecord};

/// Merges postings files into one, streaming term by term.
///
/// The document tables are concatenated in input order, so the documents of input
/// `i` are shifted by the total document count of inputs `0..i`. Posting lists of
/// the same token are concatenated: only the list header and the first delta of
/// each part are re-encoded, the remaining bytes are copied as they are.
///
/// Returns the sink after the merged file has been written.
pub fn merge_postings_files<R: BufRead, W: Write>(
    mut inputs: Vec<PostingsFileReader<R>>,
    sink: W,
) -> Result<W> {
    let Some(first) = inputs.first() else {
        return Err(Error::invalid_arg("inputs", "no postings files to merge"));
    };
    let kind = first.kind();
    if let Some(other) = inputs.iter().find(|input| input.kind() != kind) {
        return Err(Error::invalid_arg(
            "inputs",
            format!(
                "inconsistent file formats: {} is {}, expected {}",
                other.name(),
                other.kind().name(),
                kind.name()
            ),
        ));
    }

    let total_docs: usize = inputs.iter().map(|input| input.doc_count()).sum();
    if u32::try_from(total_docs).is_err() {
        return Err(Error::invalid_arg("inputs", "merged document count exceeds u32"));
    }
    let mut writer = PostingsFileWriter::new(sink, kind, total_docs)?;
    let mut shards = Vec::with_capacity(inputs.len());
    let mut base = 0u32;
    for input in &mut inputs {
        let doc_count = input.doc_count() as u32;
        while let Some(doc) = input.next_document()? {
            writer.add_document(&doc.name, doc.token_count)?;
        }
        shards.push(Shard { base, doc_count });
        base += doc_count;
    }
    log::info!(
        "merging {} postings files with {total_docs} documents",
        inputs.len()
    );

    let mut current: Vec<Option<TermRecord>> = inputs
        .iter_mut()
        .map(|input| input.next_term())
        .collect::<Result<_>>()?;
    let mut merged = Vec::new();
    loop {
        let Some(token) = current
            .iter()
            .flatten()
            .map(|record| record.token.as_str())
            .min()
            .map(str::to_string)
        else {
            break;
        };

        let parts = current
            .iter()
            .zip(&shards)
            .filter_map(|(record, shard)| {
                record
                    .as_ref()
                    .filter(|r| r.token == token)
                    .map(|r| (r, shard))
            })
            .collect::<Vec<_>>();
        merged.clear();
        concat_lists(&parts, &token, &mut merged)?;
        writer.add_term(&token, &merged)?;

        for (record, input) in current.iter_mut().zip(inputs.iter_mut()) {
            if record.as_ref().is_some_and(|r| r.token == token) {
                *record = input.next_term()?;
            }
        }
    }
    log::info!("merged {} terms", writer.term_count());
    writer.finish()
}

struct Shard {
    base: u32,
    doc_count: u32,
}

fn concat_lists(parts: &[(&TermRecord, &Shard)], token: &str, out: &mut Vec<u8>) -> Result<()> {
    let mut heads = Vec::with_capacity(parts.len());
    let mut len = 0u32;
    for (record, shard) in parts {
        let head = ListHead::parse(&record.postings)?;
        if head.last_doc_id >= shard.doc_count {
            return Err(Error::integrity(
                token,
                format!(
                    "document id {} beyond the {} documents of its file",
                    head.last_doc_id, shard.doc_count
                ),
            ));
        }
        len = len
            .checked_add(head.len)
            .ok_or_else(|| Error::integrity(token, "posting list too long"))?;
        heads.push((head, shard.base));
    }
    let Some((last, last_base)) = heads.last() else {
        return Err(Error::invalid_operation("merging an empty set of lists"));
    };
    let last_doc_id = last.last_doc_id + last_base;

    out.reserve(heads.iter().map(|(head, _)| head.tail.len() + 5).sum::<usize>() + 10);
    write_header(out, len, last_doc_id);
    let mut prev = 0u32;
    for (head, base) in &heads {
        let first = head.first_doc_id + base;
        write_varint(out, (first - prev) as u64);
        out.extend_from_slice(head.tail);
        prev = head.last_doc_id + base;
    }
    Ok(())
}
