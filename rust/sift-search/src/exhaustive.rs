use sift_common::Result;

use crate::{
    cursor::{DocumentLengths, TermCursor},
    topk::TopKHeap,
    wand::{QueryStats, ScoringContext, TopKResults},
};

/// Scores every document that appears in any list. Reference for [`wand_top_k`].
///
/// [`wand_top_k`]: crate::wand::wand_top_k
pub fn exhaustive_top_k<D: DocumentLengths + ?Sized>(
    mut cursors: Vec<TermCursor<'_>>,
    context: &ScoringContext<'_, D>,
    k: usize,
) -> Result<TopKResults> {
    let mut heap = TopKHeap::new(k)?;
    let mut stats = QueryStats {
        cursors: cursors.len(),
        ..Default::default()
    };
    cursors.sort_by_key(|cursor| cursor.term());

    loop {
        let doc_id = cursors
            .iter()
            .filter(|cursor| !cursor.is_exhausted())
            .map(|cursor| cursor.doc_id())
            .min();
        let Some(doc_id) = doc_id else {
            break;
        };
        let doc_len = context.lengths.doc_len(doc_id)?;
        let mut score = 0.0f32;
        for cursor in &mut cursors {
            if cursor.current().is_some_and(|p| p.doc_id == doc_id) {
                score += cursor.score(doc_len, context.avg_doc_len, &context.params);
                cursor.advance()?;
            }
        }
        stats.scored += 1;
        if heap.offer(doc_id, score) {
            stats.heap_insertions += 1;
        }
    }

    Ok(TopKResults {
        docs: heap.into_sorted_vec(),
        stats,
    })
}
