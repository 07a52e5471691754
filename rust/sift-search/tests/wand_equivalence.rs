use std::io::Cursor;

use sift_encodings::{Posting, PostingListIterator, posting_list::encode};
use sift_index::{
    ContentKind, IndexMetadata, SearchIndex, postings_file::PostingsFileReader,
    tokenizers::TokenizerType, write::IndexBuilder,
};
use sift_search::{
    Bm25Params, ScoringContext, SearchOptions, Searcher, Strategy, TermCursor, TopKResults,
    exhaustive::exhaustive_top_k, wand::wand_top_k,
};
use sift_testkit::{corpus, data_gen};

struct Workload {
    lists: Vec<Vec<u8>>,
    weights: Vec<f32>,
    lengths: Vec<u32>,
}

impl Workload {
    fn random(seed: u64, doc_count: u32, list_lens: &[usize]) -> Workload {
        let mut rng = fastrand::Rng::with_seed(seed);
        let lists = list_lens
            .iter()
            .map(|&len| {
                let postings: Vec<_> = data_gen::posting_list(&mut rng, doc_count, len, 12)
                    .into_iter()
                    .map(|(doc, freq)| Posting::new(doc, freq))
                    .collect();
                encode(&postings).unwrap()
            })
            .collect();
        let weights = list_lens
            .iter()
            .map(|_| 0.05 + rng.f32() * 3.0)
            .collect();
        let lengths = data_gen::doc_lengths(&mut rng, doc_count as usize, 1, 200);
        Workload {
            lists,
            weights,
            lengths,
        }
    }

    fn run(&self, k: usize, strategy: Strategy) -> TopKResults {
        let params = Bm25Params::default();
        let cursors = self
            .lists
            .iter()
            .zip(&self.weights)
            .enumerate()
            .map(|(term, (list, &weight))| {
                TermCursor::new(PostingListIterator::new(list).unwrap(), weight, term, &params)
                    .unwrap()
            })
            .collect();
        let avg = self.lengths.iter().map(|&l| l as f64).sum::<f64>() / self.lengths.len() as f64;
        let context = ScoringContext {
            lengths: &self.lengths,
            avg_doc_len: avg as f32,
            params,
        };
        match strategy {
            Strategy::Wand => wand_top_k(cursors, &context, k).unwrap(),
            Strategy::Exhaustive => exhaustive_top_k(cursors, &context, k).unwrap(),
        }
    }

    fn contains(&self, doc_id: u32) -> bool {
        self.lists.iter().any(|list| {
            sift_encodings::posting_list::decode(list)
                .unwrap()
                .iter()
                .any(|p| p.doc_id == doc_id)
        })
    }
}

#[test]
fn test_wand_matches_exhaustive() {
    let mut rng = fastrand::Rng::with_seed(2024);
    for seed in 0..60 {
        let doc_count = rng.u32(1..3000);
        let terms = rng.usize(1..7);
        let list_lens: Vec<usize> = (0..terms)
            .map(|_| rng.usize(1..=(doc_count as usize).min(400)))
            .collect();
        let workload = Workload::random(seed, doc_count, &list_lens);
        for k in [1, 3, 10, 50] {
            let wand = workload.run(k, Strategy::Wand);
            let exhaustive = workload.run(k, Strategy::Exhaustive);
            assert_eq!(wand.docs, exhaustive.docs, "seed {seed}, k {k}");
            assert!(wand.stats.scored <= exhaustive.stats.scored);
        }
    }
}

#[test]
fn test_wand_skips_work() {
    let mut workload = Workload::random(77, 20_000, &[3, 20_000 / 2, 20_000 / 3]);
    // Equal weights: once the threshold passes a single term's bound, documents
    // holding just one term are skipped.
    workload.weights = vec![1.0; 3];
    let wand = workload.run(10, Strategy::Wand);
    let exhaustive = workload.run(10, Strategy::Exhaustive);
    assert_eq!(wand.docs, exhaustive.docs);
    assert!(wand.stats.scored + wand.stats.pruned < exhaustive.stats.scored);
    assert!(wand.stats.skips > 0);
}

#[test]
fn test_scenario_three_terms() {
    let workload = Workload::random(5, 1000, &[2, 5, 100]);
    let results = workload.run(10, Strategy::Wand);
    assert!(!results.docs.is_empty());
    assert!(results.docs.len() <= 10);
    assert!(results.docs.windows(2).all(|w| w[0].score >= w[1].score));
    assert!(results.docs.iter().all(|doc| workload.contains(doc.doc_id)));
    assert_eq!(results.stats.cursors, 3);
}

#[test]
fn test_k_one() {
    let workload = Workload::random(9, 500, &[40, 7]);
    let best = workload.run(1, Strategy::Wand);
    let all = workload.run(500, Strategy::Exhaustive);
    assert_eq!(best.docs.len(), 1);
    assert_eq!(best.docs[0], all.docs[0]);

    let empty = Workload {
        lists: Vec::new(),
        weights: Vec::new(),
        lengths: vec![1],
    };
    assert!(empty.run(1, Strategy::Wand).docs.is_empty());
}

#[test]
fn test_searcher_strategies_agree() {
    let docs = corpus::documents(13, 800, 400, 60);
    let mut builder = IndexBuilder::new(ContentKind::Math, TokenizerType::default());
    for doc in &docs {
        builder.add_document(&doc.name, &doc.content()).unwrap();
    }
    let data = builder.write(Vec::new()).unwrap();
    let reader = PostingsFileReader::open(Cursor::new(&data), "corpus").unwrap();
    let metadata = IndexMetadata::from_postings(reader, data.len() as u64).unwrap();
    let index = SearchIndex::open_with("corpus", Box::new(data), metadata).unwrap();

    let wand = Searcher::new(
        &index,
        TokenizerType::default(),
        SearchOptions::default().with_math(0.18),
    )
    .unwrap();
    let exhaustive = Searcher::new(
        &index,
        TokenizerType::default(),
        SearchOptions::default()
            .with_math(0.18)
            .with_strategy(Strategy::Exhaustive),
    )
    .unwrap();

    let mut rng = fastrand::Rng::with_seed(99);
    for _ in 0..40 {
        let query_len = rng.usize(1..5);
        let query = docs[rng.usize(..docs.len())]
            .tokens
            .iter()
            .take(query_len)
            .cloned()
            .collect::<Vec<_>>()
            .join(" ");
        let expected = exhaustive.search(&query).unwrap();
        let actual = wand.search(&query).unwrap();
        assert_eq!(actual.hits, expected.hits, "query {query:?}");
    }
}
