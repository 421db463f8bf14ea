use corpus_tokens::{
    CompoundOptions, FcmOptions, LookupOptions, NgramOptions, OverlapPolicy, PatternSet, SegmentOptions,
    SelectOptions, Threads, TokenId, TokensConfig, TokensObject, TokensState,
};

fn sample(threads: Threads) -> TokensObject {
    let docs = [
        "the quick brown fox jumps over the lazy dog",
        "the lazy dog sleeps . the fox runs",
        "",
        "a quick brown dog . a lazy fox",
    ];
    let docs: Vec<Vec<&str>> = docs.iter().map(|d| d.split_whitespace().collect()).collect();
    TokensObject::from_strings(&docs)
        .with_config(TokensConfig::new().threads(threads))
        .unwrap()
}

fn ids(toks: &TokensObject, words: &[&str]) -> Vec<TokenId> {
    words.iter().map(|w| toks.vocabulary().id_of(w).unwrap()).collect()
}

#[test]
fn recompile_is_idempotent_and_conserves_tokens() {
    let mut toks = sample(Threads::Sequential);
    let total = toks.ntoken_total();
    toks.ngrams(&NgramOptions::new(vec![1, 2], vec![1])).unwrap();
    toks.recompile();
    let once = toks.clone();
    toks.recompile();
    assert_eq!(toks, once);
    assert_eq!(toks.state(), TokensState::Clean);
    assert!(toks.ntoken_total() > total);
}

#[test]
fn chunk_reconstruction() {
    let mut toks = TokensObject::new(vec![vec![1, 2, 3, 4, 5, 6]], ["a", "b", "c", "d", "e", "f"]).unwrap();
    let mut overlapping = toks.clone();
    toks.chunk(2, 0).unwrap();
    assert_eq!(toks.texts(), &[vec![1, 2], vec![3, 4], vec![5, 6]]);
    assert_eq!(toks.texts().concat(), vec![1, 2, 3, 4, 5, 6]);
    overlapping.chunk(2, 1).unwrap();
    assert_eq!(overlapping.ndoc(), 5);
}

#[test]
fn combine_then_subset_returns_first_operand() {
    let mut a = TokensObject::from_strings(&[vec!["x", "y"], vec!["y", "z"]]);
    let mut b = TokensObject::from_strings(&[vec!["z", "w"]]);
    a.recompile();
    b.recompile();
    let before = a.clone();
    a.combine(&b).unwrap();
    assert_eq!(a.ndoc(), 3);
    a.subset(&[1, 2]).unwrap();
    a.recompile();
    assert_eq!(a, before);
}

#[test]
fn dfm_column_sums_are_document_lengths() {
    let mut toks = sample(Threads::Auto);
    let lengths: Vec<f64> = toks.ntoken().into_iter().map(|n| n as f64).collect();
    let m = toks.dfm(false).unwrap();
    assert_eq!(m.col_sums(), lengths);
    assert_eq!(m.nrow(), toks.types().len());
}

#[test]
fn bigrams_of_shared_text() {
    let mut toks = TokensObject::from_strings(&[vec!["a", "b", "c"], vec!["b", "c"]]);
    toks.ngrams(&NgramOptions::default()).unwrap();
    let types: Vec<&str> = toks.types().iter().map(|t| t.as_ref()).collect();
    assert_eq!(types, vec!["a_b", "b_c"]);
}

#[test]
fn lookup_maps_unmatched_tokens_to_nomatch() {
    let mut toks = TokensObject::from_strings(&[vec!["cat", "and", "dog"]]);
    let patterns = PatternSet::from_sequences([ids(&toks, &["cat"]), ids(&toks, &["dog"])]).unwrap();
    let keys: Vec<Vec<TokenId>> = vec![vec![1], vec![1]];
    toks.lookup(&patterns, &keys, &["animal", "other"], &LookupOptions::nomatch(Some(2))).unwrap();
    assert_eq!(toks.as_strings(), vec![vec!["animal", "other", "animal"]]);
}

#[test]
fn glob_patterns_select_types() {
    let mut toks = sample(Threads::Sequential);
    let mut patterns = PatternSet::new();
    patterns.push_alternatives(&[toks.vocabulary().glob("*o?", false).unwrap()]).unwrap();
    toks.select(&patterns, &SelectOptions::keep()).unwrap();
    let kept: Vec<Vec<&str>> = toks.as_strings();
    assert_eq!(kept[0], vec!["fox", "dog"]);
    assert_eq!(kept[3], vec!["dog", "fox"]);
}

#[test]
fn pipeline_is_identical_for_every_thread_setting() {
    let run = |threads: Threads| {
        let mut toks = sample(threads);
        let quick_brown = ids(&toks, &["quick", "brown"]);
        let lazy_dog = ids(&toks, &["lazy", "dog"]);
        let period = ids(&toks, &["."]);
        let compounds = PatternSet::from_sequences([quick_brown, lazy_dog])
            .unwrap()
            .overlap(OverlapPolicy::First);
        toks.compound(&compounds, &CompoundOptions::default()).unwrap();
        let delimiters = PatternSet::from_sequences([period]).unwrap();
        let provenance = toks
            .segment(&delimiters, &SegmentOptions::default().remove_delimiter(true))
            .unwrap();
        toks.ngrams(&NgramOptions::new(vec![1, 2], vec![1, 2])).unwrap();
        let dfm = toks.dfm(false).unwrap();
        let fcm = toks.fcm(&FcmOptions::default()).unwrap();
        (provenance, dfm, fcm, toks.into_parts())
    };
    let sequential = run(Threads::Sequential);
    assert_eq!(sequential, run(Threads::Auto));
    assert_eq!(sequential, run(Threads::Fixed(3)));
}

#[test]
fn cbor_round_trip_after_transforms() {
    let mut toks = sample(Threads::Sequential);
    toks.chunk(3, 1).unwrap();
    let back = TokensObject::from_cbor(&toks.to_cbor().unwrap()).unwrap();
    assert_eq!(back, toks);
}
