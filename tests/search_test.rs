//! Ranked search through the basic and multi-field rankers.

mod common;

use std::sync::Arc;

use common::{build_index, dump, open, people};
use kbsearch::indexing::LanguageRegistry;
use kbsearch::querying::{BasicRanker, KbIndex, MultiFieldRanker, RankedResults, Ranker, SubjectResolver};
use kbsearch::Error;
use tempfile::TempDir;

const PREDICATES: &[&str] = &["<rs_label>", "<r_type>"];

fn subjects(resolver: &SubjectResolver, results: &RankedResults) -> Vec<String> {
    results
        .hits
        .iter()
        .map(|hit| resolver.document(hit.doc, None).unwrap().subject)
        .collect()
}

fn score_of(resolver: &SubjectResolver, results: &RankedResults, subject: &str) -> f32 {
    results
        .hits
        .iter()
        .find(|hit| resolver.document(hit.doc, None).unwrap().subject == subject)
        .map(|hit| hit.score)
        .unwrap()
}

#[test]
fn test_basic_ranker_searches_one_field() {
    let dir = TempDir::new().unwrap();
    let (location, _) = build_index(dir.path(), &people(), PREDICATES, LanguageRegistry::new());
    let (index, resolver) = open(&location);

    let ranker = BasicRanker::new(Arc::clone(&index), "rs_label");
    let results = ranker.rank("obama", Some(10)).unwrap();
    assert_eq!(results.total_hits, 3);
    assert_eq!(results.hits.len(), 3);
    assert!(results.hits.windows(2).all(|pair| pair[0].score >= pair[1].score));

    let limited = ranker.rank("obama", Some(1)).unwrap();
    assert_eq!(limited.total_hits, 3);
    assert_eq!(limited.hits.len(), 1);

    let all = ranker.rank("honolulu", None).unwrap();
    assert_eq!(subjects(&resolver, &all), vec!["f_m.03"]);

    assert!(ranker.rank("zebra", None).unwrap().hits.is_empty());
}

#[test]
fn test_query_syntax_errors_are_reported() {
    let dir = TempDir::new().unwrap();
    let (location, _) = build_index(dir.path(), &people(), PREDICATES, LanguageRegistry::new());
    let (index, _) = open(&location);

    let ranker = BasicRanker::new(Arc::clone(&index), "rs_label");
    assert!(matches!(ranker.rank("nosuchfield:obama", Some(5)), Err(Error::QueryParse { .. })));
    assert!(matches!(
        BasicRanker::new(index, "no_such_field").rank("obama", Some(5)),
        Err(Error::Config(_))
    ));
}

#[test]
fn test_language_tagged_text_gets_language_fields() {
    let dir = TempDir::new().unwrap();
    let (location, _) = build_index(dir.path(), &people(), PREDICATES, LanguageRegistry::with_defaults());
    let (index, _) = open(&location);

    assert_eq!(index.doc_freq("rs_label@en", "obama").unwrap(), 2);
    assert_eq!(index.doc_freq("text@en", "obama").unwrap(), 2);
    assert_eq!(index.doc_freq("rs_label@zh", "奥巴").unwrap(), 1);
    // Untagged text stays in the plain fields.
    assert_eq!(index.doc_freq("rs_label", "obama").unwrap(), 1);
    assert_eq!(index.doc_freq("text", "street").unwrap(), 1);
}

#[test]
fn test_multi_field_ranking_weighs_importance() {
    let dir = TempDir::new().unwrap();
    let (location, _) = build_index(dir.path(), &people(), PREDICATES, LanguageRegistry::with_defaults());
    let (index, resolver) = open(&location);

    let ranker = MultiFieldRanker::new(Arc::clone(&index)).unwrap();
    let results = ranker.rank("obama", None).unwrap();
    assert_eq!(results.total_hits, 3);
    let found = subjects(&resolver, &results);
    assert_eq!(found[0], "f_m.02");
    assert!(found.contains(&"f_m.04".to_string()));

    let chinese = ranker.rank("奥巴马", Some(10)).unwrap();
    assert_eq!(subjects(&resolver, &chinese), vec!["f_m.01"]);

    let phrase = ranker.rank("michelle obama", Some(10)).unwrap();
    assert_eq!(subjects(&resolver, &phrase)[0], "f_m.02");
}

#[test]
fn test_missing_importance_is_neutral() {
    let dir = TempDir::new().unwrap();
    let triples = dump(&[
        ("<x1>", "<pr_bin>", "1"),
        ("<x1>", "<rs_label>", "\"river\"@en"),
        ("<x2>", "<rs_label>", "\"river\"@en"),
        ("<x3>", "<pr_bin>", "0"),
        ("<x3>", "<rs_label>", "\"river\"@en"),
        ("<x4>", "<pr_bin>", "4"),
        ("<x4>", "<rs_label>", "\"river\"@en"),
    ]);
    let (location, _) = build_index(dir.path(), &triples, PREDICATES, LanguageRegistry::with_defaults());
    let (index, resolver) = open(&location);

    let results = MultiFieldRanker::new(Arc::clone(&index)).unwrap().rank("river", None).unwrap();
    assert_eq!(results.total_hits, 4);
    assert_eq!(subjects(&resolver, &results)[0], "x4");

    let neutral = score_of(&resolver, &results, "x1");
    assert!(neutral > 0.0);
    assert!((score_of(&resolver, &results, "x2") - neutral).abs() < 1e-4);
    assert!((score_of(&resolver, &results, "x3") - neutral).abs() < 1e-4);
    assert!((score_of(&resolver, &results, "x4") - 4.0 * neutral).abs() < 1e-3);
}

#[test]
fn test_multi_field_ranker_needs_a_known_field() {
    let dir = TempDir::new().unwrap();
    let (location, _) = build_index(dir.path(), &people(), &["<r_type>"], LanguageRegistry::new());
    let index: Arc<KbIndex> = open(&location).0;

    // Only `text` exists without language fields.
    let ranker = MultiFieldRanker::new(Arc::clone(&index)).unwrap();
    assert_eq!(ranker.rank("obama", None).unwrap().total_hits, 0);
    assert!(MultiFieldRanker::with_fields(index, &["rs_label@fr"]).is_err());
}

fn rivers(count: usize) -> String {
    let subjects: Vec<String> = (1..=count).map(|i| format!("<r{}>", i)).collect();
    let triples: Vec<(&str, &str, &str)> =
        subjects.iter().map(|s| (s.as_str(), "<rs_label>", "\"river\"")).collect();
    dump(&triples)
}

#[test]
fn test_search_depth_caps_results() {
    let dir = TempDir::new().unwrap();
    let (location, _) = build_index(dir.path(), &rivers(5), PREDICATES, LanguageRegistry::new());
    let (index, _) = open(&location);

    let basic = BasicRanker::new(Arc::clone(&index), "rs_label").with_depth(2);
    let results = basic.rank("river", None).unwrap();
    assert_eq!(results.total_hits, 5);
    assert_eq!(results.hits.len(), 2);
    assert_eq!(basic.rank("river", Some(10)).unwrap().hits.len(), 2);
    assert_eq!(basic.rank("river", Some(1)).unwrap().hits.len(), 1);

    let multi = MultiFieldRanker::new(Arc::clone(&index)).unwrap().with_depth(2);
    assert_eq!(multi.rank("river", None).unwrap().hits.len(), 2);

    let unbounded = BasicRanker::new(index, "rs_label");
    assert_eq!(unbounded.rank("river", None).unwrap().hits.len(), 5);
}

#[test]
fn test_zero_limit_returns_no_hits() {
    let dir = TempDir::new().unwrap();
    let (location, _) = build_index(dir.path(), &rivers(3), PREDICATES, LanguageRegistry::new());
    let (index, _) = open(&location);

    let results = BasicRanker::new(Arc::clone(&index), "rs_label").rank("river", Some(0)).unwrap();
    assert_eq!(results.total_hits, 3);
    assert!(results.hits.is_empty());

    let results = MultiFieldRanker::new(Arc::clone(&index)).unwrap().rank("river", Some(0)).unwrap();
    assert_eq!(results.total_hits, 3);
    assert!(results.hits.is_empty());

    let results = BasicRanker::new(index, "rs_label").with_depth(0).rank("river", None).unwrap();
    assert!(results.hits.is_empty());
}
