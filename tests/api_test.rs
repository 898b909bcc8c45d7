//! Lookup, search and printing through the search API, and the label store.

mod common;

use std::fs;

use common::{build_index, people};
use kbsearch::api::SearchApi;
use kbsearch::config::SearchConfig;
use kbsearch::indexing::LanguageRegistry;
use kbsearch::labels::LabelStore;
use kbsearch::parsing::TripleReader;
use kbsearch::querying::{parse_chain, PrintMode, RankerKind};
use kbsearch::render::{LabelLookup, Render, TypedRenderer};
use tempfile::TempDir;

const PREDICATES: &[&str] = &["<rs_label>", "<r_type>", "<knows>"];

fn api(dir: &TempDir, languages: LanguageRegistry) -> SearchApi {
    let (location, _) = build_index(dir.path(), &people(), PREDICATES, languages);
    SearchApi::open(SearchConfig { index_directory: Some(location), ..SearchConfig::default() }).unwrap()
}

#[test]
fn test_print_modes() {
    let dir = TempDir::new().unwrap();
    let api = api(&dir, LanguageRegistry::new());

    let mode = PrintMode::parse("subject");
    let doc = api.lookup("f_m.03", &mode).unwrap().unwrap();
    assert!(doc.is_empty());
    assert_eq!(api.print(&doc, None, &mode).unwrap(), "f_m.03\n");
    assert_eq!(api.print(&doc, Some(2.5), &mode).unwrap(), "f_m.03\t2.5\n");

    let mode = PrintMode::All;
    let doc = api.lookup("f_m.03", &mode).unwrap().unwrap();
    assert_eq!(
        api.print(&doc, None, &mode).unwrap(),
        "f_m.03:\n    f_location.location.area: 177\n    r_type: f_location.location\n    rs_label: \"Honolulu\"@en\n"
    );

    let mode = PrintMode::parse("rs_label, knows>rs_label");
    let doc = api.lookup("f_m.01", &mode).unwrap().unwrap();
    assert_eq!(
        api.print(&doc, None, &mode).unwrap(),
        "f_m.01\trs_label\t\"Barack Obama\"@en\n\
         f_m.01\trs_label\t\"巴拉克·奥巴马\"@zh\n\
         f_m.01\tknows\tf_m.02\trs_label\t\"Michelle Obama\"@en\n\
         f_m.01\tknows\tf_m.02\trs_label\t\"Michelle Obama\"@es\n"
    );
}

#[test]
fn test_search_with_both_rankers() {
    let dir = TempDir::new().unwrap();
    let api = api(&dir, LanguageRegistry::with_defaults());

    let multi = api.search("obama", RankerKind::Multi, Some(2), None).unwrap();
    assert_eq!(multi.total_hits, 3);
    assert_eq!(multi.documents.len(), 2);
    assert_eq!(multi.documents[0].doc.subject, "f_m.02");

    // Language-tagged labels live in `rs_label@lang`, only the untagged one is in `rs_label`.
    let basic = api.search("obama", RankerKind::Basic, None, None).unwrap();
    assert_eq!(basic.documents.len(), 1);
    assert_eq!(basic.documents[0].doc.subject, "f_m.04");

    let response = api.search_hits("honolulu", RankerKind::Multi, Some(10)).unwrap();
    assert_eq!(response.ranker, "multi");
    assert_eq!(response.hits.len(), 1);
    let hit = &response.hits[0];
    assert_eq!(hit.subject, "f_m.03");
    assert_eq!(hit.types, vec!["f_location.location"]);
    assert_eq!(hit.label.as_deref(), Some("Honolulu"));
    assert_eq!(hit.importance, 0);
}

#[test]
fn test_chain_rows_follow_configuration() {
    let dir = TempDir::new().unwrap();
    let api = api(&dir, LanguageRegistry::new());
    let chains = [parse_chain("knows>knows>r_type")];
    assert_eq!(
        api.chain_rows("f_m.01", &chains, None).unwrap(),
        vec![vec!["f_m.01", "f_m.02", "f_m.03", "f_location.location"]]
    );
    assert_eq!(
        api.chain_rows("f_m.03", &[parse_chain("knows")], Some(false)).unwrap(),
        vec![vec!["f_m.03", "null"]]
    );
}

#[test]
fn test_typed_rendering_uses_index_labels() {
    let dir = TempDir::new().unwrap();
    let api = api(&dir, LanguageRegistry::new());
    let doc = api.lookup("f_m.01", &PrintMode::All).unwrap().unwrap();
    let text = TypedRenderer::default().render(&doc, None, Some(api.resolver())).unwrap();
    assert!(text.starts_with("f_m.01:\n"));
    assert!(text.contains("    knows: f_m.02 (Michelle Obama)\n"));
}

#[test]
fn test_label_store_from_triples_file() {
    let dir = TempDir::new().unwrap();
    let triples = dir.path().join("kb.tsv");
    fs::write(&triples, people()).unwrap();

    let store = LabelStore::build_from_triples(TripleReader::open(&triples).unwrap(), Some("rs_label")).unwrap();
    assert_eq!(store.len(), 3);
    assert_eq!(store.get("f_m.01"), Some("Barack Obama"));
    assert_eq!(store.get("f_m.04"), None);

    let path = dir.path().join("labels.bin");
    store.save_to_file(&path).unwrap();
    let loaded = LabelStore::load_from_file(&path).unwrap();
    assert_eq!(loaded.english_label("f_m.02").unwrap().as_deref(), Some("Michelle Obama"));
}

#[test]
fn test_configured_search_depth_caps_hits() {
    let dir = TempDir::new().unwrap();
    let (location, _) = build_index(dir.path(), &people(), PREDICATES, LanguageRegistry::with_defaults());
    let config = SearchConfig { index_directory: Some(location), search_depth: 1, ..SearchConfig::default() };
    let api = SearchApi::open(config).unwrap();

    let outcome = api.search("obama", RankerKind::Multi, None, None).unwrap();
    assert_eq!(outcome.total_hits, 3);
    assert_eq!(outcome.documents.len(), 1);
    assert_eq!(outcome.documents[0].doc.subject, "f_m.02");
    assert!(api.search("obama", RankerKind::Multi, Some(0), None).unwrap().documents.is_empty());
}
