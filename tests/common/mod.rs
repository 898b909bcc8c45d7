//! Shared fixtures: small triple dumps indexed into temporary directories.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use kbsearch::config::IndexConfig;
use kbsearch::indexing::{index_file, IndexStats, LanguageRegistry};
use kbsearch::querying::{KbIndex, SubjectResolver};

/// Tab-separated triple lines, one per `(subject, predicate, value)`.
pub fn dump(triples: &[(&str, &str, &str)]) -> String {
    triples
        .iter()
        .map(|(s, p, v)| format!("{}\t{}\t{}\t.\n", s, p, v))
        .collect()
}

/// Writes `triples` and `predicates` into `dir` and indexes them.
pub fn build_index(
    dir: &Path,
    triples: &str,
    predicates: &[&str],
    languages: LanguageRegistry,
) -> (PathBuf, IndexStats) {
    let triples_file = dir.join("kb.tsv");
    fs::write(&triples_file, triples).unwrap();
    let predicates_file = dir.join("predicates.txt");
    fs::write(&predicates_file, predicates.join("\n")).unwrap();

    let config = IndexConfig {
        triples_file: Some(triples_file),
        indexed_predicates_file: Some(predicates_file),
        languages,
        writer_memory: 50_000_000,
        ..IndexConfig::default()
    };
    let stats = index_file(&config).unwrap();
    (config.index_directory().unwrap(), stats)
}

pub fn open(location: &Path) -> (Arc<KbIndex>, SubjectResolver) {
    let index = Arc::new(KbIndex::open(location).unwrap());
    let resolver = SubjectResolver::new(Arc::clone(&index));
    (index, resolver)
}

/// People and places with labels in several languages and importance values.
pub fn people() -> String {
    dump(&[
        ("<f_m.01>", "<pr_bin>", "3"),
        ("<f_m.01>", "<r_type>", "<f_people.person>"),
        ("<f_m.01>", "<rs_label>", "\"Barack Obama\"@en"),
        ("<f_m.01>", "<rs_label>", "\"巴拉克·奥巴马\"@zh"),
        ("<f_m.01>", "<knows>", "<f_m.02>"),
        ("<f_m.02>", "<pr_bin>", "9"),
        ("<f_m.02>", "<r_type>", "<f_people.person>"),
        ("<f_m.02>", "<rs_label>", "\"Michelle Obama\"@en"),
        ("<f_m.02>", "<rs_label>", "\"Michelle Obama\"@es"),
        ("<f_m.02>", "<knows>", "<f_m.03>"),
        ("<f_m.03>", "<r_type>", "<f_location.location>"),
        ("<f_m.03>", "<rs_label>", "\"Honolulu\"@en"),
        ("<f_m.03>", "<f_location.location.area>", "177"),
        ("<f_m.04>", "<rs_label>", "\"Obama Street\""),
    ])
}
