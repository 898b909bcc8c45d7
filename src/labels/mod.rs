//! English label side-store, keyed by subject.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::{normalize_uri, Triple, ValueNormalizer};
use crate::error::{Error, Result};
use crate::render::{english_text, LabelLookup};

const PROGRESS_INTERVAL: u64 = 1_000_000;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LabelStore {
    labels: HashMap<String, String>,
}

impl LabelStore {
    pub fn new() -> Self {
        LabelStore { labels: HashMap::new() }
    }

    /// Keeps the English values of a triple stream, optionally of one predicate
    /// only. A later label of the same subject replaces an earlier one.
    pub fn build_from_triples<I>(triples: I, predicate: Option<&str>) -> Result<Self>
    where
        I: IntoIterator<Item = Result<Triple>>,
    {
        let normalizer = ValueNormalizer::default();
        let predicate = predicate.map(normalize_uri);
        let mut store = Self::new();
        let mut count: u64 = 0;
        for triple in triples {
            let triple = triple?;
            count += 1;
            if count % PROGRESS_INTERVAL == 0 {
                info!("Read {} triples, {} labels", count, store.len());
            }
            if predicate.map_or(false, |p| p != normalize_uri(&triple.predicate)) {
                continue;
            }
            if !triple.value.ends_with("@en") {
                continue;
            }
            let value = normalizer.normalize(&triple.value);
            if let Some(label) = english_text(&value) {
                store.insert(normalize_uri(&triple.subject), label);
            }
        }
        Ok(store)
    }

    pub fn insert(&mut self, subject: &str, label: &str) {
        self.labels.insert(subject.to_string(), label.to_string());
    }

    pub fn get(&self, subject: &str) -> Option<&str> {
        self.labels.get(subject).map(|s| s.as_str())
    }

    /// Byte-keyed access for callers holding raw keys.
    pub fn get_bytes(&self, key: &[u8]) -> Option<&[u8]> {
        let key = std::str::from_utf8(key).ok()?;
        self.get(key).map(str::as_bytes)
    }

    /// Every `(subject, label)` pair, sorted by subject.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        let mut entries: Vec<(&str, &str)> =
            self.labels.iter().map(|(subject, label)| (subject.as_str(), label.as_str())).collect();
        entries.sort_unstable();
        entries.into_iter()
    }

    /// Writes one `subject -> label` line per entry, sorted by subject.
    pub fn dump<W: Write>(&self, out: &mut W) -> Result<usize> {
        let mut count = 0;
        for (subject, label) in self.iter() {
            writeln!(out, "{} -> {}", subject, label).map_err(Error::io("writing labels"))?;
            count += 1;
        }
        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let encoded = bincode::serialize(self)?;
        let mut file =
            File::create(path).map_err(Error::io(format!("creating {}", path.display())))?;
        file.write_all(&encoded).map_err(Error::io(format!("writing {}", path.display())))?;
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut file = File::open(path).map_err(Error::io(format!("opening {}", path.display())))?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer).map_err(Error::io(format!("reading {}", path.display())))?;
        let store: LabelStore = bincode::deserialize(&buffer)
            .map_err(|e| Error::Encoding(format!("label store {}: {}", path.display(), e)))?;
        Ok(store)
    }
}

impl LabelLookup for LabelStore {
    fn english_label(&self, subject: &str) -> Result<Option<String>> {
        Ok(self.get(subject).map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triples() -> Vec<Result<Triple>> {
        vec![
            Ok(Triple::new("<f_m.1>", "<rs_label>", "\"Ada Lovelace\"@en", 1)),
            Ok(Triple::new("<f_m.1>", "<rs_label>", "\"Ada\"@de", 2)),
            Ok(Triple::new("<f_m.2>", "<f_common.topic.alias>", "\"Bob \\\"B\\\"\"@en", 3)),
            Ok(Triple::new("<f_m.3>", "<r_type>", "<f_people.person>", 4)),
        ]
    }

    #[test]
    fn test_build_keeps_english_values() {
        let store = LabelStore::build_from_triples(triples(), None).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("f_m.1"), Some("Ada Lovelace"));
        assert_eq!(store.get("f_m.2"), Some("Bob \"B\""));
        assert_eq!(store.get("f_m.3"), None);
        assert_eq!(store.get_bytes(b"f_m.1"), Some("Ada Lovelace".as_bytes()));
    }

    #[test]
    fn test_build_with_predicate_filter() {
        let store = LabelStore::build_from_triples(triples(), Some("<rs_label>")).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.get("f_m.2").is_none());
    }

    #[test]
    fn test_dump_is_sorted() {
        let mut store = LabelStore::new();
        store.insert("f_m.2", "Bob");
        store.insert("f_m.10", "Carol");
        store.insert("f_m.1", "Ada Lovelace");

        let subjects: Vec<&str> = store.iter().map(|(subject, _)| subject).collect();
        assert_eq!(subjects, vec!["f_m.1", "f_m.10", "f_m.2"]);

        let mut out = Vec::new();
        assert_eq!(store.dump(&mut out).unwrap(), 3);
        assert_eq!(String::from_utf8(out).unwrap(), "f_m.1 -> Ada Lovelace\nf_m.10 -> Carol\nf_m.2 -> Bob\n");
        assert_eq!(LabelStore::new().iter().count(), 0);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.bin");
        let mut store = LabelStore::new();
        store.insert("f_m.1", "Ada Lovelace");
        store.save_to_file(&path).unwrap();

        let loaded = LabelStore::load_from_file(&path).unwrap();
        assert_eq!(loaded.get("f_m.1"), Some("Ada Lovelace"));
        assert_eq!(loaded.english_label("f_m.1").unwrap(), Some("Ada Lovelace".to_string()));
        assert!(LabelStore::load_from_file(&dir.path().join("missing.bin")).is_err());
    }
}
