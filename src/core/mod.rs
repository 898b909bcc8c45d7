//! Core data structures shared by indexing and querying

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub mod value;
pub use value::*;

/// One line of a triples file, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub value: String,
    /// 1-based line number in the source file.
    pub line: u64,
}

impl Triple {
    pub fn new(subject: &str, predicate: &str, value: &str, line: u64) -> Self {
        Self {
            subject: subject.to_string(),
            predicate: predicate.to_string(),
            value: value.to_string(),
            line,
        }
    }
}

/// All triples of one subject, predicates in lexicographic order and values in
/// input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectRecord {
    pub subject: String,
    pub predicates: BTreeMap<String, Vec<Value>>,
}

impl SubjectRecord {
    pub fn new(subject: impl Into<String>) -> Self {
        Self { subject: subject.into(), predicates: BTreeMap::new() }
    }

    pub fn push(&mut self, predicate: impl Into<String>, value: Value) {
        self.predicates.entry(predicate.into()).or_default().push(value);
    }

    pub fn values(&self, predicate: &str) -> &[Value] {
        self.predicates.get(predicate).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn num_values(&self) -> usize {
        self.predicates.values().map(Vec::len).sum()
    }
}

/// The per-document payload kept in the index: every predicate with its
/// normalized values, in record order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFields {
    pub entries: Vec<(String, Vec<String>)>,
}

/// Zero-copy view of an encoded [`StoredFields`].
#[derive(Deserialize)]
struct BorrowedFields<'a> {
    #[serde(borrow)]
    entries: Vec<(&'a str, Vec<&'a str>)>,
}

impl StoredFields {
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        bincode::deserialize(bytes).map_err(|e| Error::Encoding(format!("stored record: {}", e)))
    }

    /// Decodes only the predicates `keep` accepts. Other values are read as
    /// slices of `bytes` and never copied.
    pub fn decode_projected(bytes: &[u8], keep: impl Fn(&str) -> bool) -> Result<Self> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        let borrowed: BorrowedFields<'_> =
            bincode::deserialize(bytes).map_err(|e| Error::Encoding(format!("stored record: {}", e)))?;
        let entries = borrowed
            .entries
            .into_iter()
            .filter(|(name, _)| keep(name))
            .map(|(name, values)| (name.to_string(), values.into_iter().map(str::to_string).collect()))
            .collect();
        Ok(Self { entries })
    }

    pub fn values(&self, predicate: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(name, _)| name == predicate)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }
}
