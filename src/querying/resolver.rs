//! Primary-key lookup of subjects and access to their stored values.

use std::collections::HashSet;
use std::sync::Arc;

use tantivy::collector::TopDocs;
use tantivy::query::TermQuery;
use tantivy::schema::{IndexRecordOption, Value as _};
use tantivy::{DocAddress, TantivyDocument, Term};

use super::kb_index::KbIndex;
use crate::core::{normalize_uri, StoredFields};
use crate::error::{Error, Result};

/// Opaque handle of a document in the opened index.
pub type DocId = DocAddress;

/// Predicates to materialise when reading a document.
pub type FieldSet = HashSet<String>;

/// A stored document: its subject, importance and predicate values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectDocument {
    pub subject: String,
    pub importance: i64,
    fields: StoredFields,
}

impl SubjectDocument {
    pub fn new(subject: impl Into<String>, importance: i64, fields: Vec<(String, Vec<String>)>) -> Self {
        Self { subject: subject.into(), importance, fields: StoredFields { entries: fields } }
    }

    /// Values of `predicate` in input order, empty when absent.
    pub fn values(&self, predicate: &str) -> &[String] {
        self.fields.values(predicate)
    }

    pub fn first(&self, predicate: &str) -> Option<&str> {
        self.values(predicate).first().map(String::as_str)
    }

    /// Predicates and values in stored order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields.entries.iter().map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn predicates(&self) -> impl Iterator<Item = &str> {
        self.fields.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.entries.is_empty()
    }
}

/// Read access to predicate values of a node, keyed by subject.
///
/// The chain walker only needs this, which keeps it independent of the index.
pub trait ValueSource {
    fn values(&self, subject: &str, predicate: &str) -> Result<Vec<String>>;
}

/// Looks subjects up through the `subject` key field.
#[derive(Clone)]
pub struct SubjectResolver {
    index: Arc<KbIndex>,
}

impl SubjectResolver {
    pub fn new(index: Arc<KbIndex>) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &Arc<KbIndex> {
        &self.index
    }

    /// Document of `subject`, bracketed or not. The first match wins if the
    /// index holds more than one.
    pub fn doc_id_for(&self, subject: &str) -> Result<Option<DocId>> {
        let subject = normalize_uri(subject);
        let term = Term::from_field_text(self.index.schema().subject(), subject);
        let query = TermQuery::new(term, IndexRecordOption::Basic);
        let hits = self
            .index
            .searcher()
            .search(&query, &TopDocs::with_limit(1))
            .map_err(Error::storage(format!("looking up {}", subject)))?;
        Ok(hits.first().map(|(_, address)| *address))
    }

    /// Reads a document, keeping only the predicates in `projection` if one is given.
    pub fn document(&self, doc_id: DocId, projection: Option<&FieldSet>) -> Result<SubjectDocument> {
        let schema = self.index.schema();
        let doc: TantivyDocument = self
            .index
            .searcher()
            .doc(doc_id)
            .map_err(Error::storage("reading a stored document"))?;

        let subject = doc
            .get_first(schema.subject())
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let importance = doc.get_first(schema.importance()).and_then(|v| v.as_i64()).unwrap_or(0);
        let bytes = doc.get_first(schema.record()).and_then(|v| v.as_bytes()).unwrap_or_default();
        let fields = match projection {
            Some(projection) => StoredFields::decode_projected(bytes, |name| projection.contains(name))?,
            None => StoredFields::decode(bytes)?,
        };
        Ok(SubjectDocument { subject, importance, fields })
    }

    /// Looks up and reads the document of `subject`.
    pub fn lookup(&self, subject: &str, projection: Option<&FieldSet>) -> Result<Option<SubjectDocument>> {
        match self.doc_id_for(subject)? {
            Some(doc_id) => self.document(doc_id, projection).map(Some),
            None => Ok(None),
        }
    }
}

impl ValueSource for SubjectResolver {
    /// Values of `predicate` of the subject's document, empty when either is missing.
    fn values(&self, subject: &str, predicate: &str) -> Result<Vec<String>> {
        let projection: FieldSet = std::iter::once(predicate.to_string()).collect();
        Ok(self
            .lookup(subject, Some(&projection))?
            .map(|doc| doc.values(predicate).to_vec())
            .unwrap_or_default())
    }
}
