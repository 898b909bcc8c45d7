//! Turns a [`SubjectRecord`] into an index document.

use tantivy::tokenizer::{PreTokenizedString, Token};
use tantivy::TantivyDocument;
use tracing::warn;

use super::language::LanguageRegistry;
use super::predicates::IndexedPredicates;
use super::schema::{is_reserved, numeric_field_name, IndexSchema, FIELD_TEXT};
use crate::core::{StoredFields, SubjectRecord, Value};
use crate::error::Result;

/// Predicate whose integer value becomes the document importance.
pub const DEFAULT_IMPORTANCE_PREDICATE: &str = "pr_bin";

/// Which searchable fields documents get.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Index text values under their own predicate name.
    pub index_predicates: bool,
    /// Index text values under the combined `text` field.
    pub index_text: bool,
    /// Route tagged text into `@lang` fields.
    pub index_language: bool,
    pub importance_predicate: String,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            index_predicates: true,
            index_text: true,
            index_language: true,
            importance_predicate: DEFAULT_IMPORTANCE_PREDICATE.to_string(),
        }
    }
}

/// A URI indexed as one lower-cased token.
fn atomic_token(uri: &str) -> PreTokenizedString {
    let text = uri.to_lowercase();
    let token = Token { offset_from: 0, offset_to: uri.len(), position: 0, text: text.clone(), position_length: 1 };
    PreTokenizedString { text, tokens: vec![token] }
}

pub struct DocumentBuilder<'a> {
    schema: &'a IndexSchema,
    predicates: &'a IndexedPredicates,
    languages: &'a LanguageRegistry,
    options: &'a BuildOptions,
}

impl<'a> DocumentBuilder<'a> {
    pub fn new(
        schema: &'a IndexSchema,
        predicates: &'a IndexedPredicates,
        languages: &'a LanguageRegistry,
        options: &'a BuildOptions,
    ) -> Self {
        Self { schema, predicates, languages, options }
    }

    pub fn build(&self, record: &SubjectRecord) -> Result<TantivyDocument> {
        let mut doc = TantivyDocument::default();
        doc.add_text(self.schema.subject(), &record.subject);

        let mut stored = StoredFields::default();
        let mut importance: i64 = 0;

        for (predicate, values) in &record.predicates {
            if *predicate == self.options.importance_predicate {
                for value in values {
                    match value.as_i64() {
                        Some(score) => importance = score,
                        None => warn!(
                            "Ignoring non-integer {} value {} of {}",
                            predicate, value, record.subject
                        ),
                    }
                }
                continue;
            }

            if self.predicates.contains(predicate) && !is_reserved(predicate) {
                for value in values {
                    self.index_value(&mut doc, predicate, value)?;
                }
            }
            stored
                .entries
                .push((predicate.clone(), values.iter().map(|v| v.as_str().to_string()).collect()));
        }

        doc.add_i64(self.schema.importance(), importance);
        doc.add_bytes(self.schema.record(), stored.encode()?);
        Ok(doc)
    }

    fn index_value(&self, doc: &mut TantivyDocument, predicate: &str, value: &Value) -> Result<()> {
        match value {
            Value::Uri(uri) => {
                doc.add_pre_tokenized_text(self.schema.require_field(predicate)?, atomic_token(uri));
            }
            Value::Integer { value, .. } => {
                doc.add_i64(self.schema.require_field(&numeric_field_name(predicate))?, *value);
            }
            _ => {
                let text = value.as_str();
                let language = value
                    .language()
                    .filter(|_| self.options.index_language)
                    .filter(|lang| self.languages.is_routable(lang));
                let (predicate_field, text_field) = match language {
                    Some(lang) => {
                        (self.languages.qualify(predicate, lang), self.languages.qualify(FIELD_TEXT, lang))
                    }
                    None => (predicate.to_string(), FIELD_TEXT.to_string()),
                };
                if self.options.index_predicates {
                    doc.add_text(self.schema.require_field(&predicate_field)?, text);
                }
                if self.options.index_text {
                    doc.add_text(self.schema.require_field(&text_field)?, text);
                }
            }
        }
        Ok(())
    }
}
