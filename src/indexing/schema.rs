//! The per-subject document schema.
//!
//! Every document has a `subject` key, a stored `record` holding all
//! predicate values in order, and an `importance` column. Indexed predicates
//! add searchable fields:
//!
//! - `p`: text values (and URIs as single tokens), default analyzer
//! - `p@lang`: text values in a registered language, that language's analyzer
//! - `p#int`: integer values
//! - `text`, `text@lang`: all text values of indexed predicates combined

use std::collections::BTreeSet;

use tantivy::schema::{
    Field, IndexRecordOption, NumericOptions, Schema, TextFieldIndexing, TextOptions, FAST, INDEXED,
    STORED, STRING,
};
use tracing::warn;

use super::document_builder::BuildOptions;
use super::language::{AnalyzerKind, LanguageRegistry};
use super::predicates::IndexedPredicates;
use crate::error::{Error, Result};

pub const FIELD_SUBJECT: &str = "subject";
pub const FIELD_RECORD: &str = "record";
pub const FIELD_IMPORTANCE: &str = "importance";
pub const FIELD_TEXT: &str = "text";

/// Suffix of the numeric field of an indexed predicate.
pub const NUMERIC_SUFFIX: &str = "#int";

const RESERVED: &[&str] = &[FIELD_SUBJECT, FIELD_RECORD, FIELD_IMPORTANCE, FIELD_TEXT];

/// Names that cannot be used as predicate fields.
pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}

pub fn numeric_field_name(predicate: &str) -> String {
    format!("{}{}", predicate, NUMERIC_SUFFIX)
}

fn text_options(analyzer: AnalyzerKind) -> TextOptions {
    TextOptions::default().set_indexing_options(
        TextFieldIndexing::default()
            .set_tokenizer(&analyzer.tokenizer_name())
            .set_index_option(IndexRecordOption::WithFreqsAndPositions),
    )
}

/// Schema plus handles to the fields every document has.
#[derive(Debug, Clone)]
pub struct IndexSchema {
    schema: Schema,
    subject: Field,
    record: Field,
    importance: Field,
}

impl IndexSchema {
    pub fn build(
        predicates: &IndexedPredicates,
        languages: &LanguageRegistry,
        options: &BuildOptions,
    ) -> Self {
        let mut builder = Schema::builder();
        let subject = builder.add_text_field(FIELD_SUBJECT, STRING | STORED);
        let record = builder.add_bytes_field(FIELD_RECORD, STORED);
        let importance = builder.add_i64_field(FIELD_IMPORTANCE, INDEXED | STORED | FAST);

        let default_analyzer = languages.default_analyzer();
        let language_fields = options.index_language && !languages.is_empty();
        let mut names: BTreeSet<String> = RESERVED.iter().map(|name| name.to_string()).collect();

        for predicate in predicates.iter() {
            if is_reserved(predicate) || predicate == options.importance_predicate {
                warn!("Predicate {} is reserved and will only be stored", predicate);
                continue;
            }
            if names.insert(predicate.to_string()) {
                builder.add_text_field(predicate, text_options(default_analyzer));
            }
            let numeric = numeric_field_name(predicate);
            if names.insert(numeric.clone()) {
                builder.add_i64_field(&numeric, NumericOptions::default().set_indexed().set_fast());
            }
            if language_fields && options.index_predicates {
                for language in languages.supported_languages() {
                    let name = languages.qualify(predicate, language);
                    let analyzer = languages.analyzer_for(language).unwrap_or(default_analyzer);
                    if names.insert(name.clone()) {
                        builder.add_text_field(&name, text_options(analyzer));
                    }
                }
            }
        }

        if options.index_text {
            builder.add_text_field(FIELD_TEXT, text_options(default_analyzer));
            if language_fields {
                for language in languages.supported_languages() {
                    let name = languages.qualify(FIELD_TEXT, language);
                    let analyzer = languages.analyzer_for(language).unwrap_or(default_analyzer);
                    if names.insert(name.clone()) {
                        builder.add_text_field(&name, text_options(analyzer));
                    }
                }
            }
        }

        Self { schema: builder.build(), subject, record, importance }
    }

    /// Wraps the schema of an existing index.
    pub fn from_schema(schema: Schema) -> Result<Self> {
        let lookup = |name: &str| {
            schema
                .get_field(name)
                .map_err(|_| Error::Config(format!("Not a kbsearch index, missing field `{}`", name)))
        };
        let subject = lookup(FIELD_SUBJECT)?;
        let record = lookup(FIELD_RECORD)?;
        let importance = lookup(FIELD_IMPORTANCE)?;
        Ok(Self { schema, subject, record, importance })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn subject(&self) -> Field {
        self.subject
    }

    pub fn record(&self) -> Field {
        self.record
    }

    pub fn importance(&self) -> Field {
        self.importance
    }

    pub fn field(&self, name: &str) -> Option<Field> {
        self.schema.get_field(name).ok()
    }

    pub fn require_field(&self, name: &str) -> Result<Field> {
        self.field(name).ok_or_else(|| Error::Config(format!("Field `{}` is not indexed", name)))
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.schema.fields().map(|(_, entry)| entry.name())
    }
}
