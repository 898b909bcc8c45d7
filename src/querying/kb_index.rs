use std::path::{Path, PathBuf};

use tantivy::{Index, IndexReader, ReloadPolicy, Searcher, Term};
use tracing::info;

use crate::error::{Error, Result};
use crate::indexing::language::register_schema_tokenizers;
use crate::indexing::IndexSchema;

/// A read-only handle on a finished index.
///
/// The reader never reloads on its own, so every searcher taken from it sees
/// the same snapshot. Share it behind an `Arc`.
pub struct KbIndex {
    index: Index,
    reader: IndexReader,
    schema: IndexSchema,
    location: PathBuf,
}

impl KbIndex {
    pub fn open(location: &Path) -> Result<Self> {
        if !location.is_dir() {
            return Err(Error::Config(format!(
                "Index directory {} does not exist",
                location.display()
            )));
        }
        let index = Index::open_in_dir(location)
            .map_err(Error::storage(format!("opening index {}", location.display())))?;
        register_schema_tokenizers(&index)?;
        let schema = IndexSchema::from_schema(index.schema())?;
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(Error::storage("opening the index reader"))?;

        let kb_index = Self { index, reader, schema, location: location.to_path_buf() };
        info!("Opened index {} with {} documents", location.display(), kb_index.num_docs());
        Ok(kb_index)
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn schema(&self) -> &IndexSchema {
        &self.schema
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn searcher(&self) -> Searcher {
        self.reader.searcher()
    }

    pub fn num_docs(&self) -> u64 {
        self.searcher().num_docs()
    }

    /// Number of documents containing `term` in `field`. Terms are matched as
    /// indexed, so text terms must be lower-cased.
    pub fn doc_freq(&self, field: &str, term: &str) -> Result<u64> {
        let field = self.schema.require_field(field)?;
        self.searcher()
            .doc_freq(&Term::from_field_text(field, term))
            .map_err(Error::storage(format!("counting documents for {}", term)))
    }
}
