//! Single-writer indexing session.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tantivy::{Index, IndexWriter, TantivyDocument};
use tracing::{debug, info};

use super::aggregator::SubjectAggregator;
use super::document_builder::{BuildOptions, DocumentBuilder};
use super::language::{register_schema_tokenizers, LanguageRegistry};
use super::predicates::IndexedPredicates;
use super::schema::IndexSchema;
use crate::core::{SubjectRecord, Triple, ValueNormalizer};
use crate::error::{Error, Result};

/// Memory budget of the index writer.
pub const DEFAULT_WRITER_MEMORY: usize = 128 * 1024 * 1024;

const PROGRESS_INTERVAL: u64 = 1_000_000;

/// Counters reported at the end of an indexing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub lines_read: u64,
    pub triples: u64,
    pub documents: u64,
    pub blank_lines: u64,
    /// Reading stopped at the line limit.
    pub truncated: bool,
}

/// Owns the index writer from `begin` to `end`.
///
/// The writer holds the directory lock, so a second session on the same
/// directory fails instead of interleaving writes.
pub struct Indexer {
    index: Index,
    writer: IndexWriter,
    schema: IndexSchema,
    predicates: IndexedPredicates,
    languages: LanguageRegistry,
    options: BuildOptions,
    location: PathBuf,
    documents: u64,
    started: Instant,
}

impl Indexer {
    /// Creates a new index at `location`. Refuses to touch an existing path.
    pub fn begin(
        location: &Path,
        predicates: IndexedPredicates,
        languages: LanguageRegistry,
        options: BuildOptions,
        writer_memory: usize,
    ) -> Result<Self> {
        if location.exists() {
            return Err(Error::IndexExists(location.to_path_buf()));
        }
        std::fs::create_dir_all(location)
            .map_err(Error::io(format!("creating {}", location.display())))?;

        let schema = IndexSchema::build(&predicates, &languages, &options);
        let index = Index::create_in_dir(location, schema.schema().clone())
            .map_err(Error::storage("creating the index"))?;
        register_schema_tokenizers(&index)?;
        let writer = index
            .writer_with_num_threads(1, writer_memory)
            .map_err(Error::storage("opening the index writer"))?;

        info!("Creating index at {}", location.display());
        info!("Indexed predicates: {}", predicates.len());
        if options.index_predicates {
            info!("Indexing individual predicates");
        }
        if options.index_text {
            info!("Indexing combined predicate text values");
        }
        if options.index_language && !languages.is_empty() {
            let languages: Vec<&str> = languages.supported_languages().collect();
            info!("Indexing predicates for language(s): {}", languages.join(", "));
        }

        Ok(Self {
            index,
            writer,
            schema,
            predicates,
            languages,
            options,
            location: location.to_path_buf(),
            documents: 0,
            started: Instant::now(),
        })
    }

    pub fn schema(&self) -> &IndexSchema {
        &self.schema
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn documents(&self) -> u64 {
        self.documents
    }

    /// Hands a finished document to the writer.
    pub fn commit(&mut self, document: TantivyDocument) -> Result<()> {
        self.writer.add_document(document).map_err(Error::storage("adding a document"))?;
        self.documents += 1;
        Ok(())
    }

    /// Builds and commits the document of one subject.
    pub fn index_record(&mut self, record: &SubjectRecord) -> Result<()> {
        let document =
            DocumentBuilder::new(&self.schema, &self.predicates, &self.languages, &self.options)
                .build(record)?;
        debug!("Indexing {} ({} values)", record.subject, record.num_values());
        self.commit(document)
    }

    /// Aggregates a subject-sorted triple stream and indexes one document per
    /// subject run. Returns the number of triples read.
    pub fn index_triples<I>(&mut self, triples: I, normalizer: ValueNormalizer) -> Result<u64>
    where
        I: IntoIterator<Item = Result<Triple>>,
    {
        let mut aggregator = SubjectAggregator::new(normalizer);
        let mut count: u64 = 0;
        for triple in triples {
            let triple = triple?;
            count += 1;
            if let Some(record) = aggregator.accept(&triple) {
                self.index_record(&record)?;
            }
            if count % PROGRESS_INTERVAL == 0 {
                info!(
                    "Indexed {} triples into {} documents in {:.1}s",
                    count,
                    self.documents,
                    self.started.elapsed().as_secs_f64()
                );
            }
        }
        if let Some(record) = aggregator.flush() {
            self.index_record(&record)?;
        }
        Ok(count)
    }

    /// Commits everything, optionally merging down to a single segment, and
    /// releases the writer. Returns the number of documents written.
    pub fn end(mut self, optimize: bool) -> Result<u64> {
        self.writer.commit().map_err(Error::storage("committing documents"))?;
        if optimize {
            let segments = self
                .index
                .searchable_segment_ids()
                .map_err(Error::storage("listing segments"))?;
            if segments.len() > 1 {
                info!("Merging {} segments", segments.len());
                self.writer.merge(&segments).wait().map_err(Error::storage("merging segments"))?;
            }
        }
        self.writer.wait_merging_threads().map_err(Error::storage("closing the index writer"))?;
        info!(
            "Indexed {} documents into {} in {:.1}s",
            self.documents,
            self.location.display(),
            self.started.elapsed().as_secs_f64()
        );
        Ok(self.documents)
    }
}
