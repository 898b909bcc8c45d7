//! Indexing pipeline: aggregation, document building and the writer session.

pub mod aggregator;
pub mod cjk;
pub mod document_builder;
pub mod indexer;
pub mod language;
pub mod predicates;
pub mod schema;

pub use aggregator::SubjectAggregator;
pub use document_builder::{BuildOptions, DocumentBuilder, DEFAULT_IMPORTANCE_PREDICATE};
pub use indexer::{IndexStats, Indexer, DEFAULT_WRITER_MEMORY};
pub use language::{language_root, normalize_language, AnalyzerKind, LanguageRegistry};
pub use predicates::IndexedPredicates;
pub use schema::IndexSchema;

use tracing::info;

use crate::config::IndexConfig;
use crate::core::ValueNormalizer;
use crate::error::Result;
use crate::parsing::TripleReader;

/// Indexes the triples file of `config` into a new index directory.
pub fn index_file(config: &IndexConfig) -> Result<IndexStats> {
    let triples_file = config.triples_file()?;
    let location = config.index_directory()?;
    let predicates: IndexedPredicates =
        config.indexed_predicates()?.iter().map(String::as_str).collect();

    if config.max_lines().is_some() {
        info!("Running in test mode with 20M lines, use --full-data to index all the data");
    }
    info!("Indexing {}", triples_file.display());

    let mut reader = TripleReader::open(triples_file)?.with_max_lines(config.max_lines());
    let mut indexer = Indexer::begin(
        &location,
        predicates,
        config.languages.clone(),
        config.build.clone(),
        config.writer_memory,
    )?;
    let triples = indexer.index_triples(reader.by_ref(), ValueNormalizer::new(config.normalize_newlines))?;
    let documents = indexer.end(config.optimize)?;

    Ok(IndexStats {
        lines_read: reader.lines_read(),
        triples,
        documents,
        blank_lines: reader.blank_lines(),
        truncated: reader.hit_line_limit(),
    })
}
