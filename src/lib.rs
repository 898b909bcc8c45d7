//! # kbsearch
//!
//! kbsearch turns a sorted dump of knowledge-base triples (BaseKB, Freebase)
//! into a full-text index with one document per subject, and answers three
//! kinds of questions over it: what is stored for a subject, which subjects
//! match a text query, and where a chain of predicates leads from a subject.
//!
//! ## Features
//!
//! - Streaming aggregation of triples into per-subject documents
//! - Language-aware text fields with per-language analyzers
//! - Basic and multi-field ranking weighted by subject importance
//! - Predicate-chain traversal with loop suppression
//!
//! ## Example
//!
//! ```rust,no_run
//! use kbsearch::api::SearchApi;
//! use kbsearch::querying::{PrintMode, RankerKind};
//!
//! fn example() -> kbsearch::Result<()> {
//!     let api = SearchApi::open_dir(std::path::Path::new("basekb.tsv.index"))?;
//!     let outcome = api.search("barack obama", RankerKind::Multi, Some(10), None)?;
//!     for hit in &outcome.documents {
//!         print!("{}", api.print(&hit.doc, Some(hit.score), &PrintMode::Subject)?);
//!     }
//!     Ok(())
//! }
//! ```

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unnecessary_map_or)]
#![allow(clippy::new_without_default)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

/// Triples, subject records and value normalization
pub mod core;

/// Configuration structures and utilities
pub mod config;

pub mod error;

/// Reading triple dumps and list files
pub mod parsing;

/// Building an index from aggregated subjects
pub mod indexing;

/// Lookup, ranking and chain traversal
pub mod querying;

pub mod render;

pub mod labels;

/// Search facade shared by the command line and the HTTP server
pub mod api;

/// HTTP JSON endpoints
pub mod http;

pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result};
