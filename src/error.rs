//! Error types and result definitions

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for kbsearch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for kbsearch
#[derive(Error, Debug)]
pub enum Error {
    /// A triple line that cannot be split into subject, predicate and value
    #[error("Unsupported triple format at line {line}: {message}")]
    Format { line: u64, message: String },

    /// IO error with a short description of what was being done
    #[error("IO error while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Indexing refuses to write into an existing directory
    #[error("Index directory already exists: {}", .0.display())]
    IndexExists(PathBuf),

    /// Failure reported by the storage engine
    #[error("Storage error while {context}: {source}")]
    Storage {
        context: String,
        #[source]
        source: tantivy::TantivyError,
    },

    /// A search string the query parser rejected
    #[error("Query parse error for `{query}`: {source}")]
    QueryParse {
        query: String,
        #[source]
        source: tantivy::query::QueryParserError,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Stored record or label file could not be encoded or decoded
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Other error
    #[error("Error: {0}")]
    Other(String),
}

impl Error {
    /// Builds a `map_err` adapter that wraps an IO error with context.
    pub fn io(context: impl Into<String>) -> impl FnOnce(std::io::Error) -> Error {
        let context = context.into();
        move |source| Error::Io { context, source }
    }

    /// Builds a `map_err` adapter that wraps a storage engine error with context.
    pub fn storage(context: impl Into<String>) -> impl FnOnce(tantivy::TantivyError) -> Error {
        let context = context.into();
        move |source| Error::Storage { context, source }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io { context: "performing IO".to_string(), source }
    }
}

impl From<tantivy::TantivyError> for Error {
    fn from(source: tantivy::TantivyError) -> Self {
        Error::Storage { context: "accessing the index".to_string(), source }
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error::Encoding(err.to_string())
    }
}
