//! HTTP API module for kbsearch
//!
//! Provides JSON endpoints for:
//! - Subject lookup
//! - Ranked search
//! - Predicate-chain traversal

pub mod server;

pub use server::{
    create_server, start_server, ApiError, AppState, ChainParams, ChainResponse, ErrorResponse,
    HealthResponse, LookupResponse, SearchParams,
};
