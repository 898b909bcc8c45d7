//! HTTP API Server for kbsearch
//!
//! Read-only JSON endpoints over an opened index: subject lookup, ranked
//! search and predicate-chain rows.

use crate::{
    api::{SearchApi, SearchResponse},
    error::Error,
    querying::{parse_chain, RankerKind},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Stored predicates of one subject
#[derive(Debug, Serialize)]
pub struct LookupResponse {
    pub subject: String,
    pub importance: i64,
    pub predicates: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub ranker: Option<String>,
    pub max: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ChainParams {
    pub p: String,
    pub suppress: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ChainResponse {
    pub subject: String,
    pub chain: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub message: String,
    pub documents: u64,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Shared application state
pub struct AppState {
    pub api: Arc<SearchApi>,
}

/// Custom error type for API errors
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::QueryParse { .. } | Error::Config(_) => ApiError::BadRequest(err.to_string()),
            other => {
                error!("Request failed: {}", other);
                ApiError::InternalError(other.to_string())
            }
        }
    }
}

/// Runs index work off the async runtime.
async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> crate::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::InternalError(format!("Worker failed: {}", e)))?
        .map_err(ApiError::from)
}

/// Create the HTTP server with all routes
pub fn create_server(api: Arc<SearchApi>) -> Router {
    let state = Arc::new(AppState { api });

    // Configure CORS
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/lookup/:subject", get(lookup))
        .route("/search", get(search))
        .route("/chain/:subject", get(chain))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        message: "kbsearch HTTP API is running".to_string(),
        documents: state.api.index().num_docs(),
    })
}

/// GET /lookup/:subject - Stored predicates of a subject
async fn lookup(
    State(state): State<Arc<AppState>>,
    Path(subject): Path<String>,
) -> Result<Json<LookupResponse>, ApiError> {
    let api = Arc::clone(&state.api);
    let key = subject.clone();
    let doc = blocking(move || api.resolver().lookup(&key, None))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Subject '{}' not found", subject)))?;

    let predicates =
        doc.fields().map(|(name, values)| (name.to_string(), values.to_vec())).collect();
    Ok(Json(LookupResponse { subject: doc.subject, importance: doc.importance, predicates }))
}

/// GET /search?q=&ranker=&max= - Ranked search
async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    if params.q.trim().is_empty() {
        return Err(ApiError::BadRequest("Query parameter 'q' is empty".to_string()));
    }
    let kind = match params.ranker.as_deref() {
        Some(name) => name.parse::<RankerKind>()?,
        None => RankerKind::Multi,
    };
    let api = Arc::clone(&state.api);
    let limit = match params.max {
        Some(max) => usize::try_from(max).ok(),
        None => api.config().hit_limit(),
    };
    let response = blocking(move || api.search_hits(&params.q, kind, limit)).await?;
    Ok(Json(response))
}

/// GET /chain/:subject?p=p1>p2 - Rows of a predicate chain
async fn chain(
    State(state): State<Arc<AppState>>,
    Path(subject): Path<String>,
    Query(params): Query<ChainParams>,
) -> Result<Json<ChainResponse>, ApiError> {
    let chain = parse_chain(&params.p);
    if chain.is_empty() {
        return Err(ApiError::BadRequest("Query parameter 'p' names no predicate".to_string()));
    }
    let api = Arc::clone(&state.api);
    let (key, hops) = (subject.clone(), chain.clone());
    let rows = blocking(move || api.chain_rows(&key, &[hops], params.suppress)).await?;
    Ok(Json(ChainResponse { subject, chain, rows }))
}

/// Routes served by [`create_server`], as logged on startup.
pub const ENDPOINTS: &[(&str, &str)] = &[
    ("/lookup/:subject", "Stored predicates of a subject"),
    ("/search?q=&ranker=&max=", "Ranked search"),
    ("/chain/:subject?p=p1>p2", "Predicate-chain rows"),
    ("/health", "Health check"),
];

/// Start the HTTP server on the specified address
pub async fn start_server(addr: &str, api: Arc<SearchApi>) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_server(api);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("kbsearch HTTP API server listening on http://{}", addr);
    for (endpoint, description) in ENDPOINTS {
        info!("  GET {:<28} {}", endpoint, description);
    }

    axum::serve(listener, app).await?;

    Ok(())
}
