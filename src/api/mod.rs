pub mod search_api;

pub use search_api::{ScoredDocument, SearchApi, SearchHit, SearchOutcome, SearchResponse};
