//! Search orchestration module
//!
//! Fetches every configured table through the cache, scores records
//! against the query, and ranks the aggregated results.

mod executor;
mod matcher;
mod models;

pub use executor::Search;
pub use matcher::{normalize_query, Matcher, RecordMatch};
pub use models::*;
