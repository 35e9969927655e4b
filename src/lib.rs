//! sheetkb: search and cached access over a spreadsheet-backed knowledge base
//!
//! Tables are fetched from Google Sheets (or an in-memory fixture), kept in a
//! TTL cache, and searched with a weighted substring ranker. A small JSON API
//! exposes search, directories, statistics and maintenance operations.

pub mod cache;
pub mod config;
pub mod error;
pub mod knowledge;
pub mod metrics;
pub mod network;
pub mod results;
pub mod search;
pub mod sources;
pub mod table;
pub mod web;

pub use cache::TtlCache;
pub use config::Settings;
pub use error::{Error, FetchError};
pub use knowledge::{DirectoryKind, KnowledgeBase};
pub use results::{ResultContainer, SearchResponse, SearchResult};
pub use search::{Search, TableSpec};
pub use sources::TableSource;
pub use table::{Record, Table};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
