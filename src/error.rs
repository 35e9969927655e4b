//! Error types for table fetching and the knowledge-base facade

use serde::{Deserialize, Serialize};

/// Failure to retrieve a single table from its source
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The API rejected the credentials or the spreadsheet is not shared
    #[error(
        "access denied to \"{table}\": check that the API key is valid, the Sheets API is enabled and the spreadsheet is shared"
    )]
    AccessDenied { table: String },

    /// No sheet with that name exists (names are case-sensitive)
    #[error("sheet \"{0}\" not found")]
    NotFound(String),

    /// The request itself was invalid (bad spreadsheet id or range)
    #[error("invalid request for \"{table}\": {message}")]
    BadRequest { table: String, message: String },

    /// Any other non-success HTTP status
    #[error("HTTP {status} fetching \"{table}\": {message}")]
    Http {
        table: String,
        status: u16,
        message: String,
    },

    /// Transport level failure
    #[error("network error fetching \"{table}\": {message}")]
    Network { table: String, message: String },

    /// The fetch did not complete within the configured timeout
    #[error("timed out fetching \"{table}\"")]
    Timeout { table: String },

    /// The response body could not be understood
    #[error("malformed response for \"{table}\": {message}")]
    Parse { table: String, message: String },
}

impl FetchError {
    /// Name of the table the failure belongs to
    pub fn table(&self) -> &str {
        match self {
            Self::AccessDenied { table }
            | Self::BadRequest { table, .. }
            | Self::Http { table, .. }
            | Self::Network { table, .. }
            | Self::Timeout { table }
            | Self::Parse { table, .. } => table,
            Self::NotFound(table) => table,
        }
    }

    /// Coarse classification of the failure
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::AccessDenied { .. } => FailureKind::AccessDenied,
            Self::NotFound(_) => FailureKind::NotFound,
            Self::BadRequest { .. } => FailureKind::BadRequest,
            Self::Http { status, .. } => FailureKind::HttpError(*status),
            Self::Network { .. } => FailureKind::NetworkError,
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::Parse { .. } => FailureKind::ParseError,
        }
    }
}

/// Serializable failure classification reported per table
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    AccessDenied,
    NotFound,
    BadRequest,
    HttpError(u16),
    NetworkError,
    Timeout,
    ParseError,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AccessDenied => write!(f, "Access denied"),
            Self::NotFound => write!(f, "Sheet not found"),
            Self::BadRequest => write!(f, "Invalid request"),
            Self::HttpError(code) => write!(f, "HTTP error: {}", code),
            Self::NetworkError => write!(f, "Network error"),
            Self::Timeout => write!(f, "Request timed out"),
            Self::ParseError => write!(f, "Failed to parse response"),
        }
    }
}

/// Errors surfaced by the knowledge-base facade
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Directory lookups only accept internal, external and npmo
    #[error("invalid directory type: {0}")]
    InvalidDirectoryKind(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
