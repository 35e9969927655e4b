//! Result type definitions

use crate::error::{FailureKind, FetchError};
use crate::table::Record;
use serde::{Deserialize, Serialize};

/// A matching record together with where and how it matched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Table the record came from
    pub source_table: String,
    /// Accumulated match weight
    pub score: u32,
    /// Last field, in field-spec order, that contained the query
    pub matched_field: String,
    /// The full record
    pub record: Record,
}

impl SearchResult {
    pub fn new(
        source_table: impl Into<String>,
        record: Record,
        score: u32,
        matched_field: impl Into<String>,
    ) -> Self {
        Self {
            source_table: source_table.into(),
            score,
            matched_field: matched_field.into(),
            record,
        }
    }

    /// Original (not lower-cased) value of the matched field
    pub fn matched_value(&self) -> &str {
        self.record.get(&self.matched_field)
    }
}

/// Outcome of one table within a search run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStatus {
    /// Table name
    pub table: String,
    /// Whether the table could be fetched
    pub ok: bool,
    /// Records examined
    pub records_scanned: usize,
    /// Records that matched, before deduplication
    pub matches: usize,
    /// Configured search fields the table header lacks
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_fields: Vec<String>,
    /// Failure classification when the fetch failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<FailureKind>,
    /// Failure message when the fetch failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Time spent obtaining the table, in milliseconds
    pub time_ms: u64,
}

impl TableStatus {
    /// Status of a table that was fetched and scanned
    pub fn scanned(table: impl Into<String>, records_scanned: usize, matches: usize, time_ms: u64) -> Self {
        Self {
            table: table.into(),
            ok: true,
            records_scanned,
            matches,
            missing_fields: vec![],
            error: None,
            message: None,
            time_ms,
        }
    }

    /// Status of a table that was skipped because its fetch failed
    pub fn failed(table: impl Into<String>, error: &FetchError, time_ms: u64) -> Self {
        Self {
            table: table.into(),
            ok: false,
            records_scanned: 0,
            matches: 0,
            missing_fields: vec![],
            error: Some(error.kind()),
            message: Some(error.to_string()),
            time_ms,
        }
    }

    pub fn with_missing_fields(mut self, fields: Vec<String>) -> Self {
        self.missing_fields = fields;
        self
    }
}

/// Everything a search run returns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Normalized query
    pub query: String,
    /// Ranked, truncated results
    pub results: Vec<SearchResult>,
    /// Distinct matched values from the top results
    pub suggestions: Vec<String>,
    /// Number of distinct matches before truncation
    pub total_matches: usize,
    /// Per-table outcome, in scan order
    #[serde(default)]
    pub tables: Vec<TableStatus>,
}

impl SearchResponse {
    /// The defined result of a blank query
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Tables that could not be searched
    pub fn failed_tables(&self) -> Vec<&str> {
        self.tables
            .iter()
            .filter(|t| !t.ok)
            .map(|t| t.table.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matched_value() {
        let result = SearchResult::new(
            "Directory",
            Record::from_pairs([("NAME", "Juan Dela Cruz"), ("EMAIL", "juan@x.org")]),
            1,
            "NAME",
        );
        assert_eq!(result.matched_value(), "Juan Dela Cruz");
    }

    #[test]
    fn test_failed_status() {
        let err = FetchError::NotFound("Archive".to_string());
        let status = TableStatus::failed("Archive", &err, 12);
        assert!(!status.ok);
        assert_eq!(status.error, Some(FailureKind::NotFound));

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["error"], "not_found");
        assert!(json.get("missing_fields").is_none());
    }

    #[test]
    fn test_failed_tables() {
        let response = SearchResponse {
            tables: vec![
                TableStatus::scanned("A", 3, 1, 0),
                TableStatus::failed("B", &FetchError::NotFound("B".into()), 0),
            ],
            ..Default::default()
        };
        assert_eq!(response.failed_tables(), vec!["B"]);
    }
}
