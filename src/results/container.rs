//! Result container for deduplicating and ranking search results

use super::types::*;
use crate::table::Record;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Collects results in scan order, dropping exact duplicates
#[derive(Debug, Clone, Default)]
pub struct ResultContainer {
    /// Results in the order they were first seen
    results: Vec<SearchResult>,
    /// Content keys already emitted
    seen: HashSet<String>,
    /// Per-table outcomes
    tables: Vec<TableStatus>,
}

impl ResultContainer {
    /// Create a new empty result container
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a result unless an identical record from the same table was
    /// already added. Returns whether it was kept.
    pub fn add_result(&mut self, result: SearchResult) -> bool {
        let key = Self::content_key(&result.source_table, &result.record);
        if !self.seen.insert(key) {
            return false;
        }
        self.results.push(result);
        true
    }

    /// Record a table outcome
    pub fn add_table_status(&mut self, status: TableStatus) {
        self.tables.push(status);
    }

    /// Number of distinct results collected
    pub fn result_count(&self) -> usize {
        self.results.len()
    }

    pub fn table_statuses(&self) -> &[TableStatus] {
        &self.tables
    }

    /// All results by descending score. Equal scores keep scan order.
    pub fn get_ordered_results(&self) -> Vec<SearchResult> {
        let mut results = self.results.clone();
        results.sort_by(|a, b| b.score.cmp(&a.score));
        results
    }

    /// Distinct non-empty matched values of the first `limit` results
    pub fn suggestions(ordered: &[SearchResult], limit: usize) -> Vec<String> {
        let mut suggestions: Vec<String> = Vec::new();
        for result in ordered.iter().take(limit) {
            let value = result.matched_value();
            if !value.is_empty() && !suggestions.iter().any(|s| s == value) {
                suggestions.push(value.to_string());
            }
        }
        suggestions
    }

    /// Rank, derive suggestions, then truncate to `max_results`
    pub fn into_response(
        self,
        query: impl Into<String>,
        max_results: usize,
        max_suggestions: usize,
    ) -> SearchResponse {
        let mut ordered = self.get_ordered_results();
        let total_matches = ordered.len();
        let suggestions = Self::suggestions(&ordered, max_suggestions);
        ordered.truncate(max_results);

        SearchResponse {
            query: query.into(),
            results: ordered,
            suggestions,
            total_matches,
            tables: self.tables,
        }
    }

    /// Dedup key: owning table plus the full record content
    fn content_key(table: &str, record: &Record) -> String {
        let mut hasher = Sha256::new();
        hasher.update(table.as_bytes());
        hasher.update(b"\x1f");
        hasher.update(record.content_key().as_bytes());
        format!("{:x}", hasher.finalize())
    }
}
