//! Metrics collection module
//!
//! Tracks search volume and per-table fetch performance and error rates.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// Shared metrics collector
#[derive(Debug)]
pub struct Metrics {
    /// Total search count
    pub total_searches: AtomicU64,
    /// Table fetch response times (last 100, in ms)
    table_response_times: RwLock<HashMap<String, Vec<u64>>>,
    /// Table fetch error counts
    table_errors: RwLock<HashMap<String, u64>>,
    /// Table fetch success counts
    table_successes: RwLock<HashMap<String, u64>>,
}

impl Metrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self {
            total_searches: AtomicU64::new(0),
            table_response_times: RwLock::new(HashMap::new()),
            table_errors: RwLock::new(HashMap::new()),
            table_successes: RwLock::new(HashMap::new()),
        }
    }

    /// Increment total search count
    pub fn inc_search(&self) {
        self.total_searches.fetch_add(1, Ordering::Relaxed);
    }

    /// Record table fetch response time
    pub fn record_response_time(&self, table: &str, time_ms: u64) {
        let mut times = self
            .table_response_times
            .write()
            .unwrap_or_else(|e| e.into_inner());
        let entry = times.entry(table.to_string()).or_default();

        // Keep last 100 response times
        if entry.len() >= 100 {
            entry.remove(0);
        }
        entry.push(time_ms);
    }

    /// Record table fetch error
    pub fn record_error(&self, table: &str) {
        let mut errors = self.table_errors.write().unwrap_or_else(|e| e.into_inner());
        *errors.entry(table.to_string()).or_insert(0) += 1;
    }

    /// Record table fetch success
    pub fn record_success(&self, table: &str) {
        let mut successes = self
            .table_successes
            .write()
            .unwrap_or_else(|e| e.into_inner());
        *successes.entry(table.to_string()).or_insert(0) += 1;
    }

    /// Get total searches
    pub fn get_total_searches(&self) -> u64 {
        self.total_searches.load(Ordering::Relaxed)
    }

    /// Get average fetch time for a table
    pub fn get_avg_response_time(&self, table: &str) -> Option<u64> {
        let times = self
            .table_response_times
            .read()
            .unwrap_or_else(|e| e.into_inner());
        times.get(table).and_then(|t| {
            if t.is_empty() {
                None
            } else {
                Some(t.iter().sum::<u64>() / t.len() as u64)
            }
        })
    }

    /// Get reliability percentage for a table
    pub fn get_reliability(&self, table: &str) -> f64 {
        let errors = self.table_errors.read().unwrap_or_else(|e| e.into_inner());
        let successes = self.table_successes.read().unwrap_or_else(|e| e.into_inner());

        let error_count = *errors.get(table).unwrap_or(&0);
        let success_count = *successes.get(table).unwrap_or(&0);

        let total = error_count + success_count;
        if total == 0 {
            100.0
        } else {
            (success_count as f64 / total as f64) * 100.0
        }
    }

    /// Get statistics for every table that has been fetched
    pub fn get_table_stats(&self) -> HashMap<String, TableStats> {
        let mut names: Vec<String> = Vec::new();
        {
            let errors = self.table_errors.read().unwrap_or_else(|e| e.into_inner());
            let successes = self.table_successes.read().unwrap_or_else(|e| e.into_inner());
            names.extend(errors.keys().cloned());
            names.extend(successes.keys().cloned());
        }

        let mut stats = HashMap::new();
        for table in names {
            if stats.contains_key(&table) {
                continue;
            }
            let value = TableStats {
                fetches: self.count(&self.table_successes, &table)
                    + self.count(&self.table_errors, &table),
                errors: self.count(&self.table_errors, &table),
                avg_response_time: self.get_avg_response_time(&table),
                reliability: self.get_reliability(&table),
            };
            stats.insert(table, value);
        }

        stats
    }

    fn count(&self, map: &RwLock<HashMap<String, u64>>, table: &str) -> u64 {
        *map.read()
            .unwrap_or_else(|e| e.into_inner())
            .get(table)
            .unwrap_or(&0)
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics for a single table
#[derive(Debug, Clone, Serialize)]
pub struct TableStats {
    pub fetches: u64,
    pub errors: u64,
    pub avg_response_time: Option<u64>,
    pub reliability: f64,
}
