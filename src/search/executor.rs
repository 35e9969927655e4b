//! Search execution and orchestration

use super::matcher::{normalize_query, Matcher};
use super::models::TableSpec;
use crate::cache::{table_cache_key, TtlCache};
use crate::config::SearchSettings;
use crate::error::FetchError;
use crate::metrics::Metrics;
use crate::results::{ResultContainer, SearchResponse, SearchResult, TableStatus};
use crate::sources::TableSource;
use crate::table::Table;
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Search executor that scans every configured table for a query
pub struct Search {
    /// Where tables come from
    source: Arc<dyn TableSource>,
    /// Table snapshot cache
    cache: Arc<TtlCache<Arc<Table>>>,
    /// Tables to search, in scan order
    specs: Vec<TableSpec>,
    /// Ranking settings
    settings: SearchSettings,
    /// Upper bound on a single table fetch
    fetch_timeout: Duration,
    /// Fetch metrics
    metrics: Arc<Metrics>,
}

impl Search {
    /// Create a new search executor
    pub fn new(
        source: Arc<dyn TableSource>,
        cache: Arc<TtlCache<Arc<Table>>>,
        specs: Vec<TableSpec>,
    ) -> Self {
        Self {
            source,
            cache,
            specs,
            settings: SearchSettings::default(),
            fetch_timeout: Duration::from_secs(10),
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Set ranking settings
    pub fn with_settings(mut self, settings: SearchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Set the per-table fetch timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Share a metrics collector
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn specs(&self) -> &[TableSpec] {
        &self.specs
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    pub fn cache(&self) -> &Arc<TtlCache<Arc<Table>>> {
        &self.cache
    }

    /// Fetch a table through the cache, bounded by the fetch timeout.
    /// Only cache misses reach the source and the fetch metrics.
    pub async fn fetch_table(&self, name: &str) -> Result<Arc<Table>, FetchError> {
        self.cache
            .get_or_fetch(&table_cache_key(name), || async {
                let start = Instant::now();
                let fetched = timeout(self.fetch_timeout, self.source.fetch_table(name)).await;
                let result = match fetched {
                    Ok(Ok(table)) => Ok(Arc::new(table)),
                    Ok(Err(e)) => Err(e),
                    Err(_) => Err(FetchError::Timeout {
                        table: name.to_string(),
                    }),
                };

                self.metrics
                    .record_response_time(name, start.elapsed().as_millis() as u64);
                match result {
                    Ok(_) => self.metrics.record_success(name),
                    Err(_) => self.metrics.record_error(name),
                }
                result
            })
            .await
    }

    /// Search every configured table
    pub async fn search_all(&self, query: &str) -> SearchResponse {
        self.search_tables(query, &self.specs).await
    }

    /// Search the given tables.
    ///
    /// Never fails: a table that cannot be fetched is skipped and reported
    /// in the response's table statuses.
    pub async fn search_tables(&self, query: &str, specs: &[TableSpec]) -> SearchResponse {
        let needle = normalize_query(query);
        if needle.is_empty() {
            return SearchResponse::empty();
        }

        self.metrics.inc_search();

        // Fetch all tables concurrently; results come back in configuration order
        let fetched = join_all(specs.iter().map(|spec| async move {
            let start = Instant::now();
            let result = self.fetch_table(&spec.name).await;
            (spec, result, start.elapsed())
        }))
        .await;

        let matcher = Matcher::new(&needle, &self.settings);
        let mut container = ResultContainer::new();

        for (spec, result, elapsed) in fetched {
            let time_ms = elapsed.as_millis() as u64;

            let table = match result {
                Ok(table) => table,
                Err(e) => {
                    warn!("Error searching {}: {}", spec.name, e);
                    container.add_table_status(TableStatus::failed(&spec.name, &e, time_ms));
                    continue;
                }
            };

            let missing: Vec<String> = if table.headers.is_empty() {
                vec![]
            } else {
                table
                    .missing_columns(&spec.fields)
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            };
            if !missing.is_empty() {
                warn!("Table {} has no column(s) {:?}", spec.name, missing);
            }

            let mut matches = 0;
            for record in &table.records {
                if let Some(m) = matcher.score(record, &spec.fields) {
                    matches += 1;
                    container.add_result(SearchResult::new(
                        spec.name.as_str(),
                        record.clone(),
                        m.score,
                        m.field,
                    ));
                }
            }

            debug!(
                "Table {} matched {} of {} records in {}ms",
                spec.name,
                matches,
                table.len(),
                time_ms
            );
            container.add_table_status(
                TableStatus::scanned(&spec.name, table.len(), matches, time_ms)
                    .with_missing_fields(missing),
            );
        }

        let response = container.into_response(
            needle,
            self.settings.max_results,
            self.settings.max_suggestions,
        );

        info!(
            "Search '{}' matched {} records across {} tables ({} failed)",
            response.query,
            response.total_matches,
            specs.len(),
            response.failed_tables().len()
        );

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::error::FailureKind;
    use crate::sources::{ConnectionReport, MemorySource};
    use crate::table::Record;
    use async_trait::async_trait;

    const TTL: Duration = Duration::from_millis(300_000);

    fn directory() -> Table {
        Table::from_records(
            "Directory",
            vec![
                Record::from_pairs([("NAME", "Juan Dela Cruz"), ("EMAIL", "juan@x.org")]),
                Record::from_pairs([("NAME", "Juana Cruz"), ("EMAIL", "juana@x.org")]),
            ],
        )
    }

    fn directory_spec() -> TableSpec {
        TableSpec::new("Directory", ["NAME", "EMAIL"])
    }

    fn search_over(
        source: Arc<MemorySource>,
        specs: Vec<TableSpec>,
    ) -> (Search, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_000));
        let cache = Arc::new(TtlCache::with_clock(TTL, 100, clock.clone()));
        (Search::new(source, cache, specs), clock)
    }

    fn names(response: &SearchResponse, column: &str) -> Vec<String> {
        response
            .results
            .iter()
            .map(|r| r.record.get(column).to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_empty_query_fetches_nothing() {
        let source = Arc::new(MemorySource::with_tables([directory()]));
        let (search, _) = search_over(source.clone(), vec![directory_spec()]);

        for query in ["", "   ", "\t\n"] {
            let response = search.search_all(query).await;
            assert!(response.results.is_empty());
            assert!(response.suggestions.is_empty());
        }
        assert_eq!(source.total_fetches(), 0);
        assert_eq!(search.metrics().get_total_searches(), 0);
    }

    #[tokio::test]
    async fn test_substring_matches_keep_scan_order() {
        let source = Arc::new(MemorySource::with_tables([directory()]));
        let (search, _) = search_over(source, vec![directory_spec()]);

        let response = search.search_all("cruz").await;

        assert_eq!(names(&response, "NAME"), vec!["Juan Dela Cruz", "Juana Cruz"]);
        assert!(response.results.iter().all(|r| r.score == 1));
        assert!(response.results.iter().all(|r| r.matched_field == "NAME"));
        assert!(response.results.iter().all(|r| r.source_table == "Directory"));
        assert_eq!(response.suggestions, vec!["Juan Dela Cruz", "Juana Cruz"]);
    }

    #[tokio::test]
    async fn test_exact_match_outranks_substring() {
        let source = Arc::new(MemorySource::with_tables([directory()]));
        let (search, _) = search_over(source, vec![directory_spec()]);

        let response = search.search_all("  JUAN@x.org ").await;

        assert_eq!(response.query, "juan@x.org");
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].score, 10);
        assert_eq!(response.results[0].matched_field, "EMAIL");
        assert_eq!(response.suggestions, vec!["juan@x.org"]);

        // "juan" is in both names and both emails
        let response = search.search_all("juan").await;
        assert_eq!(response.results.len(), 2);
        assert!(response.results.iter().all(|r| r.score == 2));
        assert!(response.results.iter().all(|r| r.matched_field == "EMAIL"));
    }

    #[tokio::test]
    async fn test_failing_table_is_skipped() {
        let source = Arc::new(MemorySource::with_tables([
            directory(),
            Table::from_records(
                "Reference_Files",
                vec![Record::from_pairs([("DOCUMENT_TITLE", "Cruz Report")])],
            ),
        ]));
        source.fail_table(
            "Directory",
            FetchError::Network {
                table: "Directory".to_string(),
                message: "connection reset".to_string(),
            },
        );
        let specs = vec![
            TableSpec::new("Unknown_Sheet", ["X"]),
            directory_spec(),
            TableSpec::new("Reference_Files", ["DOCUMENT_TITLE"]),
        ];
        let (search, _) = search_over(source, specs);

        let response = search.search_all("cruz").await;

        assert_eq!(names(&response, "DOCUMENT_TITLE"), vec!["Cruz Report"]);
        assert_eq!(response.failed_tables(), vec!["Unknown_Sheet", "Directory"]);
        assert_eq!(response.tables.len(), 3);
        assert!(response.tables[2].ok);
        assert_eq!(search.metrics().get_reliability("Directory"), 0.0);
    }

    #[tokio::test]
    async fn test_dedup_is_scoped_by_table() {
        let row = Record::from_pairs([("NAME", "Juan Dela Cruz")]);
        let source = Arc::new(MemorySource::with_tables([
            Table::from_records("Directory", vec![row.clone(), row.clone()]),
            Table::from_records("Archive", vec![row.clone()]),
        ]));
        let specs = vec![
            TableSpec::new("Directory", ["NAME"]),
            TableSpec::new("Archive", ["NAME"]),
            TableSpec::new("Directory", ["NAME"]),
        ];
        let (search, _) = search_over(source, specs);

        let response = search.search_all("juan").await;

        let tables: Vec<_> = response
            .results
            .iter()
            .map(|r| r.source_table.as_str())
            .collect();
        assert_eq!(tables, vec!["Directory", "Archive"]);
        assert_eq!(response.suggestions, vec!["Juan Dela Cruz"]);
    }

    #[tokio::test]
    async fn test_late_high_score_survives_truncation() {
        let early: Vec<Record> = (0..80)
            .map(|i| Record::from_pairs([("TITLE", format!("budget memo {}", i))]))
            .collect();
        let source = Arc::new(MemorySource::with_tables([
            Table::from_records("Activities", early),
            Table::from_records(
                "Reference_Files",
                vec![Record::from_pairs([("TITLE", "Budget")])],
            ),
        ]));
        let specs = vec![
            TableSpec::new("Activities", ["TITLE"]),
            TableSpec::new("Reference_Files", ["TITLE"]),
        ];
        let (search, _) = search_over(source, specs);

        let response = search.search_all("budget").await;

        assert_eq!(response.results.len(), 50);
        assert_eq!(response.total_matches, 81);
        assert_eq!(response.results[0].source_table, "Reference_Files");
        assert_eq!(response.results[0].score, 10);
        assert_eq!(response.results[1].record.get("TITLE"), "budget memo 0");
        assert_eq!(response.results[49].record.get("TITLE"), "budget memo 48");
        assert!(response
            .results
            .windows(2)
            .all(|w| w[0].score >= w[1].score));
        assert_eq!(response.suggestions.len(), 5);
        assert_eq!(response.suggestions[0], "Budget");
    }

    #[tokio::test]
    async fn test_repeated_search_is_idempotent_and_cached() {
        let source = Arc::new(MemorySource::with_tables([directory()]));
        let (search, clock) = search_over(source.clone(), vec![directory_spec()]);

        let first = search.search_all("x.org").await;
        let second = search.search_all("x.org").await;

        assert_eq!(first.results, second.results);
        assert_eq!(first.suggestions, second.suggestions);
        assert_eq!(source.fetch_count("Directory"), 1);

        clock.advance(TTL);
        search.search_all("x.org").await;
        assert_eq!(source.fetch_count("Directory"), 2);
    }

    #[tokio::test]
    async fn test_missing_columns_reported() {
        let source = Arc::new(MemorySource::with_tables([directory()]));
        let specs = vec![TableSpec::new("Directory", ["NAME", "PHONE"])];
        let (search, _) = search_over(source, specs);

        let response = search.search_all("cruz").await;
        assert_eq!(response.tables[0].missing_fields, vec!["PHONE"]);
        assert_eq!(response.results.len(), 2);
    }

    struct StalledSource;

    #[async_trait]
    impl TableSource for StalledSource {
        fn name(&self) -> &str {
            "stalled"
        }

        async fn fetch_table(&self, table: &str) -> Result<Table, FetchError> {
            if table == "Landing_Centers" {
                std::future::pending::<()>().await;
            }
            Ok(directory())
        }

        async fn check_connection(&self) -> Result<ConnectionReport, FetchError> {
            Ok(ConnectionReport::default())
        }
    }

    #[tokio::test]
    async fn test_stalled_table_times_out_and_is_skipped() {
        let clock = Arc::new(ManualClock::new(1_000));
        let cache = Arc::new(TtlCache::with_clock(TTL, 100, clock));
        let specs = vec![
            TableSpec::new("Landing_Centers", ["NAME"]),
            directory_spec(),
        ];
        let search = Search::new(Arc::new(StalledSource), cache, specs)
            .with_timeout(Duration::from_millis(50));

        let response = search.search_all("cruz").await;

        assert_eq!(names(&response, "NAME"), vec!["Juan Dela Cruz", "Juana Cruz"]);
        assert_eq!(response.failed_tables(), vec!["Landing_Centers"]);
        assert_eq!(response.tables[0].error, Some(FailureKind::Timeout));
        assert!(response.tables[1].ok);
        assert_eq!(search.metrics().get_reliability("Landing_Centers"), 0.0);
    }

    #[tokio::test]
    async fn test_cache_hits_are_not_counted_as_fetches() {
        let source = Arc::new(MemorySource::with_tables([directory()]));
        let (search, clock) = search_over(source, vec![directory_spec()]);

        search.search_all("cruz").await;
        search.search_all("juan").await;
        search.fetch_table("Directory").await.unwrap();

        let stats = search.metrics().get_table_stats();
        assert_eq!(stats["Directory"].fetches, 1);
        assert_eq!(search.metrics().get_total_searches(), 2);

        clock.advance(TTL);
        search.search_all("cruz").await;
        assert_eq!(search.metrics().get_table_stats()["Directory"].fetches, 2);
    }

    #[tokio::test]
    async fn test_no_tables_no_results() {
        let source = Arc::new(MemorySource::new());
        let (search, _) = search_over(source, vec![]);

        let response = search.search_all("anything").await;
        assert!(response.is_empty());
        assert!(response.tables.is_empty());
    }
}
