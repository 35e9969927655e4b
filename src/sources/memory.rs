//! In-memory table source

use super::traits::*;
use crate::error::FetchError;
use crate::table::Table;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

/// Serves tables held in memory. Individual tables can be made to fail,
/// and every fetch is counted.
#[derive(Debug, Default)]
pub struct MemorySource {
    tables: RwLock<HashMap<String, Table>>,
    failures: RwLock<HashMap<String, FetchError>>,
    fetches: RwLock<HashMap<String, usize>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source holding the given tables
    pub fn with_tables(tables: impl IntoIterator<Item = Table>) -> Self {
        let source = Self::new();
        for table in tables {
            source.insert_table(table);
        }
        source
    }

    /// Load tables from a JSON or YAML file holding a list of tables.
    /// Tables without a header get one derived from their records.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let tables: Vec<Table> = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            _ => serde_yaml::from_str(&content)?,
        };

        Ok(Self::with_tables(tables.into_iter().map(|t| {
            if t.headers.is_empty() {
                Table::from_records(t.name, t.records)
            } else {
                t
            }
        })))
    }

    /// Add or replace a table
    pub fn insert_table(&self, table: Table) {
        self.tables
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(table.name.clone(), table);
    }

    /// Make every fetch of `table` fail with `error`
    pub fn fail_table(&self, table: &str, error: FetchError) {
        self.failures
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(table.to_string(), error);
    }

    /// Stop failing fetches of `table`
    pub fn clear_failure(&self, table: &str) {
        self.failures
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(table);
    }

    /// Number of fetches attempted for `table`
    pub fn fetch_count(&self, table: &str) -> usize {
        self.fetches
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(table)
            .copied()
            .unwrap_or(0)
    }

    /// Number of fetches attempted across all tables
    pub fn total_fetches(&self) -> usize {
        self.fetches
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .sum()
    }
}

#[async_trait]
impl TableSource for MemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch_table(&self, table: &str) -> Result<Table, FetchError> {
        *self
            .fetches
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(table.to_string())
            .or_insert(0) += 1;

        if let Some(error) = self
            .failures
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(table)
        {
            return Err(error.clone());
        }

        self.tables
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(table)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(table.to_string()))
    }

    async fn check_connection(&self) -> Result<ConnectionReport, FetchError> {
        let mut sheets: Vec<String> = self
            .tables
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        sheets.sort();

        Ok(ConnectionReport {
            title: Some("In-memory tables".to_string()),
            sheets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Record;

    #[tokio::test]
    async fn test_fetch_and_count() {
        let source = MemorySource::with_tables([Table::from_records(
            "Directory",
            vec![Record::from_pairs([("NAME", "Juan")])],
        )]);

        let table = source.fetch_table("Directory").await.unwrap();
        assert_eq!(table.len(), 1);
        assert!(matches!(
            source.fetch_table("Nope").await,
            Err(FetchError::NotFound(_))
        ));
        assert_eq!(source.fetch_count("Directory"), 1);
        assert_eq!(source.total_fetches(), 2);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let source = MemorySource::with_tables([Table::empty("Directory")]);
        source.fail_table(
            "Directory",
            FetchError::Timeout {
                table: "Directory".to_string(),
            },
        );
        assert!(source.fetch_table("Directory").await.is_err());

        source.clear_failure("Directory");
        assert!(source.fetch_table("Directory").await.is_ok());
    }

    #[tokio::test]
    async fn test_from_yaml_file() {
        let path = std::env::temp_dir().join(format!("sheetkb-fixture-{}.yml", std::process::id()));
        std::fs::write(
            &path,
            "- name: Directory\n  records:\n    - { NAME: Juan Dela Cruz, EMAIL: juan@x.org }\n",
        )
        .unwrap();

        let source = MemorySource::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let table = source.fetch_table("Directory").await.unwrap();
        assert_eq!(table.headers, vec!["NAME", "EMAIL"]);
        assert_eq!(table.records[0].get("EMAIL"), "juan@x.org");

        let report = source.check_connection().await.unwrap();
        assert_eq!(report.sheets, vec!["Directory"]);
    }
}
