//! Tabular data model
//!
//! A [`Table`] is an immutable snapshot of one sheet: its header row and the
//! non-blank rows below it, each turned into a [`Record`].

mod record;

pub use record::Record;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Snapshot of a named sheet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Sheet name
    pub name: String,
    /// Trimmed header row, in sheet order
    #[serde(default)]
    pub headers: Vec<String>,
    /// Rows, in sheet order
    #[serde(default)]
    pub records: Vec<Record>,
}

impl Table {
    pub fn new(name: impl Into<String>, headers: Vec<String>, records: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            headers,
            records,
        }
    }

    /// Create an empty table
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, vec![], vec![])
    }

    /// Build a table from records, deriving the header from first-seen columns
    pub fn from_records(name: impl Into<String>, records: Vec<Record>) -> Self {
        let mut headers: Vec<String> = Vec::new();
        for record in &records {
            for column in record.columns() {
                if !headers.iter().any(|h| h == column) {
                    headers.push(column.to_string());
                }
            }
        }
        Self::new(name, headers, records)
    }

    /// Convert a raw value grid (header row first) into a table.
    ///
    /// Missing cells become empty strings and rows with no non-empty value
    /// are dropped.
    pub fn from_values(name: impl Into<String>, values: Vec<Vec<String>>) -> Self {
        let name = name.into();
        let mut rows = values.into_iter();

        let headers: Vec<String> = match rows.next() {
            Some(header) => header.iter().map(|h| h.trim().to_string()).collect(),
            None => {
                warn!("No data values found in {}; sheet may be empty", name);
                return Self::empty(name);
            }
        };

        let records: Vec<Record> = rows
            .map(|row| {
                let mut record = Record::new();
                for (i, header) in headers.iter().enumerate() {
                    record.insert(header.as_str(), row.get(i).map(String::as_str).unwrap_or(""));
                }
                record
            })
            .filter(|record| !record.is_blank())
            .collect();

        Self::new(name, headers, records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    /// Columns from `fields` that this table's header does not contain
    pub fn missing_columns<'a>(&self, fields: &'a [String]) -> Vec<&'a str> {
        fields
            .iter()
            .filter(|f| !self.has_column(f))
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_from_values() {
        let table = Table::from_values(
            "Internal_Directory",
            grid(&[
                &[" GIVEN_NAME ", "LAST_NAME", "EMAIL"],
                &["Juan", "Dela Cruz", "juan@x.org"],
                &["", "  ", ""],
                &["Maria", "Santos"],
            ]),
        );

        assert_eq!(table.headers, vec!["GIVEN_NAME", "LAST_NAME", "EMAIL"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].get("GIVEN_NAME"), "Juan");
        assert_eq!(table.records[1].get("EMAIL"), "");
        assert!(table.records[1].contains_column("EMAIL"));
    }

    #[test]
    fn test_from_empty_values() {
        let table = Table::from_values("Landing_Centers", vec![]);
        assert!(table.is_empty());
        assert!(table.headers.is_empty());
    }

    #[test]
    fn test_header_only() {
        let table = Table::from_values("Reference_Files", grid(&[&["DOCUMENT_TITLE"]]));
        assert!(table.is_empty());
        assert!(table.has_column("DOCUMENT_TITLE"));
    }

    #[test]
    fn test_missing_columns() {
        let table = Table::from_records(
            "Directory",
            vec![Record::from_pairs([("NAME", "a"), ("EMAIL", "b")])],
        );
        let fields = vec!["NAME".to_string(), "PHONE".to_string()];
        assert_eq!(table.missing_columns(&fields), vec!["PHONE"]);
    }
}
