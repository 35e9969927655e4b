//! A single spreadsheet row keyed by column name

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One row of a table: ordered column name to trimmed string value.
///
/// Column order follows the sheet header. Looking up a column the row does
/// not have yields the empty string, the same as an empty cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    cells: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from column/value pairs, in order
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut record = Self::new();
        for (column, value) in pairs {
            record.insert(column, value);
        }
        record
    }

    /// Set a cell. Column and value are trimmed; a repeated column keeps its
    /// original position and takes the new value.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into().trim().to_string();
        let value = value.into().trim().to_string();

        if let Some(cell) = self.cells.iter_mut().find(|(c, _)| *c == column) {
            cell.1 = value;
        } else {
            self.cells.push((column, value));
        }
    }

    /// Value of a column, or "" when absent
    pub fn get(&self, column: &str) -> &str {
        self.cells
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    pub fn contains_column(&self, column: &str) -> bool {
        self.cells.iter().any(|(c, _)| c == column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(c, _)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(c, v)| (c.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True when every value is empty
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, v)| v.is_empty())
    }

    /// Deterministic serialization of the full field set, in column order
    pub fn content_key(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (column, value) in &self.cells {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = Record;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of column names to string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Record, A::Error> {
                let mut record = Record::new();
                while let Some((column, value)) = access.next_entry::<String, String>()? {
                    record.insert(column, value);
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_is_empty() {
        let record = Record::from_pairs([("NAME", "Juan Dela Cruz")]);
        assert_eq!(record.get("NAME"), "Juan Dela Cruz");
        assert_eq!(record.get("EMAIL"), "");
        assert!(!record.contains_column("EMAIL"));
    }

    #[test]
    fn test_insert_trims_and_overwrites_in_place() {
        let mut record = Record::new();
        record.insert(" NAME ", "  Juana ");
        record.insert("EMAIL", "juana@x.org");
        record.insert("NAME", "Juana Cruz");

        assert_eq!(record.get("NAME"), "Juana Cruz");
        assert_eq!(record.columns().collect::<Vec<_>>(), vec!["NAME", "EMAIL"]);
    }

    #[test]
    fn test_content_key_follows_column_order() {
        let a = Record::from_pairs([("B", "2"), ("A", "1")]);
        let b = Record::from_pairs([("A", "1"), ("B", "2")]);

        assert_eq!(a.content_key(), r#"{"B":"2","A":"1"}"#);
        assert_ne!(a.content_key(), b.content_key());
    }

    #[test]
    fn test_deserialize_keeps_order() {
        let record: Record =
            serde_json::from_str(r#"{"Z": "last?", "A": " first "}"#).unwrap();
        assert_eq!(record.columns().collect::<Vec<_>>(), vec!["Z", "A"]);
        assert_eq!(record.get("A"), "first");
    }

    #[test]
    fn test_blank_record() {
        assert!(Record::from_pairs([("A", " "), ("B", "")]).is_blank());
        assert!(!Record::from_pairs([("A", "x")]).is_blank());
    }
}
