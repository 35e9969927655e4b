//! Search table specifications

use crate::config::{Settings, TableConfig};
use serde::{Deserialize, Serialize};

/// A table to search and the columns that participate in matching
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TableSpec {
    /// Table name
    pub name: String,
    /// Searchable columns, in priority order
    pub fields: Vec<String>,
}

impl TableSpec {
    pub fn new<I, S>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Specs for every enabled table, in configuration order
    pub fn from_settings(settings: &Settings) -> Vec<Self> {
        settings.enabled_tables().into_iter().map(Self::from).collect()
    }
}

impl From<&TableConfig> for TableSpec {
    fn from(config: &TableConfig) -> Self {
        Self {
            name: config.name.clone(),
            fields: config.fields.clone(),
        }
    }
}
