//! Table source trait and types

use crate::error::FetchError;
use crate::table::Table;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result of probing the backing spreadsheet
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionReport {
    /// Spreadsheet title, if the source reports one
    pub title: Option<String>,
    /// Names of the sheets available
    pub sheets: Vec<String>,
}

/// Anything that can hand out a table by name
#[async_trait]
pub trait TableSource: Send + Sync {
    /// Short name of the source for logging
    fn name(&self) -> &str;

    /// Fetch the current snapshot of a table
    async fn fetch_table(&self, table: &str) -> Result<Table, FetchError>;

    /// Probe the source and list the sheets it can serve
    async fn check_connection(&self) -> Result<ConnectionReport, FetchError>;
}
