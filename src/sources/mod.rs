//! Table sources
//!
//! Defines the [`TableSource`] trait the search core fetches tables through,
//! with a Google Sheets implementation and an in-memory one.

mod memory;
mod sheets;
mod traits;

pub use memory::MemorySource;
pub use sheets::SheetsSource;
pub use traits::*;

use crate::config::SourceSettings;
use crate::network::HttpClient;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// Build the source described by the settings: a fixture file when one is
/// configured, the Sheets API otherwise.
pub fn from_settings(settings: &SourceSettings) -> Result<Arc<dyn TableSource>> {
    if let Some(ref fixture) = settings.fixture {
        info!("Serving tables from fixture: {}", fixture.display());
        return Ok(Arc::new(MemorySource::from_file(fixture)?));
    }

    let client = HttpClient::with_settings(settings)?;
    Ok(Arc::new(SheetsSource::new(client, settings)))
}
