//! Google Sheets API v4 table source

use super::traits::*;
use crate::config::SourceSettings;
use crate::error::FetchError;
use crate::network::{HttpClient, HttpResponse};
use crate::table::Table;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error};

/// Reads tables from the values endpoint of a (publicly shared) spreadsheet
pub struct SheetsSource {
    client: HttpClient,
    base_url: String,
    spreadsheet_id: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    range: Option<String>,
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    properties: Option<SheetProperties>,
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    #[serde(default)]
    properties: Option<SheetProperties>,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

impl SheetsSource {
    pub fn new(client: HttpClient, settings: &SourceSettings) -> Self {
        Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            spreadsheet_id: settings.spreadsheet_id.clone(),
            api_key: settings.api_key.clone(),
        }
    }

    fn spreadsheet_url(&self) -> String {
        format!("{}/v4/spreadsheets/{}", self.base_url, self.spreadsheet_id)
    }

    fn values_url(&self, table: &str) -> String {
        format!(
            "{}/values/{}",
            self.spreadsheet_url(),
            urlencoding::encode(table)
        )
    }

    async fn get(&self, table: &str, url: &str) -> Result<HttpResponse, FetchError> {
        let response = self
            .client
            .get(url, &[("key", self.api_key.as_str())])
            .await
            .map_err(|e| transport_error(table, e))?;

        if response.is_success() {
            Ok(response)
        } else {
            Err(status_error(table, &response))
        }
    }
}

/// Stringify a cell the way the sheet displays it
fn cell_to_string(cell: &serde_json::Value) -> String {
    match cell {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Prefix of the 400 message the values endpoint returns for an unknown sheet
const UNKNOWN_RANGE_PREFIX: &str = "Unable to parse range";

/// The request URL carries the API key, so it is stripped from the message
fn transport_error(table: &str, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            table: table.to_string(),
        }
    } else {
        FetchError::Network {
            table: table.to_string(),
            message: err.without_url().to_string(),
        }
    }
}

fn status_error(table: &str, response: &HttpResponse) -> FetchError {
    let message = response
        .json::<ApiErrorBody>()
        .map(|body| body.error.message)
        .unwrap_or_else(|_| response.text.clone());

    error!(
        "API error for {}: status {}, {}",
        table, response.status, message
    );

    let table = table.to_string();
    match response.status {
        403 => FetchError::AccessDenied { table },
        404 => FetchError::NotFound(table),
        400 if message.starts_with(UNKNOWN_RANGE_PREFIX) => FetchError::NotFound(table),
        400 => FetchError::BadRequest { table, message },
        status => FetchError::Http {
            table,
            status,
            message,
        },
    }
}

#[async_trait]
impl TableSource for SheetsSource {
    fn name(&self) -> &str {
        "google_sheets"
    }

    async fn fetch_table(&self, table: &str) -> Result<Table, FetchError> {
        let url = self.values_url(table);
        debug!("Fetching sheet \"{}\" from {}", table, url);

        let response = self.get(table, &url).await?;
        let body: ValueRange = response.json().map_err(|e| FetchError::Parse {
            table: table.to_string(),
            message: e.to_string(),
        })?;

        let row_count = body.values.len();
        let values: Vec<Vec<String>> = body
            .values
            .iter()
            .map(|row| row.iter().map(cell_to_string).collect::<Vec<String>>())
            .collect();
        let table = Table::from_values(table, values);

        debug!(
            "Converted {} rows for {} (from {} total rows, range {:?})",
            table.len(),
            table.name,
            row_count.saturating_sub(1),
            body.range
        );

        Ok(table)
    }

    async fn check_connection(&self) -> Result<ConnectionReport, FetchError> {
        let response = self.get(&self.spreadsheet_id, &self.spreadsheet_url()).await?;
        let meta: SpreadsheetMeta = response.json().map_err(|e| FetchError::Parse {
            table: self.spreadsheet_id.clone(),
            message: e.to_string(),
        })?;

        Ok(ConnectionReport {
            title: meta.properties.and_then(|p| p.title),
            sheets: meta
                .sheets
                .into_iter()
                .filter_map(|s| s.properties.and_then(|p| p.title))
                .collect(),
        })
    }
}
