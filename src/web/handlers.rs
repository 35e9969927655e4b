//! HTTP request handlers

use super::state::AppState;
use crate::error::{Error, FetchError};
use crate::knowledge::{ConnectionCheck, DirectoryKind, QuickStats};
use crate::metrics::TableStats;
use crate::results::SearchResponse;
use crate::table::Table;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Query parameters for search
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Search query
    pub q: Option<String>,
}

/// Metrics response
#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub total_searches: u64,
    pub tables: HashMap<String, TableStats>,
}

/// Error body returned by every failing endpoint
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<crate::error::FailureKind>,
}

/// Handler error mapped onto an HTTP status
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl From<FetchError> for ApiError {
    fn from(e: FetchError) -> Self {
        Self(Error::Fetch(e))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::Fetch(FetchError::NotFound(_)) => StatusCode::NOT_FOUND,
            Error::Fetch(_) => StatusCode::BAD_GATEWAY,
            Error::InvalidDirectoryKind(_) => StatusCode::BAD_REQUEST,
            Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = match &self.0 {
            Error::Fetch(e) => Some(e.kind()),
            _ => None,
        };
        tracing::error!("Request failed ({}): {}", status, self.0);

        let body = ErrorBody {
            error: self.0.to_string(),
            kind,
        };
        (status, Json(body)).into_response()
    }
}

/// Search handler
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    let query = params.q.unwrap_or_default();
    Json(state.kb.search(&query).await)
}

/// Quick statistics handler
pub async fn stats(State(state): State<AppState>) -> Result<Json<QuickStats>, ApiError> {
    Ok(Json(state.kb.quick_stats().await?))
}

/// Single table handler
pub async fn table(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Table>, ApiError> {
    let table = state.kb.table(&name).await?;
    Ok(Json(Table::clone(&table)))
}

/// Staff directory handler
pub async fn directory(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<Table>, ApiError> {
    let kind: DirectoryKind = kind.parse()?;
    let table = state.kb.directory(kind).await?;
    Ok(Json(Table::clone(&table)))
}

/// Connection check handler
pub async fn connection(State(state): State<AppState>) -> Result<Json<ConnectionCheck>, ApiError> {
    Ok(Json(state.kb.check_connection().await?))
}

/// Cache clearing handler
pub async fn clear_cache(State(state): State<AppState>) -> impl IntoResponse {
    state.kb.clear_cache();
    Json(serde_json::json!({ "status": "ok" }))
}

/// Metrics handler
pub async fn metrics(State(state): State<AppState>) -> Json<MetricsResponse> {
    let metrics = state.kb.metrics();
    Json(MetricsResponse {
        total_searches: metrics.get_total_searches(),
        tables: metrics.get_table_stats(),
    })
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "instance": state.instance_name(),
        "version": crate::VERSION
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::knowledge::KnowledgeBase;
    use crate::sources::MemorySource;
    use crate::table::Record;
    use std::sync::Arc;

    fn state() -> AppState {
        let settings = Settings::default();
        let source = Arc::new(MemorySource::with_tables([
            Table::from_records(
                "Internal_Directory",
                vec![Record::from_pairs([
                    ("GIVEN_NAME", "Juan"),
                    ("LAST_NAME", "Dela Cruz"),
                    ("EMAIL", "juan@x.org"),
                ])],
            ),
            Table::from_records("Activities_Conducted", vec![]),
            Table::from_records("Reference_Files", vec![]),
        ]));
        let kb = KnowledgeBase::new(&settings, source);
        AppState::new(settings, kb)
    }

    #[tokio::test]
    async fn test_search_handler() {
        let state = state();
        let Json(response) = search(
            State(state.clone()),
            Query(SearchParams {
                q: Some("Dela Cruz".to_string()),
            }),
        )
        .await;

        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].matched_field, "LAST_NAME");
        assert_eq!(response.results[0].score, 10);

        let Json(empty) = search(State(state), Query(SearchParams { q: None })).await;
        assert!(empty.results.is_empty());
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let Json(stats) = stats(State(state())).await.unwrap();
        assert_eq!(stats.internal_count, 1);
        assert_eq!(stats.files_count, 0);
    }

    #[tokio::test]
    async fn test_directory_handler_errors() {
        let state = state();

        let err = directory(State(state.clone()), Path("contractors".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = directory(State(state.clone()), Path("npmo".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let Json(table) = directory(State(state), Path("internal".to_string()))
            .await
            .unwrap();
        assert_eq!(table.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_maps_to_bad_gateway() {
        let err = ApiError::from(FetchError::Timeout {
            table: "Landing_Centers".to_string(),
        });
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_metrics_after_search() {
        let state = state();
        search(
            State(state.clone()),
            Query(SearchParams {
                q: Some("juan".to_string()),
            }),
        )
        .await;

        let Json(metrics) = metrics(State(state)).await;
        assert_eq!(metrics.total_searches, 1);
        assert_eq!(metrics.tables["Internal_Directory"].errors, 0);
        assert_eq!(metrics.tables["External_Directory"].errors, 1);
    }
}
