//! Knowledge-base facade
//!
//! Ties the table source, the snapshot cache and the search engine together
//! and exposes the data operations the knowledge-base pages are built on:
//! per-sheet accessors, staff directories by kind, quick statistics, search,
//! cache clearing and a connection check.

use crate::cache::{Clock, SystemClock, TtlCache};
use crate::config::{SheetNames, Settings};
use crate::error::{Error, FetchError};
use crate::metrics::Metrics;
use crate::results::SearchResponse;
use crate::search::{Search, TableSpec};
use crate::sources::{self, TableSource};
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

const QUICK_STATS_KEY: &str = "quickstats";

/// Which staff directory to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectoryKind {
    Internal,
    External,
    Npmo,
}

impl DirectoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::External => "external",
            Self::Npmo => "npmo",
        }
    }
}

impl FromStr for DirectoryKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "internal" => Ok(Self::Internal),
            "external" => Ok(Self::External),
            "npmo" => Ok(Self::Npmo),
            other => Err(Error::InvalidDirectoryKind(other.to_string())),
        }
    }
}

/// Headline row counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickStats {
    pub internal_count: usize,
    pub activities_count: usize,
    pub files_count: usize,
}

/// Outcome of probing the spreadsheet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionCheck {
    pub source: String,
    pub title: Option<String>,
    /// Sheets the spreadsheet has
    pub sheets: Vec<String>,
    /// Configured sheets the spreadsheet lacks
    pub missing: Vec<String>,
}

/// Data service over a spreadsheet-backed knowledge base
pub struct KnowledgeBase {
    source: Arc<dyn TableSource>,
    sheets: SheetNames,
    search: Search,
    stats: TtlCache<QuickStats>,
}

impl KnowledgeBase {
    /// Create a knowledge base using the wall clock
    pub fn new(settings: &Settings, source: Arc<dyn TableSource>) -> Self {
        Self::with_clock(settings, source, Arc::new(SystemClock))
    }

    /// Create a knowledge base with an explicit cache clock
    pub fn with_clock(
        settings: &Settings,
        source: Arc<dyn TableSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let tables = Arc::new(TtlCache::from_settings(&settings.cache, clock.clone()));
        let search = Search::new(source.clone(), tables, TableSpec::from_settings(settings))
            .with_settings(settings.search.clone())
            .with_timeout(settings.source.timeout());

        Self {
            source,
            sheets: settings.sheets.clone(),
            search,
            stats: TtlCache::from_settings(&settings.cache, clock),
        }
    }

    /// Build the source described by the settings and wrap it
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let source = sources::from_settings(&settings.source)?;
        info!("Using table source: {}", source.name());
        Ok(Self::new(settings, source))
    }

    pub fn search_engine(&self) -> &Search {
        &self.search
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        self.search.metrics()
    }

    pub fn sheets(&self) -> &SheetNames {
        &self.sheets
    }

    /// Cached snapshot of any sheet
    pub async fn table(&self, name: &str) -> Result<Arc<Table>, FetchError> {
        self.search.fetch_table(name).await
    }

    pub async fn implementation_structure(&self) -> Result<Arc<Table>, FetchError> {
        self.table(&self.sheets.implementation_structure).await
    }

    pub async fn municipalities(&self) -> Result<Arc<Table>, FetchError> {
        self.table(&self.sheets.municipalities).await
    }

    pub async fn fma_municipalities(&self) -> Result<Arc<Table>, FetchError> {
        self.table(&self.sheets.fma_municipalities).await
    }

    pub async fn activities(&self) -> Result<Arc<Table>, FetchError> {
        self.table(&self.sheets.activities).await
    }

    pub async fn reference_files(&self) -> Result<Arc<Table>, FetchError> {
        self.table(&self.sheets.reference_files).await
    }

    pub async fn fma_profile(&self) -> Result<Arc<Table>, FetchError> {
        self.table(&self.sheets.fma_profile).await
    }

    pub async fn landing_centers(&self) -> Result<Arc<Table>, FetchError> {
        self.table(&self.sheets.landing_centers).await
    }

    /// Sheet name backing a directory kind
    pub fn directory_sheet(&self, kind: DirectoryKind) -> &str {
        match kind {
            DirectoryKind::Internal => self.sheets.internal_directory.as_str(),
            DirectoryKind::External => self.sheets.external_directory.as_str(),
            DirectoryKind::Npmo => self.sheets.npmo_directory.as_str(),
        }
    }

    pub async fn directory(&self, kind: DirectoryKind) -> Result<Arc<Table>, FetchError> {
        self.table(self.directory_sheet(kind)).await
    }

    /// Row counts of the internal directory, activities and reference files
    pub async fn quick_stats(&self) -> Result<QuickStats, FetchError> {
        self.stats
            .get_or_fetch(QUICK_STATS_KEY, || async {
                let (internal, activities, files) = futures::try_join!(
                    self.directory(DirectoryKind::Internal),
                    self.activities(),
                    self.reference_files()
                )?;

                Ok(QuickStats {
                    internal_count: internal.len(),
                    activities_count: activities.len(),
                    files_count: files.len(),
                })
            })
            .await
    }

    /// Search every configured table
    pub async fn search(&self, query: &str) -> SearchResponse {
        self.search.search_all(query).await
    }

    /// Drop every cached table and statistic
    pub fn clear_cache(&self) {
        self.search.cache().clear();
        self.stats.clear();
        info!("Cache cleared");
    }

    /// Probe the source and report configured sheets it does not have
    pub async fn check_connection(&self) -> Result<ConnectionCheck, FetchError> {
        let report = self.source.check_connection().await?;

        let missing: Vec<String> = self
            .sheets
            .all()
            .into_iter()
            .filter(|name| !report.sheets.iter().any(|s| s == name))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            warn!("Missing sheets: {:?}", missing);
        }

        Ok(ConnectionCheck {
            source: self.source.name().to_string(),
            title: report.title,
            sheets: report.sheets,
            missing,
        })
    }
}
