//! Settings structures for sheetkb configuration

use crate::error::Error;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main settings structure, loaded from settings.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub source: SourceSettings,
    pub cache: CacheSettings,
    pub search: SearchSettings,
    pub sheets: SheetNames,
    pub tables: Vec<TableConfig>,
    pub server: ServerSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            general: GeneralSettings::default(),
            source: SourceSettings::default(),
            cache: CacheSettings::default(),
            search: SearchSettings::default(),
            sheets: SheetNames::default(),
            tables: default_tables(),
            server: ServerSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse settings from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(content)?;
        Ok(settings)
    }

    /// Merge with environment variables (SHEETKB_* prefix)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("SHEETKB_DEBUG") {
            self.general.debug = val.parse().unwrap_or(false);
        }
        if let Ok(val) = std::env::var("SHEETKB_SPREADSHEET_ID") {
            self.source.spreadsheet_id = val;
        }
        if let Ok(val) = std::env::var("SHEETKB_API_KEY") {
            self.source.api_key = val;
        }
        if let Ok(val) = std::env::var("SHEETKB_CACHE_TTL_MS") {
            if let Ok(ttl) = val.parse() {
                self.cache.ttl_ms = ttl;
            }
        }
        if let Ok(val) = std::env::var("SHEETKB_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("SHEETKB_BIND_ADDRESS") {
            self.server.bind_address = val;
        }
    }

    /// Check the settings for values the search core cannot work with
    pub fn validate(&self) -> std::result::Result<(), Error> {
        if self.cache.ttl_ms == 0 {
            return Err(Error::Config("cache.ttl_ms must be greater than zero".into()));
        }
        if self.search.max_results == 0 {
            return Err(Error::Config("search.max_results must be greater than zero".into()));
        }

        let mut names = HashSet::new();
        for table in &self.tables {
            if table.name.trim().is_empty() {
                return Err(Error::Config("table name must not be empty".into()));
            }
            if !names.insert(table.name.as_str()) {
                return Err(Error::Config(format!("duplicate table: {}", table.name)));
            }
            if table.fields.is_empty() {
                return Err(Error::Config(format!("table {} has no search fields", table.name)));
            }
            for field in &table.fields {
                if field.is_empty() || field.trim() != field {
                    return Err(Error::Config(format!(
                        "table {} has an invalid field name {:?}",
                        table.name, field
                    )));
                }
            }
        }

        Ok(())
    }

    /// Get table config by name
    pub fn get_table(&self, name: &str) -> Option<&TableConfig> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Get all searchable tables
    pub fn enabled_tables(&self) -> Vec<&TableConfig> {
        self.tables.iter().filter(|t| !t.disabled).collect()
    }
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Enable debug logging
    pub debug: bool,
    /// Knowledge base name
    pub instance_name: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            debug: false,
            instance_name: "Knowledge Base".to_string(),
        }
    }
}

/// Where tables are fetched from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Spreadsheet ID from the sheet URL
    pub spreadsheet_id: String,
    /// API key for public spreadsheets
    pub api_key: String,
    /// Sheets API base URL
    pub base_url: String,
    /// Request timeout in seconds
    pub request_timeout: f64,
    /// Optional proxy for all requests
    pub proxy: Option<String>,
    /// Serve tables from a local JSON/YAML file instead of the API
    pub fixture: Option<PathBuf>,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            api_key: String::new(),
            base_url: "https://sheets.googleapis.com".to_string(),
            request_timeout: 10.0,
            proxy: None,
            fixture: None,
        }
    }
}

impl SourceSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.request_timeout.max(0.0))
    }
}

/// Table snapshot cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Time to live in milliseconds
    pub ttl_ms: u64,
    /// Maximum number of cached entries
    pub max_capacity: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_ms: 300_000,
            max_capacity: 256,
        }
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

/// Search and ranking settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Maximum number of results returned
    pub max_results: usize,
    /// Number of top results suggestions are drawn from
    pub max_suggestions: usize,
    /// Score added when a field equals the query
    pub exact_match_weight: u32,
    /// Score added when a field contains the query
    pub partial_match_weight: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_results: 50,
            max_suggestions: 5,
            exact_match_weight: 10,
            partial_match_weight: 1,
        }
    }
}

/// Sheet names for each role the knowledge base knows about.
/// Names must match the spreadsheet exactly (case-sensitive).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetNames {
    pub internal_directory: String,
    pub external_directory: String,
    pub npmo_directory: String,
    pub activities: String,
    pub municipalities: String,
    pub fma_municipalities: String,
    pub reference_files: String,
    pub implementation_structure: String,
    pub fma_profile: String,
    pub landing_centers: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            internal_directory: "Internal_Directory".to_string(),
            external_directory: "External_Directory".to_string(),
            npmo_directory: "NPMO_Directory".to_string(),
            activities: "Activities_Conducted".to_string(),
            municipalities: "FMA_6_&_9_Municipalities".to_string(),
            fma_municipalities: "FMA_Municipalities".to_string(),
            reference_files: "Reference_Files".to_string(),
            implementation_structure: "Implementation_Structure".to_string(),
            fma_profile: "FMA_Profile".to_string(),
            landing_centers: "Landing_Centers".to_string(),
        }
    }
}

impl SheetNames {
    /// All configured sheet names
    pub fn all(&self) -> Vec<&str> {
        vec![
            self.internal_directory.as_str(),
            self.external_directory.as_str(),
            self.npmo_directory.as_str(),
            self.activities.as_str(),
            self.municipalities.as_str(),
            self.fma_municipalities.as_str(),
            self.reference_files.as_str(),
            self.implementation_structure.as_str(),
            self.fma_profile.as_str(),
            self.landing_centers.as_str(),
        ]
    }
}

/// A searchable table and the columns that participate in matching
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Sheet name
    pub name: String,
    /// Columns eligible for matching, in priority order
    pub fields: Vec<String>,
    /// Exclude this table from search
    pub disabled: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            fields: vec![],
            disabled: false,
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub port: u16,
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8888,
            bind_address: "127.0.0.1".to_string(),
        }
    }
}

fn table(name: &str, fields: &[&str]) -> TableConfig {
    TableConfig {
        name: name.to_string(),
        fields: fields.iter().map(|f| f.to_string()).collect(),
        ..Default::default()
    }
}

/// Default searchable tables, in scan order
pub fn default_tables() -> Vec<TableConfig> {
    let sheets = SheetNames::default();
    vec![
        table(
            &sheets.implementation_structure,
            &["COMPONENT", "FULL_NAME", "LEVEL", "HEAD", "COMPOSITION"],
        ),
        table(
            &sheets.municipalities,
            &["FMA_ID", "REGION", "PROVINCE", "MUNICIPALITY"],
        ),
        table(
            &sheets.activities,
            &[
                "ACTIVITY_TITLE",
                "DATE_CONDUCTED",
                "LOCATION",
                "RESOURCE_PERSON",
                "REFERENCE_DOC",
            ],
        ),
        table(
            &sheets.internal_directory,
            &[
                "GIVEN_NAME",
                "LAST_NAME",
                "MIDDLE_INITIAL",
                "COMPONENT",
                "POSITION_DESIGNATION",
                "EMPLOYMENT_TYPE",
                "EMAIL",
            ],
        ),
        table(
            &sheets.external_directory,
            &[
                "GIVEN_NAME",
                "LAST_NAME",
                "MIDDLE_INITIAL",
                "OFFICE",
                "POSITION_DESIGNATION",
                "FMA_LEAD",
                "EMAIL",
            ],
        ),
        table(
            &sheets.npmo_directory,
            &[
                "GIVEN_NAME",
                "LAST_NAME",
                "MIDDLE_INITIAL",
                "OFFICE",
                "POSITION_DESIGNATION",
                "COMPONENT",
                "EMAIL",
            ],
        ),
        table(
            &sheets.reference_files,
            &["DOCUMENT_TITLE", "FILE_URL", "CATEGORY"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.cache.ttl_ms, 300_000);
        assert_eq!(settings.search.max_results, 50);
        assert_eq!(settings.tables.len(), 7);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_table_lookup() {
        let settings = Settings::default();
        let refs = settings.get_table("Reference_Files").unwrap();
        assert_eq!(refs.fields, vec!["DOCUMENT_TITLE", "FILE_URL", "CATEGORY"]);
    }

    #[test]
    fn test_from_yaml_partial() {
        let settings = Settings::from_yaml(
            r#"
cache:
  ttl_ms: 1000
tables:
  - name: Directory
    fields: [NAME, EMAIL]
  - name: Archive
    fields: [TITLE]
    disabled: true
"#,
        )
        .unwrap();

        assert_eq!(settings.cache.ttl_ms, 1000);
        assert_eq!(settings.cache.max_capacity, 256);
        assert_eq!(settings.search.exact_match_weight, 10);
        assert_eq!(settings.tables.len(), 2);
        assert_eq!(settings.enabled_tables().len(), 1);
        assert_eq!(settings.sheets.activities, "Activities_Conducted");
    }

    #[test]
    fn test_missing_tables_use_defaults() {
        let settings = Settings::from_yaml("general:\n  debug: true\n").unwrap();
        assert!(settings.general.debug);
        assert_eq!(settings.tables.len(), 7);
    }

    #[test]
    fn test_validate_rejects_bad_tables() {
        let mut settings = Settings::default();
        settings.tables.push(table("Reference_Files", &["X"]));
        assert!(matches!(settings.validate(), Err(Error::Config(_))));

        let mut settings = Settings::default();
        settings.tables = vec![table("Directory", &[" NAME"])];
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.tables = vec![table("Directory", &[])];
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_ttl() {
        let mut settings = Settings::default();
        settings.cache.ttl_ms = 0;
        assert!(settings.validate().is_err());
    }
}
