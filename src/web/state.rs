//! Application state shared across handlers

use crate::config::Settings;
use crate::knowledge::KnowledgeBase;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Global settings
    pub settings: Arc<Settings>,
    /// Knowledge base facade
    pub kb: Arc<KnowledgeBase>,
}

impl AppState {
    /// Create new application state
    pub fn new(settings: Settings, kb: KnowledgeBase) -> Self {
        Self {
            settings: Arc::new(settings),
            kb: Arc::new(kb),
        }
    }

    /// Build state, and the knowledge base's table source, from settings
    pub fn from_settings(settings: Settings) -> anyhow::Result<Self> {
        let kb = KnowledgeBase::from_settings(&settings)?;
        Ok(Self::new(settings, kb))
    }

    /// Get instance name
    pub fn instance_name(&self) -> &str {
        &self.settings.general.instance_name
    }
}
