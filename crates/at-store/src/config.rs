//! Store configuration.

use std::path::Path;

use at_report::DraftDefaults;
use serde::{Deserialize, Serialize};

use crate::StoreResult;

pub const DEFAULT_STORAGE_KEY: &str = "airtightness-report-storage";

/// Most values a single column paste may write.
pub const DEFAULT_PASTE_ROW_LIMIT: usize = 500;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// Key the whole persisted document lives under.
    pub storage_key: String,
    pub paste_row_limit: usize,
    pub defaults: DraftDefaults,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            paste_row_limit: DEFAULT_PASTE_ROW_LIMIT,
            defaults: DraftDefaults::default(),
        }
    }
}

impl StoreConfig {
    pub fn from_yaml_str(content: &str) -> StoreResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Key an unreadable document is copied to before it can be replaced.
    pub fn backup_key(&self) -> String {
        format!("{}.bak", self.storage_key)
    }

    pub fn load_yaml(path: &Path) -> StoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }
}
