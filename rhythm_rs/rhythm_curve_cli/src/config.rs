use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_STORE_PATH: &str = "submissions.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Optional TOML configuration file.
///
/// ```toml
/// [relay]
/// endpoint = "https://example.org/.netlify/functions/submit"
/// timeout_secs = 5
///
/// [store]
/// path = "data/submissions.json"
/// ```
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub relay: RelaySection,
    pub store: StoreSection,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RelaySection {
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct StoreSection {
    pub path: Option<PathBuf>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text =
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RelaySettings {
    pub endpoint: Option<String>,
    pub timeout: Duration,
    pub store_path: PathBuf,
}

impl RelaySettings {
    /// Command-line values win over the file; the file wins over defaults.
    pub fn merge(
        file: &FileConfig,
        endpoint: Option<String>,
        timeout_secs: Option<u64>,
        store_path: Option<PathBuf>,
    ) -> Self {
        let endpoint = endpoint
            .or_else(|| file.relay.endpoint.clone())
            .filter(|url| !url.trim().is_empty());
        let timeout_secs = timeout_secs
            .or(file.relay.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .max(1);
        let store_path = store_path
            .or_else(|| file.store.path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH));
        Self {
            endpoint,
            timeout: Duration::from_secs(timeout_secs),
            store_path,
        }
    }
}
