//! Application settings loaded from `config.toml`.

use anyhow::{Context, Result};
use directories_next::ProjectDirs;
use lookbook_core::Feature;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the configured vision API key.
pub const API_KEY_ENV: &str = "LOOKBOOK_VISION_KEY";

pub const DEFAULT_VISION_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub vision_endpoint: String,
    pub api_key: Option<String>,
    pub features: Vec<Feature>,
    /// Per-request timeout for both external services.
    pub timeout_secs: u64,
    /// Live similar-item endpoint; the curated catalog is used when unset.
    pub search_endpoint: Option<String>,
    pub history_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            vision_endpoint: DEFAULT_VISION_ENDPOINT.to_string(),
            api_key: None,
            features: Feature::ALL.to_vec(),
            timeout_secs: 30,
            search_endpoint: None,
            history_path: None,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("app", "Lookbook", "lookbook")
}

impl AppConfig {
    /// Load from `explicit` when given (it must exist), otherwise from the
    /// platform config dir when present, otherwise defaults. The API key
    /// environment override is applied last.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::from_toml_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_toml_file(&path)?,
                _ => Self::default(),
            },
        };
        Ok(config.with_env_key(std::env::var(API_KEY_ENV).ok()))
    }

    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn with_env_key(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        self
    }

    /// Where analysis records are appended.
    pub fn history_file(&self) -> PathBuf {
        if let Some(path) = &self.history_path {
            return path.clone();
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().join("history.jsonl"))
            .unwrap_or_else(|| PathBuf::from("lookbook-history.jsonl"))
    }
}
