use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::app_dirs::AppDirs;
use crate::ports::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// What happens to the input history when the user starts over.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RestartPolicy {
    #[default]
    Retain,
    Wipe,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub openai_base_url: String,
    pub extraction_model: String,
    pub extraction_timeout_secs: u64,
    /// No URL means the offline estimate is used.
    pub prediction_url: Option<String>,
    pub prediction_timeout_secs: u64,
    pub dataset_dir: Option<PathBuf>,
    pub dataset_base_url: Option<String>,
    pub dataset_timeout_secs: u64,
    pub dataset_years: Vec<u16>,
    pub dataset_cache_ttl_secs: u64,
    pub restart_policy: RestartPolicy,
    pub seed_history: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_base_url: DEFAULT_BASE_URL.to_string(),
            extraction_model: DEFAULT_MODEL.to_string(),
            extraction_timeout_secs: 30,
            prediction_url: None,
            prediction_timeout_secs: 30,
            dataset_dir: None,
            dataset_base_url: None,
            dataset_timeout_secs: 60,
            dataset_years: vec![2023, 2024],
            dataset_cache_ttl_secs: 3600,
            restart_policy: RestartPolicy::Retain,
            seed_history: true,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    /// Falls back to defaults when the file is absent or unreadable.
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        serde_json::from_slice::<Config>(&bytes).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "ignoring malformed config");
            Config::default()
        })
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
