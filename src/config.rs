use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

const CONFIG_FILE_NAME: &str = "config.json";
pub const DEFAULT_LARGE_FILE_LIMIT_MB: u64 = 100;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jira_base_url: Option<String>,
    pub jira_email: Option<String>,
    pub jira_token: Option<String>,
    pub large_file_limit_mb: u64,
    pub workspace_root: PathBuf,
}

impl AppConfig {
    pub fn load(workspace_root: &Path) -> AppResult<Self> {
        let stored = StoredConfig::load()?;
        Self::from_sources(stored, workspace_root, |key| env::var(key).ok())
    }

    fn from_sources(
        stored: StoredConfig,
        workspace_root: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> AppResult<Self> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let large_file_limit_mb = match non_empty("SPROUT_LARGE_FILE_LIMIT_MB") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|err| {
                AppError::Configuration(format!(
                    "SPROUT_LARGE_FILE_LIMIT_MB must be a whole number of megabytes: {err}"
                ))
            })?,
            None => stored
                .large_file_limit_mb
                .unwrap_or(DEFAULT_LARGE_FILE_LIMIT_MB),
        };

        Ok(Self {
            jira_base_url: non_empty("SPROUT_JIRA_BASE_URL").or(stored.jira_base_url),
            jira_email: non_empty("SPROUT_JIRA_EMAIL").or(stored.jira_email),
            jira_token: non_empty("SPROUT_JIRA_TOKEN")
                .or_else(|| non_empty("JIRA_API_TOKEN"))
                .or(stored.jira_token),
            large_file_limit_mb,
            workspace_root: workspace_root.to_path_buf(),
        })
    }
}

/// Settings persisted by `sprout config init`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large_file_limit_mb: Option<u64>,
}

impl StoredConfig {
    pub fn load() -> AppResult<Self> {
        Self::load_from(&config_file_path()?)
    }

    pub fn save(&self) -> AppResult<()> {
        self.save_to(&config_file_path()?)
    }

    fn load_from(path: &Path) -> AppResult<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|err| {
                AppError::Configuration(format!("invalid config file {}: {err}", path.display()))
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(AppError::Io(err)),
        }
    }

    fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)
            .map_err(|err| AppError::Configuration(format!("failed to write config: {err}")))?;
        fs::write(path, data)?;
        Ok(())
    }
}

pub fn config_directory() -> AppResult<PathBuf> {
    directories::ProjectDirs::from("dev", "sprout", "sprout")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| {
            AppError::Configuration("cannot determine configuration directory".to_string())
        })
}

pub fn config_file_path() -> AppResult<PathBuf> {
    Ok(config_directory()?.join(CONFIG_FILE_NAME))
}
