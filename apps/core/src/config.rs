use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const APP_DIR_NAME: &str = "newtab";
pub const DATA_DIR_ENV: &str = "NEWTAB_DATA_DIR";

const CONFIG_FILE_NAME: &str = "config.toml";
const STORE_FILE_NAME: &str = "local-store.sqlite3";
const DASHBOARD_FILE_NAME: &str = "dashboard.json5";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to encode config: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Engine settings. The dashboard itself lives in a separate file named by
/// `dashboard_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub max_results: u16,
    pub debounce_ms: u64,
    pub store_path: PathBuf,
    pub dashboard_path: PathBuf,
    #[serde(skip)]
    pub config_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let base = stable_app_data_dir();
        Self {
            max_results: 50,
            debounce_ms: 120,
            store_path: base.join(STORE_FILE_NAME),
            dashboard_path: base.join(DASHBOARD_FILE_NAME),
            config_path: base.join(CONFIG_FILE_NAME),
        }
    }
}

/// Per-user data directory. `NEWTAB_DATA_DIR` overrides the platform
/// default.
pub fn stable_app_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|value| !value.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}

pub fn default_config_path() -> PathBuf {
    stable_app_data_dir().join(CONFIG_FILE_NAME)
}

/// Loads the config at `path` (or the default location). A missing file
/// yields defaults pointing at that path.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !config_path.exists() {
        return Ok(Config {
            config_path,
            ..Config::default()
        });
    }

    let raw = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
        path: config_path.clone(),
        source,
    })?;
    let mut cfg: Config = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: config_path.clone(),
        source,
    })?;
    cfg.config_path = config_path;
    validate(&cfg)?;
    Ok(cfg)
}

pub fn save(cfg: &Config) -> Result<(), ConfigError> {
    validate(cfg)?;
    if let Some(parent) = cfg.config_path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let encoded = toml::to_string_pretty(cfg)?;
    std::fs::write(&cfg.config_path, encoded).map_err(|source| ConfigError::Write {
        path: cfg.config_path.clone(),
        source,
    })
}

pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.max_results < 5 || cfg.max_results > 100 {
        return Err(ConfigError::Invalid("max_results must be between 5 and 100".into()));
    }

    if cfg.debounce_ms > 2_000 {
        return Err(ConfigError::Invalid("debounce_ms must be at most 2000".into()));
    }

    if cfg.store_path.as_os_str().is_empty() {
        return Err(ConfigError::Invalid("store_path is required".into()));
    }

    if cfg.dashboard_path.as_os_str().is_empty() {
        return Err(ConfigError::Invalid("dashboard_path is required".into()));
    }

    Ok(())
}
