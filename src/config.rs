//! Runtime configuration: which storage backend to use and where the data
//! lives. A missing or broken config file yields the defaults.

use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use serde::Deserialize;
use tracing::{info, warn};

use crate::db::{FileStorage, MemoryStorage, SharedStorage, SqliteStorage};

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".league-manager";
/// Config file name inside the data directory.
const CONFIG_FILE_NAME: &str = "config.json";
/// SQLite file name stored inside the data directory.
const DB_FILE_NAME: &str = "league.sqlite";
/// Sub-directory holding the JSON snapshots of the `file` backend.
const SNAPSHOT_DIR_NAME: &str = "snapshots";
/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "LEAGUE_MANAGER_CONFIG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    File,
    Memory,
}

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub storage: StorageBackend,
    pub data_dir: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    storage: Option<StorageBackend>,
    #[serde(default)]
    data_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load from `$LEAGUE_MANAGER_CONFIG` or `~/.league-manager/config.json`.
    pub fn load() -> Result<Self> {
        let default_dir = default_data_dir()?;
        let path = env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| default_dir.join(CONFIG_FILE_NAME));
        Ok(Self::load_from(&path, default_dir))
    }

    /// Load from an explicit path, using `default_dir` when the file does not
    /// name a data directory.
    pub fn load_from(path: &Path, default_dir: PathBuf) -> Self {
        let raw = match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    info!(path = %path.display(), "loaded config");
                    raw
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    RawConfig::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "config file not found; using defaults");
                RawConfig::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                RawConfig::default()
            }
        };

        Self {
            storage: raw.storage.unwrap_or_default(),
            data_dir: raw.data_dir.unwrap_or(default_dir),
        }
    }

    /// Open the configured backend.
    pub fn open_storage(&self) -> Result<SharedStorage> {
        let storage: SharedStorage = match self.storage {
            StorageBackend::Sqlite => {
                let path = self.data_dir.join(DB_FILE_NAME);
                Rc::new(SqliteStorage::open(&path)?)
            }
            StorageBackend::File => {
                let dir = self.data_dir.join(SNAPSHOT_DIR_NAME);
                Rc::new(FileStorage::open(&dir).context("failed to open snapshot directory")?)
            }
            StorageBackend::Memory => Rc::new(MemoryStorage::new()),
        };
        info!(backend = ?self.storage, data_dir = %self.data_dir.display(), "storage ready");
        Ok(storage)
    }
}

/// Resolve `~/.league-manager`.
pub fn default_data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::StoragePort;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("absent.json"), dir.path().into());
        assert_eq!(config.storage, StorageBackend::Sqlite);
        assert_eq!(config.data_dir, dir.path());
    }

    #[test]
    fn reads_backend_and_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"storage": "file", "data_dir": "/srv/league"}"#).unwrap();
        let config = AppConfig::load_from(&path, dir.path().into());
        assert_eq!(config.storage, StorageBackend::File);
        assert_eq!(config.data_dir, PathBuf::from("/srv/league"));
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"storage": "cloud"}"#).unwrap();
        let config = AppConfig::load_from(&path, dir.path().into());
        assert_eq!(config.storage, StorageBackend::Sqlite);
    }

    #[test]
    fn opens_file_backend_under_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            storage: StorageBackend::File,
            data_dir: dir.path().into(),
        };
        let storage = config.open_storage().unwrap();
        storage.set("teams", "[]").unwrap();
        assert!(dir.path().join("snapshots").join("teams.json").exists());
    }
}
