use datasync_ports::storage::{SettingsDto, StorageError, StoragePort};
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "DataSync";
const SETTINGS_FILE: &str = "settings.json";

fn io_error(path: &Path, err: std::io::Error) -> StorageError {
    StorageError::Io(format!("{}: {err}", path.display()))
}

fn serde_error(path: &Path, err: serde_json::Error) -> StorageError {
    StorageError::Serde(format!("{}: {err}", path.display()))
}

/// Settings persisted as pretty JSON under one directory.
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// `<config dir>/DataSync`, e.g. `~/.config/DataSync` on Linux.
    pub fn user_config_dir() -> Result<PathBuf, StorageError> {
        dirs_next::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| StorageError::Io("no user config directory".to_string()))
    }

    pub fn settings_path(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE)
    }
}

impl Default for FsStorage {
    fn default() -> Self {
        Self::new(Self::user_config_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}

/// `Ok(None)` when the file does not exist yet.
fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    match fs::read(path) {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|err| serde_error(path, err)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_error(path, err)),
    }
}

/// Writes a sibling temp file, then renames it over `path`.
fn store_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|err| io_error(dir, err))?;
    }
    let bytes = serde_json::to_vec_pretty(value).map_err(|err| serde_error(path, err))?;
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, bytes).map_err(|err| io_error(&staging, err))?;
    fs::rename(&staging, path).map_err(|err| io_error(path, err))
}

impl StoragePort for FsStorage {
    fn load_settings(&self) -> Result<SettingsDto, StorageError> {
        let path = self.settings_path();
        let settings = load_json(&path)?;
        if settings.is_none() {
            debug!("no settings at {}, using defaults", path.display());
        }
        Ok(settings.unwrap_or_default())
    }

    fn save_settings(&self, s: &SettingsDto) -> Result<(), StorageError> {
        let path = self.settings_path();
        store_json(&path, s)?;
        debug!("settings saved to {}", path.display());
        Ok(())
    }
}
