//! Device-storage mirror of the questionnaire so a reload resumes mid-flow.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::domain::SessionId;
use super::form_data::FormData;

pub const SESSION_ID_KEY: &str = "questionnaire-session-id";
pub const FORM_DATA_KEY: &str = "questionnaire-form-data";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io failed for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid storage key '{0}'")]
    InvalidKey(String),
}

/// String key/value store with browser `localStorage` semantics.
pub trait DeviceStorage: Debug + Send {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeviceStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.items.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per item under a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl DeviceStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)
            .and_then(|_| fs::write(path, value))
            .map_err(|source| StorageError::Io {
                key: key.to_string(),
                source,
            })
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

/// Existing session id, or a fresh one written back to storage.
pub fn session_id(storage: &mut dyn DeviceStorage) -> SessionId {
    match storage.get_item(SESSION_ID_KEY) {
        Ok(Some(raw)) if !raw.trim().is_empty() => return SessionId(raw.trim().to_string()),
        Ok(_) => {}
        Err(err) => warn!(error = %err, "session id unreadable, starting a new session"),
    }

    let id = SessionId::generate();
    if let Err(err) = storage.set_item(SESSION_ID_KEY, &id.0) {
        warn!(error = %err, "unable to persist questionnaire session id");
    }
    id
}

/// Stored answers, if any. A corrupt mirror is discarded rather than surfaced.
pub fn load_form_data(storage: &dyn DeviceStorage) -> Option<FormData> {
    let raw = match storage.get_item(FORM_DATA_KEY) {
        Ok(raw) => raw?,
        Err(err) => {
            warn!(error = %err, "questionnaire mirror unreadable");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(data) => Some(data),
        Err(err) => {
            warn!(error = %err, "discarding malformed questionnaire mirror");
            None
        }
    }
}

pub fn save_form_data(storage: &mut dyn DeviceStorage, data: &FormData) {
    let encoded = match serde_json::to_string(data) {
        Ok(encoded) => encoded,
        Err(err) => {
            warn!(error = %err, "unable to encode questionnaire mirror");
            return;
        }
    };
    if let Err(err) = storage.set_item(FORM_DATA_KEY, &encoded) {
        warn!(error = %err, "unable to write questionnaire mirror");
    }
}

pub fn clear_form_data(storage: &mut dyn DeviceStorage) {
    if let Err(err) = storage.remove_item(FORM_DATA_KEY) {
        warn!(error = %err, "unable to clear questionnaire mirror");
    }
}
