//! JSON persistence for the history and today documents.
//!
//! Loads never fail: a missing, unreadable, or corrupt document is replaced by
//! the caller's default. Saves are atomic (temp file in the same directory,
//! then rename), so a later load sees either the old or the new document.

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::cards::TodaySet;
use crate::history::History;

pub const DEFAULT_HISTORY_PATH: &str = "history.json";
pub const DEFAULT_TODAY_PATH: &str = "today.json";

/// Fatal persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize {}: {source}", .path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Owner of the two persisted documents.
#[derive(Debug, Clone)]
pub struct StateStore {
    history_path: PathBuf,
    today_path: PathBuf,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_PATH, DEFAULT_TODAY_PATH)
    }
}

impl StateStore {
    pub fn new(history_path: impl Into<PathBuf>, today_path: impl Into<PathBuf>) -> Self {
        Self {
            history_path: history_path.into(),
            today_path: today_path.into(),
        }
    }

    pub fn history_path(&self) -> &Path {
        &self.history_path
    }

    pub fn today_path(&self) -> &Path {
        &self.today_path
    }

    pub fn load_history(&self) -> History {
        load_json(&self.history_path, History::default())
    }

    /// The last persisted set, if any.
    pub fn load_today(&self) -> Option<TodaySet> {
        load_json(&self.today_path, None)
    }

    pub fn save_history(&self, history: &History) -> Result<(), StorageError> {
        save_json(&self.history_path, history)
    }

    pub fn save_today(&self, today: &TodaySet) -> Result<(), StorageError> {
        save_json(&self.today_path, today)
    }

    /// Persist the pair: history first, then today.
    ///
    /// If the today write fails, the previous history document is put back
    /// before the error is returned. A history that could not be read
    /// beforehand is left as newly written.
    pub fn commit(&self, history: &History, today: &TodaySet) -> Result<(), StorageError> {
        let previous = Snapshot::take(&self.history_path);
        self.save_history(history)?;

        if let Err(err) = self.save_today(today) {
            if let Err(restore_err) = previous.restore(&self.history_path) {
                warn!("could not restore previous history: {restore_err}");
            }
            return Err(err);
        }
        Ok(())
    }
}

/// Contents of a document before it is overwritten.
#[derive(Debug, PartialEq, Eq)]
enum Snapshot {
    Bytes(Vec<u8>),
    Absent,
    Unreadable,
}

impl Snapshot {
    fn take(path: &Path) -> Self {
        match std::fs::read(path) {
            Ok(bytes) => Snapshot::Bytes(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Snapshot::Absent,
            Err(e) => {
                warn!("cannot read {} before overwriting it: {e}", path.display());
                Snapshot::Unreadable
            }
        }
    }

    fn restore(self, path: &Path) -> Result<(), StorageError> {
        match self {
            Snapshot::Bytes(bytes) => write_atomic(path, &bytes),
            Snapshot::Absent => std::fs::remove_file(path).map_err(|source| StorageError::Write {
                path: path.to_path_buf(),
                source,
            }),
            Snapshot::Unreadable => {
                warn!("leaving {} as newly written", path.display());
                Ok(())
            }
        }
    }
}

/// Read `path` as JSON, or return `default` if that is not possible.
pub fn load_json<T: DeserializeOwned>(path: &Path, default: T) -> T {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("{} not found, using default", path.display());
            return default;
        }
        Err(e) => {
            warn!("failed to read {}: {e}; using default", path.display());
            return default;
        }
    };
    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(e) => {
            warn!("failed to parse {}: {e}; using default", path.display());
            default
        }
    }
}

/// Pretty-print `value` and atomically replace `path` with it.
pub fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StorageError> {
    let mut json = serde_json::to_string_pretty(value).map_err(|source| {
        StorageError::Serialize {
            path: path.to_path_buf(),
            source,
        }
    })?;
    json.push('\n');
    write_atomic(path, json.as_bytes())?;
    debug!("wrote {} ({} bytes)", path.display(), json.len());
    Ok(())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    let write_err = |source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            std::fs::create_dir_all(dir).map_err(write_err)?;
            dir.to_path_buf()
        }
        _ => PathBuf::from("."),
    };
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "state".to_string());
    let tmp_path = dir.join(format!(".{file_name}.tmp"));

    std::fs::write(&tmp_path, bytes).map_err(write_err)?;
    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(write_err(e));
    }
    Ok(())
}
