//! Progress persistence backends.
//!
//! A backend owns one local slot for the progress blob and one for the
//! words-per-day preference. Loads never fail: unreadable data is logged and
//! replaced by defaults.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::progress::{ProgressStore, WordCount};

/// Local persistence for progress and preferences.
pub trait ProgressBackend: Send + Sync {
    fn load(&self) -> ProgressStore;

    fn save(&self, store: &ProgressStore) -> Result<(), StoreError>;

    fn load_word_count(&self) -> WordCount;

    fn save_word_count(&self, count: WordCount) -> Result<(), StoreError>;
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Preferences {
    word_count: WordCount,
}

fn parse_word_count(json: &str) -> WordCount {
    match serde_json::from_str::<Preferences>(json) {
        Ok(prefs) => prefs.word_count,
        Err(e) => {
            tracing::warn!(error = %e, "discarding unreadable preferences");
            WordCount::default()
        }
    }
}

// ---------------------------------------------------------------------------
// JSON files
// ---------------------------------------------------------------------------

const PROGRESS_FILE: &str = "progress.json";
const PREFERENCES_FILE: &str = "preferences.json";

/// Stores progress as JSON files in a data directory.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    dir: PathBuf,
}

impl JsonFileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn progress_path(&self) -> PathBuf {
        self.dir.join(PROGRESS_FILE)
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.dir.join(PREFERENCES_FILE)
    }

    fn read(&self, path: &Path) -> Option<String> {
        match std::fs::read_to_string(path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read local state");
                None
            }
        }
    }

    /// Write via a temp file and rename so a crash never leaves half a file.
    fn write_atomic(&self, path: &Path, content: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl ProgressBackend for JsonFileBackend {
    fn load(&self) -> ProgressStore {
        self.read(&self.progress_path())
            .map(|json| ProgressStore::from_json_lossy(&json))
            .unwrap_or_default()
    }

    fn save(&self, store: &ProgressStore) -> Result<(), StoreError> {
        self.write_atomic(&self.progress_path(), &store.to_json()?)
    }

    fn load_word_count(&self) -> WordCount {
        self.read(&self.preferences_path())
            .map(|json| parse_word_count(&json))
            .unwrap_or_default()
    }

    fn save_word_count(&self, count: WordCount) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&Preferences { word_count: count })?;
        self.write_atomic(&self.preferences_path(), &json)
    }
}

// ---------------------------------------------------------------------------
// In memory
// ---------------------------------------------------------------------------

/// Keeps the serialized blobs in memory. Used by tests.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    progress: Mutex<Option<String>>,
    preferences: Mutex<Option<String>>,
    saves: AtomicU32,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a raw progress blob, valid or not.
    pub fn with_raw_progress(json: &str) -> Self {
        Self {
            progress: Mutex::new(Some(json.to_string())),
            ..Self::default()
        }
    }

    /// Number of progress saves so far.
    pub fn save_count(&self) -> u32 {
        self.saves.load(Ordering::Relaxed)
    }

    pub fn raw_progress(&self) -> Option<String> {
        self.progress
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl ProgressBackend for MemoryBackend {
    fn load(&self) -> ProgressStore {
        self.raw_progress()
            .map(|json| ProgressStore::from_json_lossy(&json))
            .unwrap_or_default()
    }

    fn save(&self, store: &ProgressStore) -> Result<(), StoreError> {
        let json = store.to_json()?;
        *self.progress.lock().unwrap_or_else(|e| e.into_inner()) = Some(json);
        self.saves.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn load_word_count(&self) -> WordCount {
        self.preferences
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_deref()
            .map(parse_word_count)
            .unwrap_or_default()
    }

    fn save_word_count(&self, count: WordCount) -> Result<(), StoreError> {
        let json = serde_json::to_string(&Preferences { word_count: count })?;
        *self.preferences.lock().unwrap_or_else(|e| e.into_inner()) = Some(json);
        Ok(())
    }
}
