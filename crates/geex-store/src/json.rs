//! Job history persisted as a JSON array
//!
//! The file holds newest entries first. Reads are forgiving: a missing,
//! unreadable or corrupt file is an empty history, and individual entries
//! that no longer parse are skipped when listing but kept on disk. Writes
//! replace the whole file atomically.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde_json::Value;

use geex_core::error::{GeexError, Result};
use geex_core::fsutil::write_atomic;
use geex_core::models::{HistoryEntry, JobId, Settings};
use geex_core::ports::HistoryStore;

/// JSON file implementation of HistoryStore
#[derive(Debug)]
pub struct JsonHistoryStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl JsonHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    /// History file inside the configured cache folder
    pub fn for_settings(settings: &Settings) -> Self {
        Self::new(settings.history_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw array items, newest first
    fn read_items(&self) -> Vec<Value> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!(
                    "Could not read history {}: {}; treating as empty",
                    self.path.display(),
                    e
                );
                return Vec::new();
            }
        };

        if content.trim().is_empty() {
            return Vec::new();
        }

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Array(items)) => items,
            Ok(_) => {
                tracing::warn!(
                    "History {} is not a JSON array; treating as empty",
                    self.path.display()
                );
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(
                    "History {} is corrupt: {}; treating as empty",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    fn parse_entries(&self, items: Vec<Value>) -> Vec<HistoryEntry> {
        let total = items.len();
        let entries: Vec<HistoryEntry> = items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Skipping malformed history entry: {}", e);
                    None
                }
            })
            .collect();

        if entries.len() < total {
            tracing::warn!(
                skipped = total - entries.len(),
                "Recovered {} of {} history entries from {}",
                entries.len(),
                total,
                self.path.display()
            );
        }
        entries
    }

    fn write_items(&self, items: &[Value]) -> Result<()> {
        let json = serde_json::to_vec_pretty(items)
            .map_err(|e| GeexError::Serialization(e.to_string()))?;
        write_atomic(&self.path, &json)
            .map_err(|source| GeexError::HistoryWrite { path: self.path.clone(), source })
    }
}

/// Job id of a raw item, whether or not the rest of it parses
fn item_job_id(item: &Value) -> Option<JobId> {
    item.get("job_id")?.as_str()?.parse().ok()
}

impl HistoryStore for JsonHistoryStore {
    /// Items this build cannot parse are written back untouched.
    fn append(&self, entry: &HistoryEntry) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut items = self.read_items();
        if items.iter().any(|item| item_job_id(item) == Some(entry.job_id)) {
            return Err(GeexError::DuplicateJobId { job_id: entry.job_id.to_string() });
        }

        let value =
            serde_json::to_value(entry).map_err(|e| GeexError::Serialization(e.to_string()))?;
        items.insert(0, value);
        self.write_items(&items)?;

        tracing::info!("Recorded job {} in {}", entry.job_id, self.path.display());
        Ok(())
    }

    fn list_all(&self) -> Vec<HistoryEntry> {
        let mut entries = self.parse_entries(self.read_items());
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries
    }
}
