//! In-memory job history

use std::sync::{Arc, PoisonError, RwLock};

use geex_core::error::{GeexError, Result};
use geex_core::models::HistoryEntry;
use geex_core::ports::HistoryStore;

/// In-memory implementation of HistoryStore
#[derive(Debug, Clone, Default)]
pub struct MemoryHistoryStore {
    entries: Arc<RwLock<Vec<HistoryEntry>>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn append(&self, entry: &HistoryEntry) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.iter().any(|e| e.job_id == entry.job_id) {
            return Err(GeexError::DuplicateJobId { job_id: entry.job_id.to_string() });
        }
        entries.push(entry.clone());
        Ok(())
    }

    fn list_all(&self) -> Vec<HistoryEntry> {
        let mut entries = self.entries.read().unwrap_or_else(PoisonError::into_inner).clone();
        // Stable sort keeps insertion order among equal timestamps
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use geex_core::models::{DateWindow, Geometry, Satellite};
    use geex_core::JobBuilder;

    fn entry_at(minutes: i64) -> HistoryEntry {
        let request = JobBuilder::new(Satellite::Ndvi, DateWindow::full_years(2020, 2021))
            .geometry(Geometry::point(-1.29, 36.82))
            .build()
            .unwrap();
        let timestamp =
            Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap() + Duration::minutes(minutes);
        HistoryEntry::recorded_at(&request, None, timestamp)
    }

    #[test]
    fn test_list_newest_first() {
        let store = MemoryHistoryStore::new();
        let first = entry_at(0);
        let second = entry_at(10);
        store.append(&first).unwrap();
        store.append(&second).unwrap();

        let listed = store.list_all();
        assert_eq!(listed, vec![second, first]);
    }

    #[test]
    fn test_duplicate_rejected() {
        let store = MemoryHistoryStore::new();
        let entry = entry_at(0);
        store.append(&entry).unwrap();

        let err = store.append(&entry).unwrap_err();
        assert!(matches!(err, GeexError::DuplicateJobId { .. }));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_find_by_id() {
        let store = MemoryHistoryStore::new();
        let entry = entry_at(0);
        store.append(&entry).unwrap();

        assert_eq!(store.find_by_id(entry.job_id), Some(entry));
        assert!(store.find_by_id(geex_core::models::JobId::new()).is_none());
    }
}
