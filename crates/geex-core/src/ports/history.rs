use crate::error::Result;
use crate::models::{HistoryEntry, JobId};

/// Port for the job history log.
///
/// History is a convenience record, not a source of truth: reads never fail,
/// they return whatever could be recovered (possibly nothing).
pub trait HistoryStore {
    /// Append an entry; job ids must not repeat
    fn append(&self, entry: &HistoryEntry) -> Result<()>;

    /// All entries, most recent first
    fn list_all(&self) -> Vec<HistoryEntry>;

    /// Look up one entry by job id
    fn find_by_id(&self, job_id: JobId) -> Option<HistoryEntry> {
        self.list_all().into_iter().find(|entry| entry.job_id == job_id)
    }
}
