//! Hand a built request to the processing service and record it.

use crate::error::{GeexError, Result};
use crate::models::{HistoryEntry, JobRequest};
use crate::ports::{HistoryStore, TaskSubmitter};

/// Outcome of an accepted submission
#[derive(Debug)]
pub struct SubmissionReceipt {
    /// Identifier assigned by the processing service
    pub task_id: String,

    /// Entry that was (or should have been) appended to history
    pub entry: HistoryEntry,

    /// Set when the job was accepted but recording it failed
    pub history_error: Option<GeexError>,
}

impl SubmissionReceipt {
    pub fn recorded(&self) -> bool {
        self.history_error.is_none()
    }
}

/// Submit `request` once and, when accepted, append it to history.
///
/// A rejected submission is returned as an error and nothing is recorded.
/// A history failure after acceptance does not undo the submission; it is
/// reported on the receipt instead.
pub fn submit_and_record<S, H>(
    request: &JobRequest,
    submitter: &S,
    history: &H,
) -> Result<SubmissionReceipt>
where
    S: TaskSubmitter + ?Sized,
    H: HistoryStore + ?Sized,
{
    let task_id = submitter.submit(request)?;
    tracing::info!(job_id = %request.job_id(), task_id = %task_id, "Job accepted");

    let entry = HistoryEntry::from_request(request, Some(task_id.clone()));
    let history_error = match history.append(&entry) {
        Ok(()) => None,
        Err(e) => {
            tracing::warn!(job_id = %request.job_id(), "Job accepted but not recorded: {}", e);
            Some(e)
        }
    };

    Ok(SubmissionReceipt { task_id, entry, history_error })
}
