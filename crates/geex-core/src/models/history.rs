use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::job::{ExportMethod, JobId, JobRequest, Reducer};
use super::satellite::Satellite;
use super::window::DateWindow;

/// Record of a submitted job.
///
/// Entries are written once and never edited. The full geometry is not
/// kept, only the description of where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// When the job was accepted
    pub timestamp: DateTime<Utc>,

    pub job_id: JobId,

    pub satellite: Satellite,

    /// Band names in selection order
    pub bands: Vec<String>,

    pub geometry_source_description: String,

    pub date_window: DateWindow,

    pub export_method: ExportMethod,

    #[serde(default)]
    pub reducer: Reducer,

    #[serde(default)]
    pub task_name: String,

    /// Identifier the processing service returned, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

impl HistoryEntry {
    /// Entry for a request accepted now
    pub fn from_request(request: &JobRequest, task_id: Option<String>) -> Self {
        Self::recorded_at(request, task_id, Utc::now())
    }

    pub fn recorded_at(
        request: &JobRequest,
        task_id: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp,
            job_id: request.job_id(),
            satellite: request.satellite(),
            bands: request.bands().to_vec(),
            geometry_source_description: request.geometry_source().to_string(),
            date_window: request.date_window(),
            export_method: request.export_method(),
            reducer: request.reducer(),
            task_name: request.task_name().to_string(),
            task_id,
        }
    }
}
