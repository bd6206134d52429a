use crate::error::Result;
use crate::models::JobRequest;

/// Port for the remote processing service.
///
/// Called once per request. Returns the service's opaque task identifier,
/// or [`crate::GeexError::SubmissionRejected`] carrying the service's reason
/// verbatim. Retries and status polling are the service client's concern.
pub trait TaskSubmitter {
    fn submit(&self, request: &JobRequest) -> Result<String>;
}
