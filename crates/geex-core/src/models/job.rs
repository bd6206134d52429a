use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::geometry::Geometry;
use super::satellite::Satellite;
use super::window::DateWindow;
use crate::error::{GeexError, Result};

/// Unique identifier for a job, generated when the request is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for JobId {
    type Err = GeexError;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim()).map(JobId).map_err(|e| GeexError::ConfigInvalid {
            key: "job_id".to_string(),
            reason: e.to_string(),
        })
    }
}

/// Where the processing service delivers results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ExportMethod {
    #[default]
    Drive,
    Local,
}

impl ExportMethod {
    pub const ALL: [ExportMethod; 2] = [ExportMethod::Drive, ExportMethod::Local];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportMethod::Drive => "Drive",
            ExportMethod::Local => "Local",
        }
    }
}

impl fmt::Display for ExportMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportMethod {
    type Err = GeexError;

    fn from_str(s: &str) -> Result<Self> {
        ExportMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GeexError::ConfigInvalid {
                key: "export_method".to_string(),
                reason: format!("Unknown export method: {}. Use Drive or Local", s),
            })
    }
}

/// Temporal reducer applied per time step over the region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Reducer {
    #[default]
    Mean,
    Sum,
    Max,
    Min,
    Median,
    First,
}

impl Reducer {
    pub const ALL: [Reducer; 6] = [
        Reducer::Mean,
        Reducer::Sum,
        Reducer::Max,
        Reducer::Min,
        Reducer::Median,
        Reducer::First,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Reducer::Mean => "mean",
            Reducer::Sum => "sum",
            Reducer::Max => "max",
            Reducer::Min => "min",
            Reducer::Median => "median",
            Reducer::First => "first",
        }
    }
}

impl fmt::Display for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Reducer {
    type Err = GeexError;

    fn from_str(s: &str) -> Result<Self> {
        Reducer::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GeexError::ConfigInvalid {
                key: "reducer".to_string(),
                reason: format!(
                    "Unknown reducer: {}. Use mean, sum, max, min, median, or first",
                    s
                ),
            })
    }
}

/// Fully validated extraction job, ready for the processing service.
///
/// Only [`crate::builder::JobBuilder`] constructs these, so every instance
/// has passed band, date window and geometry validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRequest {
    pub(crate) job_id: JobId,
    pub(crate) satellite: Satellite,
    pub(crate) bands: Vec<String>,
    pub(crate) geometry: Geometry,
    pub(crate) date_window: DateWindow,
    pub(crate) export_method: ExportMethod,
    pub(crate) reducer: Reducer,
    pub(crate) task_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) drive_folder: Option<String>,
    pub(crate) geometry_source: String,
}

impl JobRequest {
    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    pub fn satellite(&self) -> Satellite {
        self.satellite
    }

    /// Canonical user-facing band names, in selection order
    pub fn bands(&self) -> &[String] {
        &self.bands
    }

    /// Band identifiers as the processing service names them
    pub fn provider_bands(&self) -> Vec<&'static str> {
        self.bands
            .iter()
            .filter_map(|name| self.satellite.resolve_band(name))
            .map(|band| band.provider_id)
            .collect()
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn date_window(&self) -> DateWindow {
        self.date_window
    }

    pub fn export_method(&self) -> ExportMethod {
        self.export_method
    }

    pub fn reducer(&self) -> Reducer {
        self.reducer
    }

    pub fn task_name(&self) -> &str {
        &self.task_name
    }

    /// Destination folder, only set for Drive exports
    pub fn drive_folder(&self) -> Option<&str> {
        self.drive_folder.as_deref()
    }

    /// Human-readable note on where the geometry came from
    pub fn geometry_source(&self) -> &str {
        &self.geometry_source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_id_roundtrip() {
        let id = JobId::new();
        let parsed: JobId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-uuid".parse::<JobId>().is_err());
    }

    #[test]
    fn test_job_ids_are_unique() {
        assert_ne!(JobId::new(), JobId::new());
    }

    #[test]
    fn test_export_method_parse() {
        assert_eq!("drive".parse::<ExportMethod>().unwrap(), ExportMethod::Drive);
        assert_eq!("LOCAL".parse::<ExportMethod>().unwrap(), ExportMethod::Local);
        assert!("s3".parse::<ExportMethod>().is_err());
    }

    #[test]
    fn test_reducer_serde() {
        assert_eq!(serde_json::to_string(&Reducer::Median).unwrap(), "\"median\"");
        assert_eq!("MAX".parse::<Reducer>().unwrap(), Reducer::Max);
        assert!("mode".parse::<Reducer>().is_err());
    }
}
