//! Error types for geex

use std::path::PathBuf;
use thiserror::Error;

use crate::models::Satellite;

#[derive(Debug, Error)]
pub enum GeexError {
    // Settings errors
    #[error("Settings file {path} is corrupt: {reason}")]
    ConfigCorrupt { path: PathBuf, reason: String },

    #[error("Failed to write settings to {path}: {source}")]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // History errors
    #[error("Failed to write job history to {path}: {source}")]
    HistoryWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Job id {job_id} is already recorded in history")]
    DuplicateJobId { job_id: String },

    // Region of interest errors
    #[error("Invalid coordinate ({lat}, {lon}): latitude must be in [-90, 90] and longitude in [-180, 180]")]
    InvalidCoordinate { lat: f64, lon: f64 },

    #[error("Unsupported geometry: expected Polygon or MultiPolygon, found {found}")]
    UnsupportedGeometry { found: String },

    #[error("No administrative boundary found for {}", describe_boundary(.country, .region.as_deref()))]
    BoundaryNotFound {
        country: String,
        region: Option<String>,
    },

    #[error("Invalid geometry: {reason}")]
    InvalidGeometry { reason: String },

    #[error("Unsupported vector format: {extension}. Supported: {}", .supported.join(", "))]
    UnsupportedFormat {
        extension: String,
        supported: Vec<String>,
    },

    #[error("{format} error: {message}")]
    FormatError { format: String, message: String },

    #[error("Cannot reproject from EPSG:{from_epsg} to WGS84: {reason}")]
    Reprojection { from_epsg: u32, reason: String },

    // Job request errors
    #[error("{satellite} requires at least one band to be selected")]
    MissingBandSelection { satellite: Satellite },

    #[error("Unknown band '{band}' for {satellite}")]
    UnknownBand { satellite: Satellite, band: String },

    #[error("Invalid date range: {reason}")]
    InvalidDateRange { reason: String },

    // Submission errors
    #[error("Task submission rejected: {reason}")]
    SubmissionRejected { reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl GeexError {
    /// True for errors the user fixes by correcting input and resubmitting.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            GeexError::InvalidCoordinate { .. }
                | GeexError::UnsupportedGeometry { .. }
                | GeexError::BoundaryNotFound { .. }
                | GeexError::InvalidGeometry { .. }
                | GeexError::UnsupportedFormat { .. }
                | GeexError::MissingBandSelection { .. }
                | GeexError::UnknownBand { .. }
                | GeexError::InvalidDateRange { .. }
        )
    }
}

fn describe_boundary(country: &str, region: Option<&str>) -> String {
    match region {
        Some(region) => format!("{} / {}", country, region),
        None => country.to_string(),
    }
}

pub type Result<T> = std::result::Result<T, GeexError>;
