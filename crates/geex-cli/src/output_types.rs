use geex_core::config::ConfigSource;
use geex_core::models::{Bounds, GeometryType, HistoryEntry, JobId, LatLon};
use serde::Serialize;
use tabled::Tabled;

/// One row of `settings show`
#[derive(Debug, Serialize, Tabled)]
pub struct SettingRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source", display_with = "display_source")]
    pub source: ConfigSource,
}

fn display_source(source: &ConfigSource) -> String {
    format!("{:?}", source).to_lowercase()
}

/// One row of `history list`
#[derive(Debug, Serialize, Tabled)]
pub struct HistoryRow {
    #[tabled(rename = "Submitted (UTC)")]
    pub timestamp: String,
    #[tabled(rename = "Job ID")]
    pub job_id: String,
    #[tabled(rename = "Satellite")]
    pub satellite: String,
    #[tabled(rename = "Bands")]
    pub bands: String,
    #[tabled(rename = "Years")]
    pub years: String,
    #[tabled(rename = "Season (DOY)")]
    pub season: String,
    #[tabled(rename = "Export")]
    pub export: String,
    #[tabled(rename = "Task")]
    pub task_id: String,
}

impl From<&HistoryEntry> for HistoryRow {
    fn from(entry: &HistoryEntry) -> Self {
        let window = entry.date_window;
        Self {
            timestamp: entry.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            job_id: entry.job_id.to_string(),
            satellite: entry.satellite.to_string(),
            bands: entry.bands.join(", "),
            years: format!("{}-{}", window.start_year, window.end_year),
            season: if window.is_full_year() {
                "all year".to_string()
            } else {
                format!("{}-{}", window.start_day_of_year, window.end_day_of_year)
            },
            export: entry.export_method.as_str().to_string(),
            task_id: entry.task_id.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Output for `roi inspect`
#[derive(Debug, Serialize)]
pub struct RoiOutput {
    pub source: String,
    pub geometry_type: GeometryType,
    pub vertex_count: usize,
    pub bounds: Option<Bounds>,
    pub centroid: Option<LatLon>,
    pub geojson: geojson::Geometry,
}

/// Output for `season check`
#[derive(Debug, Serialize)]
pub struct SeasonOutput {
    pub start_doy: u16,
    pub end_doy: u16,
    pub crosses_year_boundary: bool,
    pub doy_ranges: Vec<(u16, u16)>,
    pub day_of_year: Option<u16>,
    pub within_season: Option<bool>,
}

/// Output for `job submit` and `job record`
#[derive(Debug, Serialize)]
pub struct RecordOutput {
    pub job_id: JobId,
    pub task_id: Option<String>,
    pub recorded: bool,
    pub history_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_error: Option<String>,
}
