//! Job request assembly and validation.
//!
//! The builder performs no I/O. Submitting the request and recording it in
//! history is left to the caller (see [`crate::submit`]).

use crate::error::{GeexError, Result};
use crate::models::{
    DateWindow, ExportMethod, Geometry, JobId, JobRequest, Reducer, Satellite, Settings,
    DEFAULT_DRIVE_FOLDER,
};

/// Fluent builder for [`JobRequest`].
///
/// Checks run in a fixed order and the first violation is returned:
/// band requirement, band names, date window, geometry.
#[derive(Debug, Clone)]
pub struct JobBuilder {
    satellite: Satellite,
    bands: Vec<String>,
    geometry: Option<Geometry>,
    geometry_source: Option<String>,
    date_window: DateWindow,
    export_method: ExportMethod,
    reducer: Reducer,
    task_name: Option<String>,
    drive_folder: String,
}

impl JobBuilder {
    pub fn new(satellite: Satellite, date_window: DateWindow) -> Self {
        Self {
            satellite,
            bands: Vec::new(),
            geometry: None,
            geometry_source: None,
            date_window,
            export_method: ExportMethod::default(),
            reducer: Reducer::default(),
            task_name: None,
            drive_folder: DEFAULT_DRIVE_FOLDER.to_string(),
        }
    }

    /// Start from the user's saved defaults
    pub fn from_settings(settings: &Settings, date_window: DateWindow) -> Self {
        let mut builder = Self::new(settings.default_satellite, date_window)
            .export_method(settings.default_export_method)
            .reducer(settings.default_reducer);
        if !settings.drive_folder.trim().is_empty() {
            builder.drive_folder = settings.drive_folder.clone();
        }
        builder
    }

    pub fn satellite(mut self, satellite: Satellite) -> Self {
        self.satellite = satellite;
        self
    }

    pub fn bands<I, S>(mut self, bands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bands = bands.into_iter().map(Into::into).collect();
        self
    }

    pub fn geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Note on where the geometry came from, kept in history
    pub fn geometry_source(mut self, description: impl Into<String>) -> Self {
        self.geometry_source = Some(description.into());
        self
    }

    pub fn date_window(mut self, date_window: DateWindow) -> Self {
        self.date_window = date_window;
        self
    }

    pub fn export_method(mut self, export_method: ExportMethod) -> Self {
        self.export_method = export_method;
        self
    }

    pub fn reducer(mut self, reducer: Reducer) -> Self {
        self.reducer = reducer;
        self
    }

    pub fn task_name(mut self, task_name: impl Into<String>) -> Self {
        self.task_name = Some(task_name.into());
        self
    }

    pub fn drive_folder(mut self, folder: impl Into<String>) -> Self {
        self.drive_folder = folder.into();
        self
    }

    pub fn build(self) -> Result<JobRequest> {
        let satellite = self.satellite;

        if satellite.requires_band_selection() && self.bands.is_empty() {
            return Err(GeexError::MissingBandSelection { satellite });
        }

        let resolved = if self.bands.is_empty() {
            satellite.fixed_bands().iter().collect::<Vec<_>>()
        } else {
            satellite.resolve_bands(&self.bands)?
        };
        let bands: Vec<String> = resolved.iter().map(|band| band.name.to_string()).collect();

        self.date_window.validate()?;

        let geometry = self.geometry.ok_or_else(|| GeexError::InvalidGeometry {
            reason: "no region of interest was supplied".to_string(),
        })?;
        geometry.validate()?;

        let task_name = match self.task_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => default_task_name(satellite, &self.date_window),
        };

        let drive_folder = match self.export_method {
            ExportMethod::Drive => Some(self.drive_folder),
            ExportMethod::Local => None,
        };

        let geometry_source = self.geometry_source.unwrap_or_else(|| describe_geometry(&geometry));

        let request = JobRequest {
            job_id: JobId::new(),
            satellite,
            bands,
            geometry,
            date_window: self.date_window,
            export_method: self.export_method,
            reducer: self.reducer,
            task_name,
            drive_folder,
            geometry_source,
        };

        tracing::debug!(
            job_id = %request.job_id,
            satellite = %satellite,
            bands = ?request.bands,
            "Built job request"
        );

        Ok(request)
    }
}

/// Build a request from the five primary inputs with default reducer,
/// task name and drive folder.
pub fn build<S: AsRef<str>>(
    satellite: Satellite,
    bands: &[S],
    geometry: Option<Geometry>,
    date_window: DateWindow,
    export_method: ExportMethod,
) -> Result<JobRequest> {
    let mut builder = JobBuilder::new(satellite, date_window)
        .bands(bands.iter().map(|b| b.as_ref().to_string()))
        .export_method(export_method);
    builder.geometry = geometry;
    builder.build()
}

/// `{SATELLITE}_{startYear}_{endYear}_timeseries`
pub fn default_task_name(satellite: Satellite, window: &DateWindow) -> String {
    format!("{}_{}_{}_timeseries", satellite.id(), window.start_year, window.end_year)
}

fn describe_geometry(geometry: &Geometry) -> String {
    match geometry {
        Geometry::Point(p) => format!("Point ({:.5}, {:.5})", p.lat, p.lon),
        Geometry::Polygon(poly) => format!("Polygon ({} vertices)", poly.exterior().len()),
        Geometry::MultiPolygon { polygons } => format!("MultiPolygon ({} parts)", polygons.len()),
    }
}
