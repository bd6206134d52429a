//! TOML-backed settings document.

use serde::Deserialize;
use std::fmt::Display;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{GeexError, Result};
use crate::fsutil::write_atomic;
use crate::models::Settings;

/// Default settings location, relative to the working directory
pub const DEFAULT_SETTINGS_PATH: &str = "config/settings.toml";

/// Settings file as written on disk.
///
/// Enum values are kept as strings here so an unknown value can fall back
/// to its default instead of failing the whole load.
#[derive(Debug, Default, Deserialize)]
pub struct SettingsDocument {
    #[serde(default)]
    pub gee: GeeSection,
    #[serde(default)]
    pub paths: PathsSection,
    #[serde(default)]
    pub defaults: DefaultsSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeeSection {
    pub project_id: Option<String>,
    pub drive_folder: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PathsSection {
    pub download_folder_local: Option<PathBuf>,
    pub cache_folder: Option<PathBuf>,
}

/// Values stay untyped so a number or table where a name belongs falls
/// back like any other unrecognised value.
#[derive(Debug, Default, Deserialize)]
pub struct DefaultsSection {
    pub default_satellite: Option<toml::Value>,
    pub default_export_method: Option<toml::Value>,
    pub default_reducer: Option<toml::Value>,
}

impl SettingsDocument {
    /// Overlay the values present in the document onto `settings`
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(project_id) = &self.gee.project_id {
            settings.project_id = project_id.clone();
        }
        if let Some(folder) = &self.gee.drive_folder {
            settings.drive_folder = folder.clone();
        }
        if let Some(path) = &self.paths.download_folder_local {
            settings.local_download_path = path.clone();
        }
        if let Some(path) = &self.paths.cache_folder {
            settings.cache_folder_path = path.clone();
        }
        if let Some(satellite) =
            value_or_warn("defaults.default_satellite", self.defaults.default_satellite.as_ref())
        {
            settings.default_satellite = satellite;
        }
        if let Some(method) = value_or_warn(
            "defaults.default_export_method",
            self.defaults.default_export_method.as_ref(),
        ) {
            settings.default_export_method = method;
        }
        if let Some(reducer) =
            value_or_warn("defaults.default_reducer", self.defaults.default_reducer.as_ref())
        {
            settings.default_reducer = reducer;
        }
    }
}

/// Parse an optional enum value, logging and discarding anything unrecognised
pub(crate) fn parse_or_warn<T>(key: &str, raw: Option<&str>) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = raw?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Ignoring {} = '{}': {}. Using the default instead", key, raw, e);
            None
        }
    }
}

/// [`parse_or_warn`] for a document value; non-string values are discarded too
pub(crate) fn value_or_warn<T>(key: &str, raw: Option<&toml::Value>) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    match raw? {
        toml::Value::String(name) => parse_or_warn(key, Some(name)),
        other => {
            tracing::warn!(
                "Ignoring {} = {}: expected a string. Using the default instead",
                key,
                other
            );
            None
        }
    }
}

/// Reads and writes the settings document at a fixed path
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at [`DEFAULT_SETTINGS_PATH`]
    pub fn default_location() -> Self {
        Self::new(DEFAULT_SETTINGS_PATH)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Parsed document, or `None` when the file does not exist
    pub fn read_document(&self) -> Result<Option<SettingsDocument>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(GeexError::ConfigCorrupt {
                    path: self.path.clone(),
                    reason: format!("unreadable: {}", e),
                })
            }
        };

        toml::from_str(&content).map(Some).map_err(|e| GeexError::ConfigCorrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Load settings, falling back to defaults when the file is missing.
    ///
    /// Paths come back in absolute form.
    pub fn load(&self) -> Result<Settings> {
        let mut settings = Settings::default();
        match self.read_document()? {
            Some(document) => document.apply_to(&mut settings),
            None => tracing::debug!(
                "No settings file at {}, using defaults",
                self.path.display()
            ),
        }
        Ok(settings.with_absolute_paths())
    }

    /// Write the full settings document atomically.
    ///
    /// On failure the file on disk is left as it was.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        let content = render_settings(settings);
        write_atomic(&self.path, content.as_bytes()).map_err(|source| {
            GeexError::ConfigWrite { path: self.path.clone(), source }
        })?;
        tracing::info!("Saved settings to {}", self.path.display());
        Ok(())
    }
}

/// Render settings as a commented TOML document
pub fn render_settings(settings: &Settings) -> String {
    format!(
        r#"# geex settings
#
# Written by `geex settings`. Safe to edit by hand; unrecognised values
# fall back to the built-in defaults when loaded.

[gee]
# Google Earth Engine cloud project id
project_id = {project_id}
# Drive folder that receives Drive exports
drive_folder = {drive_folder}

[paths]
# Where local exports are downloaded
download_folder_local = {download}
# Job history and other cached state
cache_folder = {cache}

[defaults]
# Satellite product preselected for new jobs
# Options: "NDVI", "ERA5", "CHIRPS"
default_satellite = {satellite}
# Options: "Drive", "Local"
default_export_method = {export}
# Options: "mean", "sum", "max", "min", "median", "first"
default_reducer = {reducer}
"#,
        project_id = quote(&settings.project_id),
        drive_folder = quote(&settings.drive_folder),
        download = quote(&settings.local_download_path.display().to_string()),
        cache = quote(&settings.cache_folder_path.display().to_string()),
        satellite = quote(settings.default_satellite.id()),
        export = quote(settings.default_export_method.as_str()),
        reducer = quote(settings.default_reducer.as_str()),
    )
}

fn quote(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExportMethod, Reducer, Satellite};

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.toml"));

        let settings = store.load().unwrap();

        let expected = Settings::default().with_absolute_paths();
        assert_eq!(settings, expected);
    }

    #[test]
    fn test_unparseable_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[gee\nproject_id = ").unwrap();

        let err = SettingsStore::new(&path).load().unwrap_err();
        assert!(matches!(err, GeexError::ConfigCorrupt { .. }));
    }

    #[test]
    fn test_unknown_enum_values_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(
            &path,
            r#"
[gee]
project_id = "my-project"

[defaults]
default_satellite = "LANDSAT"
default_export_method = "Local"
default_reducer = "mode"
"#,
        )
        .unwrap();

        let settings = SettingsStore::new(&path).load().unwrap();
        assert_eq!(settings.project_id, "my-project");
        assert_eq!(settings.default_satellite, Satellite::Ndvi);
        assert_eq!(settings.default_export_method, ExportMethod::Local);
        assert_eq!(settings.default_reducer, Reducer::Mean);
    }

    #[test]
    fn test_wrongly_typed_enum_values_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(
            &path,
            r#"
[defaults]
default_satellite = 5
default_export_method = true
default_reducer = ["max"]
"#,
        )
        .unwrap();

        let settings = SettingsStore::new(&path).load().unwrap();
        assert_eq!(settings.default_satellite, Satellite::Ndvi);
        assert_eq!(settings.default_export_method, ExportMethod::Drive);
        assert_eq!(settings.default_reducer, Reducer::Mean);
    }

    #[test]
    fn test_relative_paths_made_absolute() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[paths]\ncache_folder = \"state/cache\"\n").unwrap();

        let settings = SettingsStore::new(&path).load().unwrap();
        assert!(settings.cache_folder_path.is_absolute());
        assert!(settings.cache_folder_path.ends_with("state/cache"));
    }

    #[test]
    fn test_rendered_document_is_commented_and_escaped() {
        let settings = Settings {
            project_id: "quote\"and\\slash".to_string(),
            ..Settings::default()
        };
        let rendered = render_settings(&settings);

        assert!(rendered.contains("# Google Earth Engine cloud project id"));
        let document: SettingsDocument = toml::from_str(&rendered).unwrap();
        assert_eq!(document.gee.project_id.as_deref(), Some("quote\"and\\slash"));
    }

    #[test]
    fn test_save_failure_reports_config_write() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the parent directory should be
        let blocker = dir.path().join("config");
        fs::write(&blocker, "").unwrap();
        let store = SettingsStore::new(blocker.join("settings.toml"));

        let err = store.save(&Settings::default()).unwrap_err();
        assert!(matches!(err, GeexError::ConfigWrite { .. }));
    }
}
