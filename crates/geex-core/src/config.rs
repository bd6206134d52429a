pub mod store;

pub use store::{render_settings, SettingsDocument, SettingsStore, DEFAULT_SETTINGS_PATH};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

use crate::error::{GeexError, Result};
use crate::models::settings::absolute_or_keep;
use crate::models::{ExportMethod, Reducer, Satellite, Settings};
use store::{parse_or_warn, value_or_warn};

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from the settings file
    File,
    /// Loaded from environment variable
    Environment,
    /// Explicit override from the UI or command line
    Override,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Override => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

pub const ENV_PROJECT_ID: &str = "GEEX_PROJECT_ID";
pub const ENV_DOWNLOAD_DIR: &str = "GEEX_DOWNLOAD_DIR";
pub const ENV_CACHE_DIR: &str = "GEEX_CACHE_DIR";
pub const ENV_DEFAULT_SATELLITE: &str = "GEEX_DEFAULT_SATELLITE";
pub const ENV_DEFAULT_EXPORT: &str = "GEEX_DEFAULT_EXPORT";

/// Settings resolved from defaults, the settings file, environment and
/// explicit overrides, in increasing precedence.
#[derive(Debug, Clone)]
pub struct LayeredSettings {
    pub project_id: ConfigValue<String>,
    pub drive_folder: ConfigValue<String>,
    pub local_download_path: ConfigValue<PathBuf>,
    pub cache_folder_path: ConfigValue<PathBuf>,
    pub default_satellite: ConfigValue<Satellite>,
    pub default_export_method: ConfigValue<ExportMethod>,
    pub default_reducer: ConfigValue<Reducer>,
}

impl LayeredSettings {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        let defaults = Settings::default();
        Self {
            project_id: ConfigValue::new(defaults.project_id, ConfigSource::Default),
            drive_folder: ConfigValue::new(defaults.drive_folder, ConfigSource::Default),
            local_download_path: ConfigValue::new(
                defaults.local_download_path,
                ConfigSource::Default,
            ),
            cache_folder_path: ConfigValue::new(defaults.cache_folder_path, ConfigSource::Default),
            default_satellite: ConfigValue::new(defaults.default_satellite, ConfigSource::Default),
            default_export_method: ConfigValue::new(
                defaults.default_export_method,
                ConfigSource::Default,
            ),
            default_reducer: ConfigValue::new(defaults.default_reducer, ConfigSource::Default),
        }
    }

    /// Layer in the settings file, if it exists
    pub fn load_from_store(mut self, store: &SettingsStore) -> Result<Self> {
        let Some(document) = store.read_document()? else {
            return Ok(self);
        };

        if let Some(project_id) = document.gee.project_id {
            self.project_id.update(project_id, ConfigSource::File);
        }
        if let Some(folder) = document.gee.drive_folder {
            self.drive_folder.update(folder, ConfigSource::File);
        }
        if let Some(path) = document.paths.download_folder_local {
            self.local_download_path.update(path, ConfigSource::File);
        }
        if let Some(path) = document.paths.cache_folder {
            self.cache_folder_path.update(path, ConfigSource::File);
        }
        if let Some(satellite) = value_or_warn(
            "defaults.default_satellite",
            document.defaults.default_satellite.as_ref(),
        ) {
            self.default_satellite.update(satellite, ConfigSource::File);
        }
        if let Some(method) = value_or_warn(
            "defaults.default_export_method",
            document.defaults.default_export_method.as_ref(),
        ) {
            self.default_export_method.update(method, ConfigSource::File);
        }
        if let Some(reducer) = value_or_warn(
            "defaults.default_reducer",
            document.defaults.default_reducer.as_ref(),
        ) {
            self.default_reducer.update(reducer, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        if let Ok(project_id) = env::var(ENV_PROJECT_ID) {
            self.project_id.update(project_id, ConfigSource::Environment);
        }

        if let Ok(dir) = env::var(ENV_DOWNLOAD_DIR) {
            self.local_download_path.update(PathBuf::from(dir), ConfigSource::Environment);
        }

        if let Ok(dir) = env::var(ENV_CACHE_DIR) {
            self.cache_folder_path.update(PathBuf::from(dir), ConfigSource::Environment);
        }

        if let Ok(raw) = env::var(ENV_DEFAULT_SATELLITE) {
            if let Some(satellite) = parse_or_warn(ENV_DEFAULT_SATELLITE, Some(raw.as_str())) {
                self.default_satellite.update(satellite, ConfigSource::Environment);
            }
        }

        if let Ok(raw) = env::var(ENV_DEFAULT_EXPORT) {
            if let Some(method) = parse_or_warn(ENV_DEFAULT_EXPORT, Some(raw.as_str())) {
                self.default_export_method.update(method, ConfigSource::Environment);
            }
        }

        self
    }

    /// Apply explicit overrides
    pub fn apply_overrides(&mut self, overrides: SettingsOverrides) {
        if let Some(project_id) = overrides.project_id {
            self.project_id.update(project_id, ConfigSource::Override);
        }
        if let Some(path) = overrides.local_download_path {
            self.local_download_path.update(path, ConfigSource::Override);
        }
        if let Some(path) = overrides.cache_folder_path {
            self.cache_folder_path.update(path, ConfigSource::Override);
        }
        if let Some(satellite) = overrides.default_satellite {
            self.default_satellite.update(satellite, ConfigSource::Override);
        }
        if let Some(method) = overrides.default_export_method {
            self.default_export_method.update(method, ConfigSource::Override);
        }
    }

    /// Flatten into a plain [`Settings`] value with absolute paths
    pub fn resolve(&self) -> Settings {
        Settings {
            project_id: self.project_id.value.clone(),
            drive_folder: self.drive_folder.value.clone(),
            local_download_path: self.local_download_path.value.clone(),
            cache_folder_path: self.cache_folder_path.value.clone(),
            default_satellite: self.default_satellite.value,
            default_export_method: self.default_export_method.value,
            default_reducer: self.default_reducer.value,
        }
        .with_absolute_paths()
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> BTreeMap<String, (String, ConfigSource)> {
        let mut map = BTreeMap::new();

        map.insert(
            "gee.project_id".to_string(),
            (self.project_id.value.clone(), self.project_id.source),
        );
        map.insert(
            "gee.drive_folder".to_string(),
            (self.drive_folder.value.clone(), self.drive_folder.source),
        );
        map.insert(
            "paths.download_folder_local".to_string(),
            (
                absolute_or_keep(&self.local_download_path.value).display().to_string(),
                self.local_download_path.source,
            ),
        );
        map.insert(
            "paths.cache_folder".to_string(),
            (
                absolute_or_keep(&self.cache_folder_path.value).display().to_string(),
                self.cache_folder_path.source,
            ),
        );
        map.insert(
            "defaults.default_satellite".to_string(),
            (self.default_satellite.value.to_string(), self.default_satellite.source),
        );
        map.insert(
            "defaults.default_export_method".to_string(),
            (self.default_export_method.value.to_string(), self.default_export_method.source),
        );
        map.insert(
            "defaults.default_reducer".to_string(),
            (self.default_reducer.value.to_string(), self.default_reducer.source),
        );

        map
    }
}

/// Explicit overrides from the UI or command line
#[derive(Debug, Default)]
pub struct SettingsOverrides {
    pub project_id: Option<String>,
    pub local_download_path: Option<PathBuf>,
    pub cache_folder_path: Option<PathBuf>,
    pub default_satellite: Option<Satellite>,
    pub default_export_method: Option<ExportMethod>,
}

/// Keys accepted by [`set_value`], in document order
pub const SETTING_KEYS: [&str; 7] = [
    "gee.project_id",
    "gee.drive_folder",
    "paths.download_folder_local",
    "paths.cache_folder",
    "defaults.default_satellite",
    "defaults.default_export_method",
    "defaults.default_reducer",
];

/// Set one field by its dotted document key.
///
/// Unlike loading, an unrecognised value is an error here: the user typed
/// it just now and should hear about it.
pub fn set_value(settings: &mut Settings, key: &str, value: &str) -> Result<()> {
    match key {
        "gee.project_id" => settings.project_id = value.trim().to_string(),
        "gee.drive_folder" => settings.drive_folder = value.trim().to_string(),
        "paths.download_folder_local" => {
            settings.local_download_path = absolute_or_keep(&PathBuf::from(value.trim()))
        }
        "paths.cache_folder" => {
            settings.cache_folder_path = absolute_or_keep(&PathBuf::from(value.trim()))
        }
        "defaults.default_satellite" => settings.default_satellite = value.parse()?,
        "defaults.default_export_method" => settings.default_export_method = value.parse()?,
        "defaults.default_reducer" => settings.default_reducer = value.parse()?,
        _ => {
            return Err(GeexError::ConfigInvalid {
                key: key.to_string(),
                reason: format!("Unknown setting. Valid keys: {}", SETTING_KEYS.join(", ")),
            })
        }
    }
    Ok(())
}
