use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::job::{ExportMethod, Reducer};
use super::satellite::Satellite;

/// File name of the history document inside the cache folder
pub const HISTORY_FILE_NAME: &str = "history.json";

/// Drive folder used when none is configured
pub const DEFAULT_DRIVE_FOLDER: &str = "GEE_Exports";

/// Process-wide settings.
///
/// Loaded once at startup and passed explicitly to whatever needs it; saved
/// back through [`crate::config::SettingsStore`] when the user changes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Earth Engine cloud project
    pub project_id: String,

    /// Drive folder for Drive exports
    pub drive_folder: String,

    /// Where local exports are written
    pub local_download_path: PathBuf,

    /// Where job history and other cached state live
    pub cache_folder_path: PathBuf,

    pub default_satellite: Satellite,

    pub default_export_method: ExportMethod,

    pub default_reducer: Reducer,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            drive_folder: DEFAULT_DRIVE_FOLDER.to_string(),
            local_download_path: PathBuf::from("./downloads"),
            cache_folder_path: PathBuf::from("./.cache"),
            default_satellite: Satellite::default(),
            default_export_method: ExportMethod::default(),
            default_reducer: Reducer::default(),
        }
    }
}

impl Settings {
    /// Location of the history document
    pub fn history_path(&self) -> PathBuf {
        self.cache_folder_path.join(HISTORY_FILE_NAME)
    }

    /// Rewrite both folders as absolute paths against the current directory.
    pub fn with_absolute_paths(mut self) -> Self {
        self.local_download_path = absolute_or_keep(&self.local_download_path);
        self.cache_folder_path = absolute_or_keep(&self.cache_folder_path);
        self
    }
}

/// Absolute form of `path`; an empty path is left untouched
pub fn absolute_or_keep(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
