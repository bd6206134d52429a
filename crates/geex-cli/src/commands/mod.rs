//! Command implementations

mod history;
mod job;
mod roi;
mod season;
mod settings;

use std::path::PathBuf;

use anyhow::{Context, Result};
use geex_core::config::SettingsOverrides;
use geex_core::models::Settings;
use geex_core::{LayeredSettings, SettingsStore};

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;

/// Execute a CLI command
pub fn execute(cli: Cli, output: &OutputWriter) -> Result<()> {
    let app = AppContext {
        store: cli.settings.map(SettingsStore::new).unwrap_or_else(SettingsStore::default_location),
        project_id: cli.project_id,
        cache_dir: cli.cache_dir,
        download_dir: cli.download_dir,
    };

    match cli.command {
        Commands::Settings(args) => settings::execute(args, &app, output),
        Commands::History(args) => history::execute(args, &app, output),
        Commands::Season(args) => season::execute(args, output),
        Commands::Roi(args) => roi::execute(args, output),
        Commands::Job(args) => job::execute(args, &app, output),
    }
}

/// Settings location plus global overrides from the command line
pub struct AppContext {
    pub store: SettingsStore,
    project_id: Option<String>,
    cache_dir: Option<PathBuf>,
    download_dir: Option<PathBuf>,
}

impl AppContext {
    /// Defaults, settings file, environment and command-line overrides
    pub fn layered(&self) -> Result<LayeredSettings> {
        let mut layered = LayeredSettings::with_defaults()
            .load_from_store(&self.store)
            .with_context(|| format!("Failed to load {}", self.store.path().display()))?
            .load_from_env();

        layered.apply_overrides(SettingsOverrides {
            project_id: self.project_id.clone(),
            local_download_path: self.download_dir.clone(),
            cache_folder_path: self.cache_dir.clone(),
            ..SettingsOverrides::default()
        });
        Ok(layered)
    }

    pub fn settings(&self) -> Result<Settings> {
        Ok(self.layered()?.resolve())
    }
}
