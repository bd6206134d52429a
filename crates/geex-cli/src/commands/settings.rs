//! Settings command implementation

use anyhow::{bail, Result};
use geex_core::config::set_value;
use geex_core::models::Settings;

use super::AppContext;
use crate::cli::{SettingsArgs, SettingsCommand};
use crate::output::OutputWriter;
use crate::output_types::SettingRow;

pub fn execute(args: SettingsArgs, app: &AppContext, output: &OutputWriter) -> Result<()> {
    match args.command {
        SettingsCommand::Show => show(app, output),
        SettingsCommand::Set { key, value } => set(app, &key, &value, output),
        SettingsCommand::Init { force } => init(app, force, output),
    }
}

fn show(app: &AppContext, output: &OutputWriter) -> Result<()> {
    let layered = app.layered()?;

    output.section("Settings");
    output.kv(
        "File",
        format!(
            "{}{}",
            app.store.path().display(),
            if app.store.exists() { "" } else { " (not created yet)" }
        ),
    );

    let rows: Vec<SettingRow> = layered
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| SettingRow { key, value, source })
        .collect();
    output.table(rows)
}

fn set(app: &AppContext, key: &str, value: &str, output: &OutputWriter) -> Result<()> {
    // Only the file layer is edited; environment values are not persisted
    let mut settings = app.store.load()?;
    set_value(&mut settings, key, value)?;
    app.store.save(&settings)?;

    output.success(format!("Set {} in {}", key, app.store.path().display()));
    output.result(serde_json::json!({
        "key": key,
        "value": value,
        "path": app.store.path().display().to_string(),
    }))
}

fn init(app: &AppContext, force: bool, output: &OutputWriter) -> Result<()> {
    if app.store.exists() && !force {
        bail!(
            "{} already exists. Use --force to overwrite it.",
            app.store.path().display()
        );
    }

    app.store.save(&Settings::default())?;

    output.success(format!("Wrote default settings to {}", app.store.path().display()));
    output.info("Set your Earth Engine project with 'geex settings set gee.project_id <id>'");
    output.result(serde_json::json!({ "path": app.store.path().display().to_string() }))
}
