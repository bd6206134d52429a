//! History command implementation

use anyhow::{Context, Result};
use geex_core::models::{HistoryEntry, JobId};
use geex_core::ports::HistoryStore;
use geex_store::JsonHistoryStore;

use super::AppContext;
use crate::cli::{HistoryArgs, HistoryCommand};
use crate::output::OutputWriter;
use crate::output_types::HistoryRow;

pub fn execute(args: HistoryArgs, app: &AppContext, output: &OutputWriter) -> Result<()> {
    let store = JsonHistoryStore::for_settings(&app.settings()?);

    match args.command {
        HistoryCommand::List { limit } => list(&store, limit, output),
        HistoryCommand::Show { job_id } => show(&store, &job_id, output),
    }
}

fn list(store: &JsonHistoryStore, limit: Option<usize>, output: &OutputWriter) -> Result<()> {
    let mut entries = store.list_all();
    if let Some(limit) = limit {
        entries.truncate(limit);
    }

    if output.is_json() {
        return output.result(&entries);
    }

    output.section(format!("Job history ({})", store.path().display()));
    output.table(entries.iter().map(HistoryRow::from).collect())
}

fn show(store: &JsonHistoryStore, job_id: &str, output: &OutputWriter) -> Result<()> {
    let job_id: JobId = job_id.parse()?;
    let entry = store
        .find_by_id(job_id)
        .with_context(|| format!("No job {} in {}", job_id, store.path().display()))?;

    if output.is_json() {
        return output.result(&entry);
    }
    print_entry(&entry, output);
    Ok(())
}

fn print_entry(entry: &HistoryEntry, output: &OutputWriter) {
    let window = entry.date_window;

    output.section(format!("Job {}", entry.job_id));
    output.kv("Submitted", entry.timestamp.format("%Y-%m-%d %H:%M:%S UTC"));
    output.kv("Satellite", format!("{} ({})", entry.satellite, entry.satellite.display_name()));
    output.kv("Bands", entry.bands.join(", "));
    output.kv("Region", &entry.geometry_source_description);
    output.kv("Years", format!("{} to {}", window.start_year, window.end_year));
    output.kv(
        "Season",
        if window.is_full_year() {
            "all year".to_string()
        } else {
            format!(
                "day {} to day {}{}",
                window.start_day_of_year,
                window.end_day_of_year,
                if window.crosses_year_boundary() { " (across New Year)" } else { "" }
            )
        },
    );
    output.kv("Export", entry.export_method.as_str());
    output.kv("Reducer", entry.reducer.as_str());
    if !entry.task_name.is_empty() {
        output.kv("Task name", &entry.task_name);
    }
    output.kv("Task id", entry.task_id.as_deref().unwrap_or("-"));
}
