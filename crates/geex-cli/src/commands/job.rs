//! Job command implementation

use std::env;

use anyhow::{Context, Result};
use geex_core::models::{DateWindow, HistoryEntry, JobRequest, Settings};
use geex_core::ports::HistoryStore;
use geex_core::{submit_and_record, JobBuilder};
use geex_store::JsonHistoryStore;

use super::{roi, AppContext};
use crate::cli::{JobArgs, JobCommand, JobSpecArgs};
use crate::output::OutputWriter;
use crate::output_types::RecordOutput;
use crate::submitter::{ProcessSubmitter, RequestPayload, ENV_SUBMIT_COMMAND};

pub fn execute(args: JobArgs, app: &AppContext, output: &OutputWriter) -> Result<()> {
    let settings = app.settings()?;

    match args.command {
        JobCommand::Plan(spec) => plan(&spec, &settings, output),
        JobCommand::Submit { spec, submit_command } => {
            submit(&spec, submit_command, &settings, output)
        }
        JobCommand::Record { spec, task_id } => record(&spec, task_id, &settings, output),
    }
}

/// Build and validate a request from command-line arguments and settings
fn build_request(spec: &JobSpecArgs, settings: &Settings) -> Result<JobRequest> {
    let window = DateWindow::new(spec.start_year, spec.end_year, spec.start_doy, spec.end_doy);
    let (geometry, source) = roi::resolve(&spec.roi)?;

    let mut builder = JobBuilder::from_settings(settings, window)
        .bands(spec.bands.iter().map(|b| b.trim()).filter(|b| !b.is_empty()))
        .geometry(geometry)
        .geometry_source(source);
    if let Some(satellite) = spec.satellite {
        builder = builder.satellite(satellite);
    }
    if let Some(export) = spec.export {
        builder = builder.export_method(export);
    }
    if let Some(reducer) = spec.reducer {
        builder = builder.reducer(reducer);
    }
    if let Some(name) = &spec.task_name {
        builder = builder.task_name(name.clone());
    }

    Ok(builder.build()?)
}

fn plan(spec: &JobSpecArgs, settings: &Settings, output: &OutputWriter) -> Result<()> {
    let request = build_request(spec, settings)?;
    let payload = RequestPayload::new(&request, settings);

    if output.is_json() {
        return output.result(payload);
    }

    print_request(&request, &payload, output);
    output.success("Job is valid. Submit it with 'geex job submit' using the same arguments.");
    Ok(())
}

fn submit(
    spec: &JobSpecArgs,
    submit_command: Option<String>,
    settings: &Settings,
    output: &OutputWriter,
) -> Result<()> {
    let command = submit_command
        .or_else(|| env::var(ENV_SUBMIT_COMMAND).ok().filter(|c| !c.trim().is_empty()))
        .with_context(|| {
            format!("No submit command. Pass --submit-command or set {}", ENV_SUBMIT_COMMAND)
        })?;

    let request = build_request(spec, settings)?;
    let history = JsonHistoryStore::for_settings(settings);
    let submitter = ProcessSubmitter::new(command, settings);

    let receipt = submit_and_record(&request, &submitter, &history)?;
    if let Some(e) = &receipt.history_error {
        output.warning(format!("Job was submitted but not recorded in history: {}", e));
    }

    let result = RecordOutput {
        job_id: request.job_id(),
        task_id: Some(receipt.task_id.clone()),
        recorded: receipt.recorded(),
        history_path: history.path().display().to_string(),
        history_error: receipt.history_error.as_ref().map(|e| e.to_string()),
    };
    if output.is_json() {
        return output.result(result);
    }

    output.success(format!("Submitted job {} as task {}", result.job_id, receipt.task_id));
    Ok(())
}

fn record(
    spec: &JobSpecArgs,
    task_id: Option<String>,
    settings: &Settings,
    output: &OutputWriter,
) -> Result<()> {
    let request = build_request(spec, settings)?;
    let history = JsonHistoryStore::for_settings(settings);

    history.append(&HistoryEntry::from_request(&request, task_id.clone()))?;

    let result = RecordOutput {
        job_id: request.job_id(),
        task_id,
        recorded: true,
        history_path: history.path().display().to_string(),
        history_error: None,
    };
    if output.is_json() {
        return output.result(result);
    }

    output.success(format!("Recorded job {} in {}", result.job_id, result.history_path));
    Ok(())
}

fn print_request(request: &JobRequest, payload: &RequestPayload<'_>, output: &OutputWriter) {
    let window = request.date_window();

    output.section(format!("Job {}", request.job_id()));
    let satellite = request.satellite();
    output.kv("Satellite", format!("{} ({})", satellite, satellite.display_name()));
    output.kv("Collection", payload.collection_id);
    output.kv(
        "Bands",
        format!("{} -> {}", request.bands().join(", "), payload.provider_bands.join(", ")),
    );
    output.kv("Region", request.geometry_source());
    output.kv("Years", format!("{} to {}", window.start_year, window.end_year));
    let ranges: Vec<String> =
        payload.doy_ranges.iter().map(|(a, b)| format!("{}-{}", a, b)).collect();
    output.kv("Days of year", ranges.join(", "));
    output.kv("Reducer", request.reducer().as_str());
    output.kv("Scale", format!("{} m", payload.scale_m));
    match request.drive_folder() {
        Some(folder) => output.kv("Export", format!("Drive folder {}", folder)),
        None => output.kv("Export", request.export_method().as_str()),
    }
    output.kv("Task name", request.task_name());
}
