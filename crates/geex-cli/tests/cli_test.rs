//! End-to-end tests running the `geex` binary

use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

fn geex(workdir: &Path, args: &[&str]) -> Output {
    let settings = workdir.join("config").join("settings.toml");
    let cache = workdir.join("cache");
    Command::new(env!("CARGO_BIN_EXE_geex"))
        .arg("--settings")
        .arg(&settings)
        .arg("--cache-dir")
        .arg(&cache)
        .args(args)
        .env_remove("GEEX_PROJECT_ID")
        .env_remove("GEEX_DEFAULT_SATELLITE")
        .env_remove("GEEX_DEFAULT_EXPORT")
        .env_remove("GEEX_SUBMIT_COMMAND")
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run geex")
}

fn json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "geex failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let parsed: Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(parsed["status"], "success");
    parsed["data"].clone()
}

const JOB: &[&str] = &[
    "--satellite",
    "chirps",
    "--bands",
    "precipitation",
    "--start-year",
    "2016",
    "--end-year",
    "2020",
    "--start-doy",
    "330",
    "--end-doy",
    "60",
    "--lat",
    "-1.2921",
    "--lon",
    "36.8219",
];

#[test]
fn test_settings_init_set_show() {
    let dir = TempDir::new().unwrap();

    json(&geex(dir.path(), &["--json", "settings", "init"]));
    assert!(dir.path().join("config/settings.toml").exists());

    // A second init refuses to overwrite
    assert!(!geex(dir.path(), &["settings", "init"]).status.success());

    json(&geex(dir.path(), &["--json", "settings", "set", "defaults.default_satellite", "ERA5"]));
    let rows = json(&geex(dir.path(), &["--json", "settings", "show"]));
    let satellite = rows
        .as_array()
        .unwrap()
        .iter()
        .find(|row| row["key"] == "defaults.default_satellite")
        .unwrap();
    assert_eq!(satellite["value"], "ERA5");
    assert_eq!(satellite["source"], "File");

    let rejected = geex(dir.path(), &["settings", "set", "defaults.default_satellite", "LANDSAT"]);
    assert!(!rejected.status.success());
}

#[test]
fn test_season_check() {
    let dir = TempDir::new().unwrap();
    let data = json(&geex(dir.path(), &["--json", "season", "check", "330", "60", "--day", "15"]));
    assert_eq!(data["within_season"], true);
    assert_eq!(data["crosses_year_boundary"], true);

    let data =
        json(&geex(dir.path(), &["--json", "season", "check", "100", "100", "--day", "101"]));
    assert_eq!(data["within_season"], false);
}

#[test]
fn test_roi_inspect_point() {
    let dir = TempDir::new().unwrap();
    let data =
        json(&geex(dir.path(), &["--json", "roi", "inspect", "--lat", "-8.65", "--lon", "115.2"]));
    assert_eq!(data["geometry_type"], "Point");
    assert_eq!(data["geojson"]["coordinates"][0], 115.2);

    assert!(!geex(dir.path(), &["roi", "inspect", "--lat", "95", "--lon", "0"]).status.success());
}

#[test]
fn test_job_plan_rejects_missing_bands() {
    let dir = TempDir::new().unwrap();
    let output = geex(
        dir.path(),
        &[
            "job",
            "plan",
            "--satellite",
            "era5",
            "--start-year",
            "2020",
            "--end-year",
            "2021",
            "--lat",
            "0",
            "--lon",
            "0",
        ],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERA5"));
}

#[cfg(unix)]
#[test]
fn test_submit_then_history() {
    let dir = TempDir::new().unwrap();

    let mut args =
        vec!["--json", "job", "submit", "--submit-command", "cat > /dev/null; echo TASK-7"];
    args.extend_from_slice(JOB);
    let submitted = json(&geex(dir.path(), &args));
    assert_eq!(submitted["task_id"], "TASK-7");
    assert_eq!(submitted["recorded"], true);

    let mut args = vec!["--json", "job", "record", "--task-id", "EXTERNAL-1"];
    args.extend_from_slice(JOB);
    json(&geex(dir.path(), &args));

    let history = json(&geex(dir.path(), &["--json", "history", "list"]));
    let entries = history.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["task_id"], "EXTERNAL-1");
    assert_eq!(entries[1]["task_id"], "TASK-7");

    let job_id = submitted["job_id"].as_str().unwrap();
    let shown = json(&geex(dir.path(), &["--json", "history", "show", job_id]));
    assert_eq!(shown["satellite"], "CHIRPS");
    assert_eq!(shown["task_name"], "CHIRPS_2016_2020_timeseries");
}

#[test]
fn test_corrupt_history_does_not_block_recording() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("cache")).unwrap();
    std::fs::write(dir.path().join("cache/history.json"), "{{ not json").unwrap();

    let history = json(&geex(dir.path(), &["--json", "history", "list"]));
    assert_eq!(history.as_array().unwrap().len(), 0);

    let mut args = vec!["--json", "job", "record"];
    args.extend_from_slice(JOB);
    json(&geex(dir.path(), &args));

    let history = json(&geex(dir.path(), &["--json", "history", "list"]));
    assert_eq!(history.as_array().unwrap().len(), 1);
}
