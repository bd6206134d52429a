//! Bridge to the processing service through an external command
//!
//! The command receives the request payload as JSON on stdin and prints
//! the service's task id on stdout. A non-zero exit is a rejection, with
//! stderr as the reason.

use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;

use geex_core::error::{GeexError, Result};
use geex_core::models::{ExportMethod, JobRequest, Settings};
use geex_core::ports::TaskSubmitter;
use geex_geo::GeometryExt;
use serde::Serialize;

pub const ENV_SUBMIT_COMMAND: &str = "GEEX_SUBMIT_COMMAND";

/// Request plus the provider details a service client needs
#[derive(Debug, Serialize)]
pub struct RequestPayload<'a> {
    pub project_id: &'a str,
    pub collection_id: &'static str,
    pub scale_m: u32,
    pub provider_bands: Vec<&'static str>,
    pub doy_ranges: Vec<(u16, u16)>,
    pub region: geojson::Geometry,
    /// Destination for local exports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<String>,
    pub request: &'a JobRequest,
}

impl<'a> RequestPayload<'a> {
    pub fn new(request: &'a JobRequest, settings: &'a Settings) -> Self {
        let satellite = request.satellite();
        Self {
            project_id: &settings.project_id,
            collection_id: satellite.collection_id(),
            scale_m: satellite.pixel_size_m(),
            provider_bands: request.provider_bands(),
            doy_ranges: request.date_window().doy_ranges(),
            region: request.geometry().to_geojson(),
            download_dir: (request.export_method() == ExportMethod::Local)
                .then(|| settings.local_download_path.display().to_string()),
            request,
        }
    }
}

/// Runs a shell command per submission
pub struct ProcessSubmitter<'a> {
    command: String,
    settings: &'a Settings,
}

impl<'a> ProcessSubmitter<'a> {
    pub fn new(command: impl Into<String>, settings: &'a Settings) -> Self {
        Self { command: command.into(), settings }
    }

    fn shell(&self) -> Command {
        if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", &self.command]);
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.args(["-c", &self.command]);
            cmd
        }
    }
}

impl TaskSubmitter for ProcessSubmitter<'_> {
    fn submit(&self, request: &JobRequest) -> Result<String> {
        let payload = serde_json::to_vec(&RequestPayload::new(request, self.settings))
            .map_err(|e| GeexError::Serialization(e.to_string()))?;

        tracing::debug!(command = %self.command, job_id = %request.job_id(), "Submitting job");

        let mut child = self
            .shell()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Stdin is fed from its own thread while the output pipes are drained
        let stdin = child.stdin.take();
        let writer = thread::spawn(move || match stdin {
            Some(mut stdin) => stdin.write_all(&payload),
            None => Ok(()),
        });

        let output = child.wait_with_output()?;
        let written = writer
            .join()
            .map_err(|_| io::Error::other("request writer thread panicked"))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let reason = if stderr.is_empty() {
                format!("submit command exited with {}", output.status)
            } else {
                stderr
            };
            return Err(GeexError::SubmissionRejected { reason });
        }

        match written {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                tracing::debug!("Submit command exited without reading the whole request");
            }
            Err(e) => return Err(e.into()),
        }

        let task_id = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .rfind(|line| !line.is_empty())
            .map(str::to_string)
            .ok_or_else(|| GeexError::SubmissionRejected {
                reason: "submit command printed no task id".to_string(),
            })?;

        Ok(task_id)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use geex_core::models::{DateWindow, Geometry, Polygon, Satellite};
    use geex_core::JobBuilder;

    fn request() -> JobRequest {
        JobBuilder::new(Satellite::Era5, DateWindow::new(2010, 2012, 300, 40))
            .bands(["temperature"])
            .geometry(Geometry::point(-1.29, 36.82))
            .build()
            .unwrap()
    }

    #[test]
    fn test_task_id_from_last_stdout_line() {
        let settings = Settings::default();
        let submitter =
            ProcessSubmitter::new("cat > /dev/null; echo queued; echo TASK42", &settings);
        assert_eq!(submitter.submit(&request()).unwrap(), "TASK42");
    }

    #[test]
    fn test_non_zero_exit_is_rejection() {
        let settings = Settings::default();
        let submitter = ProcessSubmitter::new(
            "cat > /dev/null; echo 'quota exceeded' >&2; exit 3",
            &settings,
        );
        match submitter.submit(&request()).unwrap_err() {
            GeexError::SubmissionRejected { reason } => assert_eq!(reason, "quota exceeded"),
            other => panic!("unexpected error: {other}"),
        }
    }

    fn large_request() -> JobRequest {
        let steps = 20_000;
        let mut ring: Vec<(f64, f64)> = (0..steps)
            .map(|i| {
                let angle = i as f64 / steps as f64 * std::f64::consts::TAU;
                (-1.29 + 0.5 * angle.sin(), 36.82 + 0.5 * angle.cos())
            })
            .collect();
        ring.push(ring[0]);

        JobBuilder::new(Satellite::Chirps, DateWindow::full_years(2015, 2020))
            .bands(["precipitation"])
            .geometry(Geometry::Polygon(Polygon::from_exterior(&ring)))
            .build()
            .unwrap()
    }

    #[test]
    fn test_command_ignoring_stdin_still_yields_task_id() {
        let settings = Settings::default();
        let submitter = ProcessSubmitter::new("echo TASK1", &settings);
        assert_eq!(submitter.submit(&large_request()).unwrap(), "TASK1");
    }

    #[test]
    fn test_chatty_command_does_not_block() {
        let settings = Settings::default();
        // Fills the stdout pipe before it reads anything
        let submitter = ProcessSubmitter::new(
            "yes x | head -c 200000; cat > /dev/null; echo TASK2",
            &settings,
        );
        assert_eq!(submitter.submit(&large_request()).unwrap(), "TASK2");
    }

    #[test]
    fn test_rejection_without_reading_stdin() {
        let settings = Settings::default();
        let submitter = ProcessSubmitter::new("echo 'bad project' >&2; exit 1", &settings);
        match submitter.submit(&large_request()).unwrap_err() {
            GeexError::SubmissionRejected { reason } => assert_eq!(reason, "bad project"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_payload_contents() {
        let settings = Settings { project_id: "my-project".to_string(), ..Settings::default() };
        let req = request();
        let payload = serde_json::to_value(RequestPayload::new(&req, &settings)).unwrap();

        assert_eq!(payload["project_id"], "my-project");
        assert_eq!(payload["collection_id"], "ECMWF/ERA5_LAND/DAILY_AGGR");
        assert_eq!(payload["provider_bands"][0], "temperature_2m");
        assert_eq!(payload["doy_ranges"], serde_json::json!([[300, 366], [1, 40]]));
        assert_eq!(payload["region"]["type"], "Point");
        assert!(payload.get("download_dir").is_none());
    }
}
