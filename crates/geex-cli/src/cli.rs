use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use geex_core::models::{ExportMethod, Reducer, Satellite};
use geex_geo::VectorFormat;
use std::path::PathBuf;

/// Geex - Earth Engine time-series extraction jobs
#[derive(Parser, Debug)]
#[command(name = "geex")]
#[command(about = "Configure, record and submit Earth Engine extraction jobs", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Settings file (defaults to config/settings.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Override the cache folder (job history lives here)
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Override the local download folder
    #[arg(long, global = true, value_name = "DIR")]
    pub download_dir: Option<PathBuf>,

    /// Override the Earth Engine project
    #[arg(long, global = true)]
    pub project_id: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show or edit settings
    Settings(SettingsArgs),

    /// Browse submitted jobs
    History(HistoryArgs),

    /// Day-of-year season checks
    Season(SeasonArgs),

    /// Inspect a region of interest
    Roi(RoiArgs),

    /// Build, submit or record jobs
    Job(JobArgs),
}

#[derive(Args, Debug)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommand,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Show effective settings and where each value comes from
    Show,

    /// Set one value in the settings file
    Set {
        /// Dotted key, e.g. gee.project_id or defaults.default_satellite
        key: String,
        value: String,
    },

    /// Write a settings file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub command: HistoryCommand,
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    /// List jobs, most recent first
    List {
        /// Show at most this many entries
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },

    /// Show one job in full
    Show {
        /// Job id (UUID)
        job_id: String,
    },
}

#[derive(Args, Debug)]
pub struct SeasonArgs {
    #[command(subcommand)]
    pub command: SeasonCommand,
}

#[derive(Subcommand, Debug)]
pub enum SeasonCommand {
    /// Check whether a day falls inside a season
    Check(SeasonCheckArgs),
}

#[derive(Args, Debug)]
pub struct SeasonCheckArgs {
    /// First day of the season (0-365)
    pub start_doy: u16,

    /// Last day of the season (0-365); smaller than start wraps over New Year
    pub end_doy: u16,

    /// Day of year to test (1-366)
    #[arg(long, conflicts_with = "date")]
    pub day: Option<u16>,

    /// Calendar date to test (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct RoiArgs {
    #[command(subcommand)]
    pub command: RoiCommand,
}

#[derive(Subcommand, Debug)]
pub enum RoiCommand {
    /// Normalize a region and print its type, bounds and centroid
    Inspect(RoiSelection),
}

/// One way of choosing a region of interest
#[derive(Args, Debug, Clone)]
pub struct RoiSelection {
    /// Point latitude
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Point longitude
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Vector file: zipped shapefile, .shp, GeoJSON or KML
    #[arg(long, value_name = "PATH", conflicts_with_all = ["lat", "country"])]
    pub file: Option<PathBuf>,

    /// Declared format of --file (detected from the extension otherwise)
    #[arg(long, requires = "file")]
    pub format: Option<VectorFormat>,

    /// Country code or name for an administrative boundary
    #[arg(long, conflicts_with = "lat")]
    pub country: Option<String>,

    /// First-level region within --country (whole country if omitted)
    #[arg(long, requires = "country")]
    pub region: Option<String>,

    /// GeoJSON file with administrative boundaries
    #[arg(long, value_name = "PATH")]
    pub boundaries: Option<PathBuf>,

    /// Simplify boundaries with this tolerance in degrees
    #[arg(long, value_name = "DEGREES")]
    pub simplify: Option<f64>,
}

#[derive(Args, Debug)]
pub struct JobArgs {
    #[command(subcommand)]
    pub command: JobCommand,
}

#[derive(Subcommand, Debug)]
pub enum JobCommand {
    /// Build and validate a job without submitting it
    Plan(JobSpecArgs),

    /// Submit a job through an external command and record it
    Submit {
        #[command(flatten)]
        spec: JobSpecArgs,

        /// Command that reads the request JSON on stdin and prints a task id
        /// (defaults to $GEEX_SUBMIT_COMMAND)
        #[arg(long, value_name = "CMD")]
        submit_command: Option<String>,
    },

    /// Record a job submitted elsewhere
    Record {
        #[command(flatten)]
        spec: JobSpecArgs,

        /// Task id returned by the processing service
        #[arg(long)]
        task_id: Option<String>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct JobSpecArgs {
    /// NDVI, ERA5 or CHIRPS (defaults to settings)
    #[arg(long)]
    pub satellite: Option<Satellite>,

    /// Bands, comma separated (NDVI uses its fixed set when omitted)
    #[arg(long, value_delimiter = ',')]
    pub bands: Vec<String>,

    #[arg(long)]
    pub start_year: i32,

    #[arg(long)]
    pub end_year: i32,

    /// Season start day of year
    #[arg(long, default_value = "1")]
    pub start_doy: u16,

    /// Season end day of year
    #[arg(long, default_value = "365")]
    pub end_doy: u16,

    /// Drive or Local (defaults to settings)
    #[arg(long)]
    pub export: Option<ExportMethod>,

    /// mean, sum, max, min, median or first (defaults to settings)
    #[arg(long)]
    pub reducer: Option<Reducer>,

    /// Export task name
    #[arg(long)]
    pub task_name: Option<String>,

    #[command(flatten)]
    pub roi: RoiSelection,
}
