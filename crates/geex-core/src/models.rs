pub mod geometry;
pub mod history;
pub mod job;
pub mod satellite;
pub mod settings;
pub mod window;

pub use geometry::{Bounds, Geometry, GeometryType, LatLon, Polygon};
pub use history::HistoryEntry;
pub use job::{ExportMethod, JobId, JobRequest, Reducer};
pub use satellite::{BandSpec, Satellite};
pub use settings::{Settings, DEFAULT_DRIVE_FOLDER, HISTORY_FILE_NAME};
pub use window::DateWindow;
