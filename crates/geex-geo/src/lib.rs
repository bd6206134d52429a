//! Geex Geo - Region-of-interest normalization
//!
//! Reads uploaded vector files, reprojects them to WGS84, unions
//! multi-feature inputs and resolves administrative boundaries, producing
//! the canonical geometry defined in `geex-core`.

pub mod boundary;
pub mod formats;
pub mod models;
pub mod normalize;
pub mod ops;
pub mod transform;

pub use boundary::{BoundaryLookup, BoundaryRecord, GeoJsonBoundaryLookup, MemoryBoundaryLookup};
pub use formats::{VectorFormat, VectorLayer, VectorReader, VectorSource};
pub use models::GeometryExt;
pub use normalize::{normalize_point, GeometryInput, GeometryNormalizer};
