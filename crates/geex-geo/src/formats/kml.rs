//! KML format reader implementation
//!
//! KML coordinates are always WGS84 longitude/latitude.

use kml::Kml;

use super::{VectorLayer, VectorReader, VectorSource};
use crate::transform::WGS84;
use geex_core::error::{GeexError, Result};

/// KML format reader
pub struct KmlReader;

impl VectorReader for KmlReader {
    fn read(&self, source: &VectorSource) -> Result<VectorLayer> {
        let content = source.read_text(self.format_name())?;

        let kml: Kml<f64> = content.parse().map_err(|e| GeexError::FormatError {
            format: self.format_name().to_string(),
            message: format!("Failed to parse KML: {}", e),
        })?;

        let collection = kml::quick_collection(kml).map_err(|e| GeexError::FormatError {
            format: self.format_name().to_string(),
            message: format!("Failed to convert geometries: {}", e),
        })?;

        tracing::debug!(placemarks = collection.0.len(), "Read KML layer {}", source.name());

        Ok(VectorLayer { name: source.name(), crs: WGS84, geometries: collection.0 })
    }

    fn format_name(&self) -> &'static str {
        "KML"
    }
}
