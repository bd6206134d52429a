//! GeoJSON format reader implementation

use geojson::GeoJson;

use super::{VectorLayer, VectorReader, VectorSource};
use crate::transform::WGS84;
use geex_core::error::{GeexError, Result};

/// GeoJSON format reader
pub struct GeoJsonReader;

impl VectorReader for GeoJsonReader {
    fn read(&self, source: &VectorSource) -> Result<VectorLayer> {
        let content = source.read_text(self.format_name())?;

        let geojson: GeoJson = content.parse().map_err(|e| GeexError::FormatError {
            format: self.format_name().to_string(),
            message: format!("Failed to parse GeoJSON: {}", e),
        })?;

        let crs = declared_crs(&geojson).unwrap_or(WGS84);

        let collection: geo::GeometryCollection<f64> = geojson::quick_collection(&geojson)
            .map_err(|e| GeexError::FormatError {
                format: self.format_name().to_string(),
                message: format!("Failed to convert geometries: {}", e),
            })?;

        tracing::debug!(
            features = collection.0.len(),
            crs,
            "Read GeoJSON layer {}",
            source.name()
        );

        Ok(VectorLayer { name: source.name(), crs, geometries: collection.0 })
    }

    fn format_name(&self) -> &'static str {
        "GeoJSON"
    }
}

/// Legacy `crs` member of a FeatureCollection, if present
fn declared_crs(geojson: &GeoJson) -> Option<u32> {
    match geojson {
        GeoJson::FeatureCollection(fc) => fc
            .foreign_members
            .as_ref()
            .and_then(|fm| fm.get("crs"))
            .and_then(extract_epsg_from_crs),
        _ => None,
    }
}

/// Extract EPSG code from CRS object
fn extract_epsg_from_crs(crs: &serde_json::Value) -> Option<u32> {
    let name = crs.get("properties")?.get("name")?.as_str()?;
    // "EPSG:4326", "urn:ogc:def:crs:EPSG::3857"; CRS84 is WGS84 in lon/lat order
    if name.ends_with("CRS84") {
        return Some(WGS84);
    }
    name.rsplit(':').next()?.parse().ok()
}
