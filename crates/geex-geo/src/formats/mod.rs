//! Vector file readers for uploaded regions of interest
//!
//! Each supported upload format implements [`VectorReader`]. Byte-level
//! decoding is delegated to the format crates (`geojson`, `kml`,
//! `shapefile`); readers only locate the data, detect its CRS and hand
//! back `geo` geometries.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use geex_core::error::{GeexError, Result};

pub mod geojson;
pub mod kml;
pub mod shapefile;

pub use self::geojson::GeoJsonReader;
pub use self::kml::KmlReader;
pub use self::shapefile::ShapefileReader;

/// Declared format of an uploaded vector file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VectorFormat {
    /// Zipped shapefile bundle (a bare `.shp` with sidecars also works)
    ZipShapefile,
    GeoJson,
    Kml,
}

impl VectorFormat {
    pub const ALL: [VectorFormat; 3] =
        [VectorFormat::ZipShapefile, VectorFormat::GeoJson, VectorFormat::Kml];

    pub fn name(&self) -> &'static str {
        match self {
            VectorFormat::ZipShapefile => "Shapefile",
            VectorFormat::GeoJson => "GeoJSON",
            VectorFormat::Kml => "KML",
        }
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            VectorFormat::ZipShapefile => &["zip", "shp"],
            VectorFormat::GeoJson => &["geojson", "json"],
            VectorFormat::Kml => &["kml"],
        }
    }

    /// All accepted file extensions
    pub fn supported_extensions() -> Vec<String> {
        Self::ALL
            .iter()
            .flat_map(|f| f.extensions())
            .map(|ext| ext.to_string())
            .collect()
    }

    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| GeexError::UnsupportedFormat {
                extension: "none".to_string(),
                supported: Self::supported_extensions(),
            })?;

        Self::ALL
            .into_iter()
            .find(|f| f.extensions().contains(&extension.as_str()))
            .ok_or_else(|| GeexError::UnsupportedFormat {
                extension,
                supported: Self::supported_extensions(),
            })
    }

    pub fn reader(&self) -> Box<dyn VectorReader> {
        match self {
            VectorFormat::ZipShapefile => Box::new(ShapefileReader),
            VectorFormat::GeoJson => Box::new(GeoJsonReader),
            VectorFormat::Kml => Box::new(KmlReader),
        }
    }
}

impl fmt::Display for VectorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VectorFormat {
    type Err = GeexError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zip-shapefile" | "shapefile" | "shp" | "zip" => Ok(VectorFormat::ZipShapefile),
            "geojson" | "json" => Ok(VectorFormat::GeoJson),
            "kml" => Ok(VectorFormat::Kml),
            other => Err(GeexError::UnsupportedFormat {
                extension: other.to_string(),
                supported: vec![
                    "zip-shapefile".to_string(),
                    "geojson".to_string(),
                    "kml".to_string(),
                ],
            }),
        }
    }
}

/// Where an upload's contents come from
#[derive(Debug, Clone)]
pub enum VectorSource {
    Path(PathBuf),
    /// In-memory upload with its original file name
    Bytes { name: String, data: Vec<u8> },
}

impl VectorSource {
    /// File name without extension, used as the layer name
    pub fn name(&self) -> String {
        let path = match self {
            VectorSource::Path(path) => path.as_path(),
            VectorSource::Bytes { name, .. } => Path::new(name),
        };
        path.file_stem().and_then(|s| s.to_str()).unwrap_or("unnamed").to_string()
    }

    /// Original file name, for descriptions
    pub fn file_name(&self) -> String {
        match self {
            VectorSource::Path(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            VectorSource::Bytes { name, .. } => name.clone(),
        }
    }

    pub(crate) fn read_text(&self, format: &str) -> Result<String> {
        match self {
            VectorSource::Path(path) => Ok(fs::read_to_string(path)?),
            VectorSource::Bytes { data, .. } => {
                String::from_utf8(data.clone()).map_err(|e| GeexError::FormatError {
                    format: format.to_string(),
                    message: format!("File is not valid UTF-8: {}", e),
                })
            }
        }
    }
}

/// Geometries decoded from one upload
#[derive(Debug, Clone)]
pub struct VectorLayer {
    pub name: String,

    /// EPSG code of the source coordinates
    pub crs: u32,

    /// One entry per feature, in file order
    pub geometries: Vec<geo::Geometry<f64>>,
}

/// Format reader trait that all upload formats implement
pub trait VectorReader {
    fn read(&self, source: &VectorSource) -> Result<VectorLayer>;

    /// Human-readable format name (e.g., "Shapefile", "GeoJSON")
    fn format_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(
            VectorFormat::from_path(Path::new("fields.zip")).unwrap(),
            VectorFormat::ZipShapefile
        );
        assert_eq!(
            VectorFormat::from_path(Path::new("fields.SHP")).unwrap(),
            VectorFormat::ZipShapefile
        );
        assert_eq!(
            VectorFormat::from_path(Path::new("area.geojson")).unwrap(),
            VectorFormat::GeoJson
        );
        assert_eq!(VectorFormat::from_path(Path::new("doc.kml")).unwrap(), VectorFormat::Kml);
    }

    #[test]
    fn test_unsupported_format() {
        let err = VectorFormat::from_path(Path::new("area.gpkg")).unwrap_err();
        match err {
            GeexError::UnsupportedFormat { extension, supported } => {
                assert_eq!(extension, "gpkg");
                assert!(supported.contains(&"kml".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(VectorFormat::from_path(Path::new("README")).is_err());
    }

    #[test]
    fn test_parse_declared_format() {
        assert_eq!("zip-shapefile".parse::<VectorFormat>().unwrap(), VectorFormat::ZipShapefile);
        assert_eq!("GeoJSON".parse::<VectorFormat>().unwrap(), VectorFormat::GeoJson);
        assert!("gpx".parse::<VectorFormat>().is_err());
    }

    #[test]
    fn test_source_names() {
        let source = VectorSource::Bytes { name: "farm plots.kml".to_string(), data: vec![] };
        assert_eq!(source.name(), "farm plots");
        assert_eq!(source.file_name(), "farm plots.kml");

        let source = VectorSource::Path(PathBuf::from("/data/regions/kenya.geojson"));
        assert_eq!(source.name(), "kenya");
        assert_eq!(source.file_name(), "kenya.geojson");
    }

    #[test]
    fn test_non_utf8_bytes_rejected() {
        let source =
            VectorSource::Bytes { name: "x.kml".to_string(), data: vec![0xff, 0xfe, 0x00] };
        assert!(matches!(source.read_text("KML"), Err(GeexError::FormatError { .. })));
    }
}
