//! Geometry normalization
//!
//! Turns one of the supported region-of-interest inputs into the canonical
//! [`Geometry`]: a validated point, an uploaded vector file, or an
//! administrative boundary.

use std::fmt;

use geo::{MultiPolygon, Simplify};

use crate::boundary::BoundaryLookup;
use crate::formats::{VectorFormat, VectorSource};
use crate::models::{from_multi_polygon, Geometry, LatLon};
use crate::ops::{collect_polygons, union_all};
use crate::transform::reproject_to_wgs84;
use geex_core::error::{GeexError, Result};

/// Raw region-of-interest input as collected by the UI
#[derive(Debug, Clone)]
pub enum GeometryInput {
    PointCoordinate { lat: f64, lon: f64 },
    VectorFileUpload { source: VectorSource, format: VectorFormat },
    /// `admin_level1_name: None` selects the whole country
    AdministrativeBoundary { country_code: String, admin_level1_name: Option<String> },
}

impl GeometryInput {
    /// Upload from a path, with the format taken from its extension
    pub fn from_path(path: impl Into<std::path::PathBuf>) -> Result<Self> {
        let path = path.into();
        let format = VectorFormat::from_path(&path)?;
        Ok(GeometryInput::VectorFileUpload { source: VectorSource::Path(path), format })
    }

    /// Short human-readable description, stored on history entries
    pub fn describe(&self) -> String {
        match self {
            GeometryInput::PointCoordinate { lat, lon } => {
                format!("Point ({:.5}, {:.5})", lat, lon)
            }
            GeometryInput::VectorFileUpload { source, format } => {
                format!("{} upload: {}", format, source.file_name())
            }
            GeometryInput::AdministrativeBoundary { country_code, admin_level1_name } => {
                match admin_level1_name {
                    Some(region) => format!("Boundary: {} / {}", country_code, region),
                    None => format!("Boundary: {}", country_code),
                }
            }
        }
    }
}

impl fmt::Display for GeometryInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Normalizes [`GeometryInput`]s into canonical geometries
#[derive(Default)]
pub struct GeometryNormalizer {
    boundaries: Option<Box<dyn BoundaryLookup + Send + Sync>>,

    /// Douglas-Peucker tolerance in degrees for boundary geometries
    simplify_tolerance: Option<f64>,
}

impl GeometryNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_boundaries(mut self, lookup: impl BoundaryLookup + Send + Sync + 'static) -> Self {
        self.boundaries = Some(Box::new(lookup));
        self
    }

    pub fn with_simplify_tolerance(mut self, tolerance: f64) -> Self {
        self.simplify_tolerance = (tolerance > 0.0).then_some(tolerance);
        self
    }

    pub fn has_boundaries(&self) -> bool {
        self.boundaries.is_some()
    }

    pub fn normalize(&self, input: &GeometryInput) -> Result<Geometry> {
        let geometry = match input {
            GeometryInput::PointCoordinate { lat, lon } => normalize_point(*lat, *lon)?,
            GeometryInput::VectorFileUpload { source, format } => {
                self.normalize_upload(source, *format)?
            }
            GeometryInput::AdministrativeBoundary { country_code, admin_level1_name } => {
                self.normalize_boundary(country_code, admin_level1_name.as_deref())?
            }
        };

        geometry.validate()?;
        tracing::debug!(kind = ?geometry.geometry_type(), "Normalized {}", input);
        Ok(geometry)
    }

    fn normalize_upload(&self, source: &VectorSource, format: VectorFormat) -> Result<Geometry> {
        let layer = format.reader().read(source)?;
        tracing::debug!(
            features = layer.geometries.len(),
            crs = layer.crs,
            "Read {} layer {}",
            format,
            layer.name
        );

        let reprojected = layer
            .geometries
            .into_iter()
            .map(|g| reproject_to_wgs84(g, layer.crs))
            .collect::<Result<Vec<_>>>()?;

        let polygons = collect_polygons(reprojected)?;
        if polygons.is_empty() {
            return Err(GeexError::InvalidGeometry {
                reason: format!("{} contains no features", source.file_name()),
            });
        }

        let merged = union_all(polygons);
        from_multi_polygon(&merged).ok_or_else(|| GeexError::InvalidGeometry {
            reason: format!("union of {} is empty", source.file_name()),
        })
    }

    fn normalize_boundary(&self, country: &str, region: Option<&str>) -> Result<Geometry> {
        let lookup = self.boundaries.as_ref().ok_or_else(|| GeexError::ConfigInvalid {
            key: "boundaries".to_string(),
            reason: "no administrative boundary data is configured".to_string(),
        })?;

        let not_found = || GeexError::BoundaryNotFound {
            country: country.to_string(),
            region: region.map(str::to_string),
        };

        let boundary = lookup.lookup(country, region)?.ok_or_else(not_found)?;
        let boundary = match self.simplify_tolerance {
            Some(tolerance) => simplify_multi_polygon(&boundary, tolerance),
            None => boundary,
        };

        from_multi_polygon(&boundary).ok_or_else(not_found)
    }
}

/// Validate a WGS84 coordinate and wrap it as a point
pub fn normalize_point(lat: f64, lon: f64) -> Result<Geometry> {
    let position = LatLon::new(lat, lon);
    if !position.is_valid() {
        return Err(GeexError::InvalidCoordinate { lat, lon });
    }
    Ok(Geometry::Point(position))
}

/// Simplify every part; parts whose exterior collapses keep their original shape.
fn simplify_multi_polygon(mp: &MultiPolygon<f64>, tolerance: f64) -> MultiPolygon<f64> {
    let polygons = mp
        .0
        .iter()
        .map(|polygon| {
            let simplified = polygon.simplify(tolerance);
            if simplified.exterior().0.len() < 4 {
                return polygon.clone();
            }
            let (exterior, interiors) = simplified.into_inner();
            let interiors = interiors.into_iter().filter(|ring| ring.0.len() >= 4).collect();
            geo::Polygon::new(exterior, interiors)
        })
        .collect();
    MultiPolygon::new(polygons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::{BoundaryRecord, MemoryBoundaryLookup};
    use crate::models::GeometryType;
    use geo::{polygon, Area, LineString};
    use proptest::prelude::*;

    fn geojson_upload(name: &str, content: &str) -> GeometryInput {
        GeometryInput::VectorFileUpload {
            source: VectorSource::Bytes {
                name: name.to_string(),
                data: content.as_bytes().to_vec(),
            },
            format: VectorFormat::GeoJson,
        }
    }

    fn kenya_lookup() -> MemoryBoundaryLookup {
        let mut table = MemoryBoundaryLookup::new();
        table.insert(BoundaryRecord {
            country_code: "KEN".to_string(),
            country_name: Some("Kenya".to_string()),
            region: Some("Nairobi".to_string()),
            geometry: MultiPolygon::new(vec![polygon![
                (x: 36.6, y: -1.45), (x: 37.1, y: -1.45), (x: 37.1, y: -1.15),
                (x: 36.6, y: -1.15), (x: 36.6, y: -1.45),
            ]]),
        });
        table
    }

    proptest! {
        #[test]
        fn prop_point_normalization_is_identity(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) {
            let normalizer = GeometryNormalizer::new();
            let geometry = normalizer
                .normalize(&GeometryInput::PointCoordinate { lat, lon })
                .unwrap();
            prop_assert_eq!(geometry, Geometry::Point(LatLon::new(lat, lon)));
        }

        #[test]
        fn prop_out_of_range_latitude_rejected(
            lat in 90.0001f64..1000.0,
            lon in -180.0f64..=180.0,
        ) {
            let err = normalize_point(lat, lon).unwrap_err();
            let is_invalid = matches!(err, GeexError::InvalidCoordinate { .. });
            prop_assert!(is_invalid);
        }
    }

    #[test]
    fn test_point_bounds_inclusive() {
        assert!(normalize_point(90.0, 180.0).is_ok());
        assert!(normalize_point(-90.0, -180.0).is_ok());
        assert!(normalize_point(0.0, 180.5).is_err());
        assert!(normalize_point(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_geojson_features_unioned() {
        let content = r#"{
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "properties": {},
                  "geometry": { "type": "Polygon", "coordinates": [[[0, 0], [2, 0], [2, 2], [0, 2], [0, 0]]] } },
                { "type": "Feature", "properties": {},
                  "geometry": { "type": "Polygon", "coordinates": [[[1, 1], [3, 1], [3, 3], [1, 3], [1, 1]]] } }
            ]
        }"#;

        let geometry =
            GeometryNormalizer::new().normalize(&geojson_upload("plots.geojson", content)).unwrap();
        assert_eq!(geometry.geometry_type(), GeometryType::Polygon);

        let area = crate::models::to_geo_geometry(&geometry).unsigned_area();
        assert!((area - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_features_stay_multipolygon() {
        let content = r#"{
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "properties": {},
                  "geometry": { "type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 1], [0, 0]]] } },
                { "type": "Feature", "properties": {},
                  "geometry": { "type": "Polygon", "coordinates": [[[5, 5], [6, 5], [6, 6], [5, 6], [5, 5]]] } }
            ]
        }"#;

        let geometry =
            GeometryNormalizer::new().normalize(&geojson_upload("plots.geojson", content)).unwrap();
        assert_eq!(geometry.geometry_type(), GeometryType::MultiPolygon);
    }

    #[test]
    fn test_line_layer_rejected() {
        let content = r#"{ "type": "LineString", "coordinates": [[0, 0], [1, 1]] }"#;
        let err = GeometryNormalizer::new()
            .normalize(&geojson_upload("road.geojson", content))
            .unwrap_err();
        match err {
            GeexError::UnsupportedGeometry { found } => assert_eq!(found, "LineString"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_layer_rejected() {
        let content = r#"{ "type": "FeatureCollection", "features": [] }"#;
        let err = GeometryNormalizer::new()
            .normalize(&geojson_upload("empty.geojson", content))
            .unwrap_err();
        assert!(matches!(err, GeexError::InvalidGeometry { .. }));
    }

    #[test]
    fn test_web_mercator_upload_reprojected() {
        let content = r#"{
            "type": "FeatureCollection",
            "crs": { "type": "name", "properties": { "name": "EPSG:3857" } },
            "features": [
                { "type": "Feature", "properties": {},
                  "geometry": { "type": "Polygon", "coordinates": [[[0, 0], [111319.49, 0], [111319.49, 111325.14], [0, 111325.14], [0, 0]]] } }
            ]
        }"#;

        let geometry =
            GeometryNormalizer::new().normalize(&geojson_upload("merc.geojson", content)).unwrap();
        let bounds = geometry.bounds().unwrap();
        assert!((bounds.max_lon - 1.0).abs() < 1e-4);
        assert!((bounds.max_lat - 1.0).abs() < 1e-3);
        assert!(bounds.min_lat.abs() < 1e-9);
    }

    #[test]
    fn test_kml_polygon_upload() {
        let content = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Placemark>
    <Polygon>
      <outerBoundaryIs>
        <LinearRing>
          <coordinates>36.80,-1.30,0 36.82,-1.30,0 36.82,-1.28,0 36.80,-1.28,0 36.80,-1.30,0</coordinates>
        </LinearRing>
      </outerBoundaryIs>
    </Polygon>
  </Placemark>
</kml>"#;
        let input = GeometryInput::VectorFileUpload {
            source: VectorSource::Bytes {
                name: "field.kml".to_string(),
                data: content.as_bytes().to_vec(),
            },
            format: VectorFormat::Kml,
        };

        let geometry = GeometryNormalizer::new().normalize(&input).unwrap();
        assert_eq!(geometry.geometry_type(), GeometryType::Polygon);
        let bounds = geometry.bounds().unwrap();
        assert!((bounds.min_lat + 1.30).abs() < 1e-9);
        assert!((bounds.max_lon - 36.82).abs() < 1e-9);
    }

    #[test]
    fn test_boundary_lookup() {
        let normalizer = GeometryNormalizer::new().with_boundaries(kenya_lookup());
        let input = GeometryInput::AdministrativeBoundary {
            country_code: "KEN".to_string(),
            admin_level1_name: Some("Nairobi".to_string()),
        };
        let geometry = normalizer.normalize(&input).unwrap();
        assert_eq!(geometry.geometry_type(), GeometryType::Polygon);

        let missing = GeometryInput::AdministrativeBoundary {
            country_code: "KEN".to_string(),
            admin_level1_name: Some("Atlantis".to_string()),
        };
        match normalizer.normalize(&missing).unwrap_err() {
            GeexError::BoundaryNotFound { country, region } => {
                assert_eq!(country, "KEN");
                assert_eq!(region.as_deref(), Some("Atlantis"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_boundary_without_lookup_configured() {
        let input =
            GeometryInput::AdministrativeBoundary {
                country_code: "KEN".to_string(),
                admin_level1_name: None,
            };
        let err = GeometryNormalizer::new().normalize(&input).unwrap_err();
        assert!(matches!(err, GeexError::ConfigInvalid { .. }));
    }

    #[test]
    fn test_normalization_is_deterministic() {
        let normalizer = GeometryNormalizer::new().with_boundaries(kenya_lookup());
        let input =
            GeometryInput::AdministrativeBoundary {
                country_code: "ken".to_string(),
                admin_level1_name: None,
            };
        assert_eq!(normalizer.normalize(&input).unwrap(), normalizer.normalize(&input).unwrap());
    }

    #[test]
    fn test_simplify_drops_collinear_vertices() {
        let mp = MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0), (x: 0.5, y: 0.0001), (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0), (x: 0.0, y: 1.0), (x: 0.0, y: 0.0),
        ]]);
        let simplified = simplify_multi_polygon(&mp, 0.01);
        let exterior = simplified.0[0].exterior();
        assert_eq!(exterior.0.len(), 5);
        assert_eq!(exterior.0.first(), mp.0[0].exterior().0.first());
        assert_eq!(exterior.0.last(), mp.0[0].exterior().0.last());
    }

    #[test]
    fn test_simplify_never_collapses_rings() {
        let hole =
            LineString::from(vec![(0.4, 0.4), (0.41, 0.4), (0.41, 0.41), (0.4, 0.41), (0.4, 0.4)]);
        let outer =
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]);
        let mp = MultiPolygon::new(vec![geo::Polygon::new(outer, vec![hole])]);

        // Tolerance far larger than the whole shape
        let simplified = simplify_multi_polygon(&mp, 10.0);
        let polygon = &simplified.0[0];
        assert!(polygon.exterior().0.len() >= 4);
        assert!(polygon.interiors().iter().all(|ring| ring.0.len() >= 4));
        assert!((simplified.unsigned_area() - mp.unsigned_area()).abs() < 1e-9);
    }

    #[test]
    fn test_simplified_boundary_keeps_area_roughly() {
        let mut table = MemoryBoundaryLookup::new();
        table.insert(BoundaryRecord {
            country_code: "XXX".to_string(),
            country_name: None,
            region: None,
            geometry: MultiPolygon::new(vec![polygon![
                (x: 0.0, y: 0.0), (x: 0.5, y: 0.00001), (x: 1.0, y: 0.0),
                (x: 1.0, y: 1.0), (x: 0.0, y: 1.0), (x: 0.0, y: 0.0),
            ]]),
        });
        let normalizer =
            GeometryNormalizer::new().with_boundaries(table).with_simplify_tolerance(0.001);
        let input =
            GeometryInput::AdministrativeBoundary {
                country_code: "XXX".to_string(),
                admin_level1_name: None,
            };

        let geometry = normalizer.normalize(&input).unwrap();
        match &geometry {
            Geometry::Polygon(p) => assert_eq!(p.exterior().len(), 5),
            other => panic!("expected polygon, got {other:?}"),
        }
    }

    #[test]
    fn test_describe() {
        assert_eq!(
            GeometryInput::PointCoordinate { lat: -1.2921, lon: 36.8219 }.describe(),
            "Point (-1.29210, 36.82190)"
        );
        assert_eq!(
            GeometryInput::AdministrativeBoundary {
                country_code: "KEN".to_string(),
                admin_level1_name: Some("Nairobi".to_string())
            }
            .describe(),
            "Boundary: KEN / Nairobi"
        );
        let upload = GeometryInput::from_path("/tmp/fields.zip").unwrap();
        assert_eq!(upload.describe(), "Shapefile upload: fields.zip");
    }
}
