//! Conversions between the canonical geometry and the `geo` crate.
//!
//! `geo` coordinates are (x, y) = (lon, lat); the canonical model stores
//! latitude first. Everything crossing this boundary goes through here.

use geo::{Centroid, Coord, LineString, MultiPolygon};

pub use geex_core::models::{Bounds, Geometry, GeometryType, LatLon, Polygon};

fn to_line_string(ring: &[LatLon]) -> LineString<f64> {
    LineString::new(ring.iter().map(|p| Coord { x: p.lon, y: p.lat }).collect())
}

fn from_line_string(ring: &LineString<f64>) -> Vec<LatLon> {
    ring.coords().map(|c| LatLon::new(c.y, c.x)).collect()
}

pub fn to_geo_polygon(poly: &Polygon) -> geo::Polygon<f64> {
    geo::Polygon::new(
        to_line_string(poly.exterior()),
        poly.interiors().iter().map(|ring| to_line_string(ring)).collect(),
    )
}

pub fn from_geo_polygon(poly: &geo::Polygon<f64>) -> Polygon {
    let mut rings = Vec::with_capacity(1 + poly.interiors().len());
    rings.push(from_line_string(poly.exterior()));
    rings.extend(poly.interiors().iter().map(from_line_string));
    Polygon::new(rings)
}

/// Convert a canonical Geometry to a geo::Geometry
pub fn to_geo_geometry(geom: &Geometry) -> geo::Geometry<f64> {
    match geom {
        Geometry::Point(p) => geo::Geometry::Point(geo::Point::new(p.lon, p.lat)),
        Geometry::Polygon(poly) => geo::Geometry::Polygon(to_geo_polygon(poly)),
        Geometry::MultiPolygon { polygons } => geo::Geometry::MultiPolygon(MultiPolygon::new(
            polygons.iter().map(to_geo_polygon).collect(),
        )),
    }
}

/// Canonical areal geometry from a multipolygon.
///
/// A single part comes back as a `Polygon`; an empty input yields `None`.
pub fn from_multi_polygon(mp: &MultiPolygon<f64>) -> Option<Geometry> {
    match mp.0.as_slice() {
        [] => None,
        [single] => Some(Geometry::Polygon(from_geo_polygon(single))),
        parts => Some(Geometry::MultiPolygon {
            polygons: parts.iter().map(from_geo_polygon).collect(),
        }),
    }
}

/// Extension trait for Geometry with geo-crate operations
pub trait GeometryExt {
    /// Convert to geo::Geometry
    fn to_geo(&self) -> geo::Geometry<f64>;

    /// Area-weighted centroid; the point itself for a Point
    fn centroid(&self) -> Option<LatLon>;

    /// GeoJSON representation, e.g. for a map preview or a request payload
    fn to_geojson(&self) -> geojson::Geometry;
}

impl GeometryExt for Geometry {
    fn to_geo(&self) -> geo::Geometry<f64> {
        to_geo_geometry(self)
    }

    fn centroid(&self) -> Option<LatLon> {
        Centroid::centroid(&self.to_geo()).map(|p| LatLon::new(p.y(), p.x()))
    }

    fn to_geojson(&self) -> geojson::Geometry {
        geojson::Geometry::new(geojson::Value::from(&self.to_geo()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(lat0: f64, lon0: f64, size: f64) -> Polygon {
        Polygon::from_exterior(&[
            (lat0, lon0),
            (lat0, lon0 + size),
            (lat0 + size, lon0 + size),
            (lat0 + size, lon0),
            (lat0, lon0),
        ])
    }

    #[test]
    fn test_point_axis_order() {
        let geom = Geometry::point(-8.5, 115.0);
        match geom.to_geo() {
            geo::Geometry::Point(p) => {
                assert_eq!(p.x(), 115.0);
                assert_eq!(p.y(), -8.5);
            }
            other => panic!("expected point, got {other:?}"),
        }
    }

    #[test]
    fn test_polygon_roundtrip() {
        let poly = square(10.0, 20.0, 1.0);
        let back = from_geo_polygon(&to_geo_polygon(&poly));
        assert_eq!(back, poly);
    }

    #[test]
    fn test_from_multi_polygon_collapses_single_part() {
        let single = MultiPolygon::new(vec![to_geo_polygon(&square(0.0, 0.0, 1.0))]);
        assert_eq!(from_multi_polygon(&single).unwrap().geometry_type(), GeometryType::Polygon);

        let double = MultiPolygon::new(vec![
            to_geo_polygon(&square(0.0, 0.0, 1.0)),
            to_geo_polygon(&square(5.0, 5.0, 1.0)),
        ]);
        assert_eq!(
            from_multi_polygon(&double).unwrap().geometry_type(),
            GeometryType::MultiPolygon
        );

        assert!(from_multi_polygon(&MultiPolygon::new(vec![])).is_none());
    }

    #[test]
    fn test_centroid() {
        let centroid = Geometry::Polygon(square(0.0, 0.0, 2.0)).centroid().unwrap();
        assert!((centroid.lat - 1.0).abs() < 1e-10);
        assert!((centroid.lon - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_to_geojson() {
        let json = serde_json::to_value(Geometry::point(1.5, 2.5).to_geojson()).unwrap();
        assert_eq!(json["type"], "Point");
        assert_eq!(json["coordinates"][0], 2.5);
        assert_eq!(json["coordinates"][1], 1.5);
    }
}
