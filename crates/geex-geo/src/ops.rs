//! Areal geometry helpers shared by the normalizer and boundary lookups

use geex_core::error::{GeexError, Result};
use geo::{BooleanOps, MultiPolygon};

/// Type name of a geo geometry, for error messages
pub fn geometry_kind(geometry: &geo::Geometry<f64>) -> &'static str {
    match geometry {
        geo::Geometry::Point(_) => "Point",
        geo::Geometry::Line(_) => "Line",
        geo::Geometry::LineString(_) => "LineString",
        geo::Geometry::Polygon(_) => "Polygon",
        geo::Geometry::MultiPoint(_) => "MultiPoint",
        geo::Geometry::MultiLineString(_) => "MultiLineString",
        geo::Geometry::MultiPolygon(_) => "MultiPolygon",
        geo::Geometry::GeometryCollection(_) => "GeometryCollection",
        geo::Geometry::Rect(_) => "Rect",
        geo::Geometry::Triangle(_) => "Triangle",
    }
}

/// Flatten geometries into their polygons.
///
/// Nested collections are walked. Anything without area (points, lines)
/// is an [`GeexError::UnsupportedGeometry`]; nothing is coerced.
pub fn collect_polygons<I>(geometries: I) -> Result<Vec<geo::Polygon<f64>>>
where
    I: IntoIterator<Item = geo::Geometry<f64>>,
{
    let mut polygons = Vec::new();
    for geometry in geometries {
        push_polygons(geometry, &mut polygons)?;
    }
    Ok(polygons)
}

fn push_polygons(geometry: geo::Geometry<f64>, out: &mut Vec<geo::Polygon<f64>>) -> Result<()> {
    match geometry {
        geo::Geometry::Polygon(p) => out.push(p),
        geo::Geometry::MultiPolygon(mp) => out.extend(mp.0),
        geo::Geometry::Rect(r) => out.push(r.to_polygon()),
        geo::Geometry::Triangle(t) => out.push(t.to_polygon()),
        geo::Geometry::GeometryCollection(gc) => {
            for inner in gc.0 {
                push_polygons(inner, out)?;
            }
        }
        other => {
            return Err(GeexError::UnsupportedGeometry { found: geometry_kind(&other).to_string() })
        }
    }
    Ok(())
}

/// Union of all polygons.
///
/// A single polygon is returned untouched so its vertices stay exactly as
/// read.
pub fn union_all(mut polygons: Vec<geo::Polygon<f64>>) -> MultiPolygon<f64> {
    if polygons.len() <= 1 {
        return MultiPolygon::new(polygons);
    }
    let first = MultiPolygon::new(vec![polygons.remove(0)]);
    polygons.iter().fold(first, |acc, polygon| acc.union(polygon))
}
