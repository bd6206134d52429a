//! CRS normalization to WGS84

use geex_core::error::{GeexError, Result};
use geo::{Coord, MapCoords};
use proj::Proj;

pub const WGS84: u32 = 4326;
pub const WEB_MERCATOR: u32 = 3857;

/// Reproject a geometry from `from_epsg` to WGS84 longitude/latitude
pub fn reproject_to_wgs84(
    geometry: geo::Geometry<f64>,
    from_epsg: u32,
) -> Result<geo::Geometry<f64>> {
    if from_epsg == WGS84 {
        return Ok(geometry);
    }

    let from = format!("EPSG:{}", from_epsg);
    let to = format!("EPSG:{}", WGS84);

    let proj = Proj::new_known_crs(&from, &to, None).map_err(|e| GeexError::Reprojection {
        from_epsg,
        reason: format!("Failed to create projection from {} to {}: {}", from, to, e),
    })?;

    geometry.try_map_coords(|c| {
        proj.convert((c.x, c.y)).map(|(x, y)| Coord { x, y }).map_err(|e| {
            GeexError::Reprojection { from_epsg, reason: format!("Projection failed: {}", e) }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Point;

    fn point(geom: geo::Geometry<f64>) -> Point<f64> {
        match geom {
            geo::Geometry::Point(p) => p,
            other => panic!("expected point, got {other:?}"),
        }
    }

    #[test]
    fn test_wgs84_is_identity() {
        let input = geo::Geometry::Point(Point::new(115.2, -8.65));
        let out = point(reproject_to_wgs84(input, WGS84).unwrap());
        assert_eq!(out, Point::new(115.2, -8.65));
    }

    #[test]
    fn test_web_mercator_origin_and_corner() {
        let origin = point(reproject_to_wgs84(Point::new(0.0, 0.0).into(), WEB_MERCATOR).unwrap());
        assert!(origin.x().abs() < 1e-9);
        assert!(origin.y().abs() < 1e-9);

        // Edge of the Web Mercator square
        let edge = Point::new(20_037_508.342789244, 20_037_508.342789244);
        let corner = point(reproject_to_wgs84(edge.into(), WEB_MERCATOR).unwrap());
        assert!((corner.x() - 180.0).abs() < 1e-6);
        assert!((corner.y() - 85.0511287798).abs() < 1e-6);
    }

    #[test]
    fn test_web_mercator_known_city() {
        // Rome, roughly (12.4964 E, 41.9028 N)
        let rome_m = Point::new(1_391_092.88, 5_146_430.46);
        let rome = point(reproject_to_wgs84(rome_m.into(), WEB_MERCATOR).unwrap());
        assert!((rome.x() - 12.4964).abs() < 1e-3);
        assert!((rome.y() - 41.9028).abs() < 1e-3);
    }

    #[test]
    fn test_utm_central_meridian() {
        // UTM 33N false easting sits on 15 E at the equator
        let out = point(reproject_to_wgs84(Point::new(500_000.0, 0.0).into(), 32633).unwrap());
        assert!((out.x() - 15.0).abs() < 1e-6);
        assert!(out.y().abs() < 1e-6);

        // UTM 37S around Nairobi
        let nairobi_m = Point::new(257_000.0, 9_857_000.0);
        let nairobi = point(reproject_to_wgs84(nairobi_m.into(), 32737).unwrap());
        assert!((nairobi.x() - 36.82).abs() < 0.05);
        assert!((nairobi.y() + 1.29).abs() < 0.05);
    }

    #[test]
    fn test_unknown_epsg_is_reprojection_error() {
        let err = reproject_to_wgs84(Point::new(0.0, 0.0).into(), 999_999).unwrap_err();
        assert!(matches!(err, GeexError::Reprojection { from_epsg: 999_999, .. }));
    }
}
