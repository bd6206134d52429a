//! Shapefile format reader implementation
//!
//! Uploads usually arrive as a zip bundle (.shp, .shx, .dbf, .prj). The
//! bundle is unpacked into a temporary directory that lives only for the
//! duration of the read. A bare `.shp` path is read in place.

use std::fs;
use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};

use geo::{Contains, Coord, LineString, MultiLineString, MultiPoint, MultiPolygon, Point};
use shapefile::{PolygonRing, Shape};
use zip::ZipArchive;

use super::{VectorLayer, VectorReader, VectorSource};
use crate::transform::{WEB_MERCATOR, WGS84};
use geex_core::error::{GeexError, Result};

/// Shapefile format reader
pub struct ShapefileReader;

impl VectorReader for ShapefileReader {
    fn read(&self, source: &VectorSource) -> Result<VectorLayer> {
        match source {
            VectorSource::Path(path) if has_extension(path, "shp") => {
                read_shapefile(path, source.name())
            }
            VectorSource::Path(path) => {
                let file = fs::File::open(path)?;
                read_zip_bundle(file, source.name())
            }
            VectorSource::Bytes { name, data } => {
                if has_extension(Path::new(name), "shp") {
                    return Err(format_error(
                        "A bare .shp upload lacks its .shx/.dbf/.prj sidecars; upload a zip bundle",
                    ));
                }
                read_zip_bundle(Cursor::new(data.as_slice()), source.name())
            }
        }
    }

    fn format_name(&self) -> &'static str {
        "Shapefile"
    }
}

fn format_error(message: impl Into<String>) -> GeexError {
    GeexError::FormatError { format: "Shapefile".to_string(), message: message.into() }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

fn read_zip_bundle<R: Read + Seek>(reader: R, name: String) -> Result<VectorLayer> {
    let mut archive = ZipArchive::new(reader)
        .map_err(|e| format_error(format!("Failed to open zip archive: {}", e)))?;

    let workdir = tempfile::tempdir()?;
    archive
        .extract(workdir.path())
        .map_err(|e| format_error(format!("Failed to unpack zip archive: {}", e)))?;

    let mut shp_files = find_shp_files(workdir.path())?;
    shp_files.sort();
    let shp_path = match shp_files.as_slice() {
        [] => return Err(format_error("Archive contains no .shp file")),
        [only] => only.clone(),
        [first, ..] => {
            tracing::warn!(
                "Archive holds {} shapefiles, using {}",
                shp_files.len(),
                first.display()
            );
            first.clone()
        }
    };

    read_shapefile(&shp_path, name)
}

fn find_shp_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            found.extend(find_shp_files(&path)?);
        } else if has_extension(&path, "shp") {
            found.push(path);
        }
    }
    Ok(found)
}

fn read_shapefile(shp_path: &Path, name: String) -> Result<VectorLayer> {
    let crs = extract_crs(shp_path)?;

    let shapes = shapefile::read_shapes(shp_path)
        .map_err(|e| format_error(format!("Failed to read {}: {}", shp_path.display(), e)))?;

    let mut geometries = Vec::with_capacity(shapes.len());
    for shape in &shapes {
        if let Some(geometry) = convert_shape(shape)? {
            geometries.push(geometry);
        }
    }

    tracing::debug!(features = geometries.len(), crs, "Read shapefile layer {}", name);

    Ok(VectorLayer { name, crs, geometries })
}

/// CRS of a shapefile from its `.prj` sidecar, defaulting to WGS84
fn extract_crs(shp_path: &Path) -> Result<u32> {
    let prj_path = shp_path.with_extension("prj");
    if !prj_path.exists() {
        tracing::warn!("{} has no .prj file, assuming EPSG:4326", shp_path.display());
        return Ok(WGS84);
    }

    let prj_content = fs::read_to_string(&prj_path)
        .map_err(|e| format_error(format!("Failed to read .prj file: {}", e)))?;

    match parse_epsg_from_wkt(&prj_content) {
        Some(epsg) => Ok(epsg),
        None => {
            tracing::warn!(
                "Could not identify the CRS in {}, assuming EPSG:4326",
                prj_path.display()
            );
            Ok(WGS84)
        }
    }
}

/// Parse an EPSG code from `.prj` WKT
pub fn parse_epsg_from_wkt(wkt: &str) -> Option<u32> {
    let wkt = wkt.trim();

    // The outermost AUTHORITY closes the WKT; nested ones name the datum or spheroid
    const AUTHORITY: &str = "AUTHORITY[\"EPSG\",\"";
    if let Some(start) = wkt.rfind(AUTHORITY) {
        let code_start = start + AUTHORITY.len();
        let code: String = wkt[code_start..].chars().take_while(|c| c.is_ascii_digit()).collect();
        if let Ok(code) = code.parse::<u32>() {
            return Some(code);
        }
    }

    if let Some(start) = wkt.find("EPSG:") {
        let code: String = wkt[start + 5..].chars().take_while(|c| c.is_ascii_digit()).collect();
        if let Ok(code) = code.parse::<u32>() {
            return Some(code);
        }
    }

    // ESRI-flavoured WKT names the system without an authority code
    let upper = wkt.to_ascii_uppercase();
    if upper.starts_with("PROJCS") {
        if upper.contains("WEB_MERCATOR") || upper.contains("POPULAR VISUALISATION") {
            return Some(WEB_MERCATOR);
        }
        return parse_wgs84_utm_zone(&upper);
    }
    if upper.starts_with("GEOGCS") && (upper.contains("WGS_1984") || upper.contains("WGS 84")) {
        return Some(WGS84);
    }

    None
}

/// `WGS_1984_UTM_Zone_33N` style names map to EPSG:326xx / 327xx
fn parse_wgs84_utm_zone(upper: &str) -> Option<u32> {
    const MARKER: &str = "WGS_1984_UTM_ZONE_";
    let start = upper.find(MARKER)? + MARKER.len();
    let rest = &upper[start..];
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    let zone: u32 = digits.parse().ok().filter(|z| (1..=60).contains(z))?;
    match rest[digits.len()..].chars().next()? {
        'N' => Some(32600 + zone),
        'S' => Some(32700 + zone),
        _ => None,
    }
}

fn convert_shape(shape: &Shape) -> Result<Option<geo::Geometry<f64>>> {
    let geometry: geo::Geometry<f64> = match shape {
        Shape::NullShape => return Ok(None),
        Shape::Point(p) => Point::new(p.x, p.y).into(),
        Shape::PointM(p) => Point::new(p.x, p.y).into(),
        Shape::PointZ(p) => Point::new(p.x, p.y).into(),
        Shape::Multipoint(mp) => multi_point(mp.points(), |p| Coord { x: p.x, y: p.y }).into(),
        Shape::MultipointM(mp) => multi_point(mp.points(), |p| Coord { x: p.x, y: p.y }).into(),
        Shape::MultipointZ(mp) => multi_point(mp.points(), |p| Coord { x: p.x, y: p.y }).into(),
        Shape::Polyline(line) => multi_line(line.parts(), |p| Coord { x: p.x, y: p.y }).into(),
        Shape::PolylineM(line) => multi_line(line.parts(), |p| Coord { x: p.x, y: p.y }).into(),
        Shape::PolylineZ(line) => multi_line(line.parts(), |p| Coord { x: p.x, y: p.y }).into(),
        Shape::Polygon(poly) => multi_polygon(poly.rings(), |p| Coord { x: p.x, y: p.y }).into(),
        Shape::PolygonM(poly) => multi_polygon(poly.rings(), |p| Coord { x: p.x, y: p.y }).into(),
        Shape::PolygonZ(poly) => multi_polygon(poly.rings(), |p| Coord { x: p.x, y: p.y }).into(),
        Shape::Multipatch(_) => {
            return Err(GeexError::UnsupportedGeometry { found: "Multipatch".to_string() })
        }
    };
    Ok(Some(geometry))
}

fn multi_point<P>(points: &[P], xy: impl Fn(&P) -> Coord<f64>) -> MultiPoint<f64> {
    MultiPoint::new(points.iter().map(|p| Point::from(xy(p))).collect())
}

fn multi_line<P>(parts: &[Vec<P>], xy: impl Fn(&P) -> Coord<f64>) -> MultiLineString<f64> {
    MultiLineString::new(
        parts.iter().map(|part| LineString::new(part.iter().map(&xy).collect())).collect(),
    )
}

/// Group shapefile rings into polygons.
///
/// Each hole is attached to the outer ring that contains it; a hole no
/// outer ring contains is attached to the preceding outer ring.
fn multi_polygon<P>(rings: &[PolygonRing<P>], xy: impl Fn(&P) -> Coord<f64>) -> MultiPolygon<f64> {
    let mut polygons: Vec<(LineString<f64>, Vec<LineString<f64>>)> = Vec::new();
    let mut holes: Vec<LineString<f64>> = Vec::new();

    for ring in rings {
        let line = LineString::new(ring.points().iter().map(&xy).collect());
        match ring {
            PolygonRing::Outer(_) => polygons.push((line, Vec::new())),
            PolygonRing::Inner(_) => holes.push(line),
        }
    }

    for hole in holes {
        let Some(first) = hole.0.first().copied() else {
            continue;
        };
        let owner = polygons
            .iter()
            .position(|(outer, _)| geo::Polygon::new(outer.clone(), vec![]).contains(&first))
            .or_else(|| polygons.len().checked_sub(1));
        match owner {
            Some(i) => polygons[i].1.push(hole),
            // No outer ring at all; keep the ring as an area of its own
            None => polygons.push((hole, Vec::new())),
        }
    }

    MultiPolygon::new(
        polygons.into_iter().map(|(outer, inners)| geo::Polygon::new(outer, inners)).collect(),
    )
}
