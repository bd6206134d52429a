//! Canonical region-of-interest geometry.
//!
//! Every accepted input (coordinate pair, vector upload, administrative
//! boundary) is normalized into one of these variants. Coordinates are WGS84
//! latitude/longitude; conversions to the `geo` crate live in `geex-geo`.

use serde::{Deserialize, Serialize};

use crate::error::{GeexError, Result};

/// A WGS84 position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Within WGS84 bounds and finite
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Polygon as ordered rings; the first ring is the exterior, the rest holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub rings: Vec<Vec<LatLon>>,
}

impl Polygon {
    pub fn new(rings: Vec<Vec<LatLon>>) -> Self {
        Self { rings }
    }

    /// Polygon from a single exterior ring of (lat, lon) pairs
    pub fn from_exterior(ring: &[(f64, f64)]) -> Self {
        Self::new(vec![ring.iter().map(|&(lat, lon)| LatLon::new(lat, lon)).collect()])
    }

    pub fn exterior(&self) -> &[LatLon] {
        self.rings.first().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn interiors(&self) -> &[Vec<LatLon>] {
        self.rings.get(1..).unwrap_or(&[])
    }

    fn validate(&self, location: &str) -> Result<()> {
        if self.rings.is_empty() {
            return Err(invalid(format!("{} has no exterior ring", location)));
        }
        for (i, ring) in self.rings.iter().enumerate() {
            let ring_name = if i == 0 {
                format!("{} exterior", location)
            } else {
                format!("{} interior[{}]", location, i - 1)
            };
            validate_ring(ring, &ring_name)?;
        }
        Ok(())
    }
}

fn validate_ring(ring: &[LatLon], location: &str) -> Result<()> {
    if ring.len() < 4 {
        return Err(invalid(format!(
            "{} must have at least 4 points, found {}",
            location,
            ring.len()
        )));
    }
    if ring.first() != ring.last() {
        return Err(invalid(format!(
            "{} must be closed (first point == last point)",
            location
        )));
    }
    if let Some((i, p)) = ring.iter().enumerate().find(|(_, p)| !p.is_valid()) {
        return Err(invalid(format!(
            "{}[{}] ({}, {}) is outside WGS84 bounds",
            location, i, p.lat, p.lon
        )));
    }
    Ok(())
}

fn invalid(reason: String) -> GeexError {
    GeexError::InvalidGeometry { reason }
}

/// Geometry type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryType {
    Point,
    Polygon,
    MultiPolygon,
}

/// Axis-aligned bounding box in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl Bounds {
    fn of_point(p: &LatLon) -> Self {
        Self { min_lat: p.lat, min_lon: p.lon, max_lat: p.lat, max_lon: p.lon }
    }

    fn extend(&mut self, p: &LatLon) {
        self.min_lat = self.min_lat.min(p.lat);
        self.min_lon = self.min_lon.min(p.lon);
        self.max_lat = self.max_lat.max(p.lat);
        self.max_lon = self.max_lon.max(p.lon);
    }

    /// Center of the box, handy for centring a preview map
    pub fn center(&self) -> LatLon {
        LatLon::new((self.min_lat + self.max_lat) / 2.0, (self.min_lon + self.max_lon) / 2.0)
    }
}

/// Region of interest, immutable once normalized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point(LatLon),
    Polygon(Polygon),
    MultiPolygon { polygons: Vec<Polygon> },
}

impl Geometry {
    pub fn point(lat: f64, lon: f64) -> Self {
        Geometry::Point(LatLon::new(lat, lon))
    }

    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Geometry::Point(_) => GeometryType::Point,
            Geometry::Polygon(_) => GeometryType::Polygon,
            Geometry::MultiPolygon { .. } => GeometryType::MultiPolygon,
        }
    }

    /// Check WGS84 bounds and ring structure.
    ///
    /// Rings must be closed and hold at least 4 points; a multipolygon must
    /// hold at least one polygon.
    pub fn validate(&self) -> Result<()> {
        match self {
            Geometry::Point(p) => {
                if p.is_valid() {
                    Ok(())
                } else {
                    Err(invalid(format!("Point ({}, {}) is outside WGS84 bounds", p.lat, p.lon)))
                }
            }
            Geometry::Polygon(poly) => poly.validate("Polygon"),
            Geometry::MultiPolygon { polygons } => {
                if polygons.is_empty() {
                    return Err(invalid("MultiPolygon has no polygons".to_string()));
                }
                for (i, poly) in polygons.iter().enumerate() {
                    poly.validate(&format!("MultiPolygon[{}]", i))?;
                }
                Ok(())
            }
        }
    }

    /// All positions, exterior rings first
    pub fn positions(&self) -> Box<dyn Iterator<Item = &LatLon> + '_> {
        match self {
            Geometry::Point(p) => Box::new(std::iter::once(p)),
            Geometry::Polygon(poly) => Box::new(poly.rings.iter().flatten()),
            Geometry::MultiPolygon { polygons } => {
                Box::new(polygons.iter().flat_map(|poly| poly.rings.iter().flatten()))
            }
        }
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let mut positions = self.positions();
        let mut bounds = Bounds::of_point(positions.next()?);
        for p in positions {
            bounds.extend(p);
        }
        Some(bounds)
    }
}
