//! Administrative boundary lookup
//!
//! Boundaries are keyed by country (ISO code or name) and, optionally, a
//! first-level region name. Matching ignores case and surrounding
//! whitespace.

use std::fs;
use std::path::{Path, PathBuf};

use geo::MultiPolygon;
use geojson::GeoJson;

use crate::ops::{collect_polygons, union_all};
use geex_core::error::{GeexError, Result};

const COUNTRY_CODE_KEYS: &[&str] = &["GID_0", "ISO_A3", "ADM0_A3", "ISO"];
const COUNTRY_NAME_KEYS: &[&str] = &["COUNTRY", "NAME_0", "ADMIN", "ADM0_NAME"];
const REGION_KEYS: &[&str] = &["NAME_1", "ADM1_NAME"];

/// Port for administrative boundary data
pub trait BoundaryLookup {
    /// Boundary of `country`, or of `region` within it.
    ///
    /// `Ok(None)` means no match. Without a region the whole country is
    /// returned.
    fn lookup(&self, country: &str, region: Option<&str>) -> Result<Option<MultiPolygon<f64>>>;
}

/// One boundary feature
#[derive(Debug, Clone)]
pub struct BoundaryRecord {
    pub country_code: String,
    pub country_name: Option<String>,
    /// First-level region; `None` for a country outline
    pub region: Option<String>,
    pub geometry: MultiPolygon<f64>,
}

impl BoundaryRecord {
    fn matches_country(&self, query: &str) -> bool {
        let query = query.trim();
        self.country_code.eq_ignore_ascii_case(query)
            || self.country_name.as_deref().is_some_and(|name| eq_ignore_case(name, query))
    }

    fn matches_region(&self, query: &str) -> bool {
        self.region.as_deref().is_some_and(|region| eq_ignore_case(region, query.trim()))
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.to_lowercase()
}

/// In-memory boundary table
#[derive(Debug, Clone, Default)]
pub struct MemoryBoundaryLookup {
    records: Vec<BoundaryRecord>,
}

impl MemoryBoundaryLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: BoundaryRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct country codes, sorted
    pub fn countries(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.records.iter().map(|r| r.country_code.clone()).collect();
        codes.sort();
        codes.dedup();
        codes
    }

    /// Region names of one country, sorted
    pub fn regions(&self, country: &str) -> Vec<String> {
        let mut regions: Vec<String> = self
            .records
            .iter()
            .filter(|r| r.matches_country(country))
            .filter_map(|r| r.region.clone())
            .collect();
        regions.sort();
        regions.dedup();
        regions
    }

    /// Build a table from a GeoJSON FeatureCollection with GADM-style
    /// properties. Features without a country code or area are skipped.
    pub fn from_geojson_str(content: &str) -> Result<Self> {
        let geojson: GeoJson = content.parse().map_err(|e| GeexError::FormatError {
            format: "GeoJSON".to_string(),
            message: format!("Failed to parse boundary file: {}", e),
        })?;

        let features = match geojson {
            GeoJson::FeatureCollection(fc) => fc.features,
            GeoJson::Feature(feature) => vec![feature],
            GeoJson::Geometry(_) => {
                return Err(GeexError::FormatError {
                    format: "GeoJSON".to_string(),
                    message: "Boundary file must contain features with properties".to_string(),
                })
            }
        };

        let mut table = Self::new();
        for feature in features {
            let Some(country_code) = string_property(&feature, COUNTRY_CODE_KEYS) else {
                tracing::warn!("Skipping boundary feature without a country code");
                continue;
            };
            let country_name = string_property(&feature, COUNTRY_NAME_KEYS);
            let region = string_property(&feature, REGION_KEYS);

            let collection: geo::GeometryCollection<f64> =
                match geojson::quick_collection(&GeoJson::Feature(feature)) {
                    Ok(collection) => collection,
                    Err(e) => {
                        tracing::warn!("Skipping boundary feature {}: {}", country_code, e);
                        continue;
                    }
                };
            let polygons = match collect_polygons(collection.0) {
                Ok(polygons) if !polygons.is_empty() => polygons,
                _ => {
                    tracing::warn!("Skipping boundary feature {} without area", country_code);
                    continue;
                }
            };

            table.insert(BoundaryRecord {
                country_code,
                country_name,
                region,
                geometry: MultiPolygon::new(polygons),
            });
        }

        Ok(table)
    }
}

fn string_property(feature: &geojson::Feature, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| feature.property(key).and_then(|v| v.as_str()))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl BoundaryLookup for MemoryBoundaryLookup {
    fn lookup(&self, country: &str, region: Option<&str>) -> Result<Option<MultiPolygon<f64>>> {
        let in_country: Vec<&BoundaryRecord> =
            self.records.iter().filter(|r| r.matches_country(country)).collect();

        let selected: Vec<&BoundaryRecord> = match region {
            Some(region) => in_country.into_iter().filter(|r| r.matches_region(region)).collect(),
            None => {
                // Prefer a country outline; otherwise merge its regions
                let outlines: Vec<&BoundaryRecord> =
                    in_country.iter().copied().filter(|r| r.region.is_none()).collect();
                if outlines.is_empty() {
                    in_country
                } else {
                    outlines
                }
            }
        };

        if selected.is_empty() {
            return Ok(None);
        }

        let polygons = selected.iter().flat_map(|r| r.geometry.0.iter().cloned()).collect();
        Ok(Some(union_all(polygons)))
    }
}

/// Boundary table loaded from a GeoJSON file on disk
#[derive(Debug, Clone)]
pub struct GeoJsonBoundaryLookup {
    path: PathBuf,
    table: MemoryBoundaryLookup,
}

impl GeoJsonBoundaryLookup {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = fs::read_to_string(&path)?;
        let table = MemoryBoundaryLookup::from_geojson_str(&content)?;
        tracing::info!("Loaded {} boundary features from {}", table.len(), path.display());
        Ok(Self { path, table })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table(&self) -> &MemoryBoundaryLookup {
        &self.table
    }
}

impl BoundaryLookup for GeoJsonBoundaryLookup {
    fn lookup(&self, country: &str, region: Option<&str>) -> Result<Option<MultiPolygon<f64>>> {
        self.table.lookup(country, region)
    }
}
