//! Satellite products and their band vocabularies.
//!
//! Each product is a variant of [`Satellite`] with an associated static band
//! table. Band names the user picks are resolved against that table and
//! mapped to the identifiers the processing service expects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{GeexError, Result};

/// A selectable band: the user-facing name and the provider band id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BandSpec {
    pub name: &'static str,
    pub provider_id: &'static str,
    pub units: &'static str,
    pub description: &'static str,
}

const NDVI_BANDS: &[BandSpec] = &[
    BandSpec {
        name: "NDVI",
        provider_id: "NDVI",
        units: "scaled index (x0.0001)",
        description: "Normalized Difference Vegetation Index, 16-day composite",
    },
    BandSpec {
        name: "EVI",
        provider_id: "EVI",
        units: "scaled index (x0.0001)",
        description: "Enhanced Vegetation Index, 16-day composite",
    },
];

const ERA5_BANDS: &[BandSpec] = &[
    BandSpec {
        name: "temperature",
        provider_id: "temperature_2m",
        units: "K",
        description: "Air temperature at 2 m above the surface",
    },
    BandSpec {
        name: "dewpoint_temperature",
        provider_id: "dewpoint_temperature_2m",
        units: "K",
        description: "Dewpoint temperature at 2 m above the surface",
    },
    BandSpec {
        name: "precipitation",
        provider_id: "total_precipitation_sum",
        units: "m",
        description: "Accumulated liquid and frozen water falling to the surface",
    },
    BandSpec {
        name: "evaporation",
        provider_id: "total_evaporation_sum",
        units: "m of water equivalent",
        description: "Accumulated evaporation from the surface",
    },
    BandSpec {
        name: "soil_moisture",
        provider_id: "volumetric_soil_water_layer_1",
        units: "m3/m3",
        description: "Volumetric soil water, 0-7 cm layer",
    },
    BandSpec {
        name: "surface_pressure",
        provider_id: "surface_pressure",
        units: "Pa",
        description: "Pressure of the atmosphere at the surface",
    },
    BandSpec {
        name: "wind_u",
        provider_id: "u_component_of_wind_10m",
        units: "m/s",
        description: "Eastward wind component at 10 m",
    },
    BandSpec {
        name: "wind_v",
        provider_id: "v_component_of_wind_10m",
        units: "m/s",
        description: "Northward wind component at 10 m",
    },
    BandSpec {
        name: "solar_radiation",
        provider_id: "surface_solar_radiation_downwards_sum",
        units: "J/m2",
        description: "Accumulated downward shortwave radiation at the surface",
    },
];

const CHIRPS_BANDS: &[BandSpec] = &[BandSpec {
    name: "precipitation",
    provider_id: "precipitation",
    units: "mm/day",
    description: "Daily precipitation from satellite and station blending",
}];

/// Satellite / reanalysis product a job extracts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Satellite {
    #[default]
    #[serde(rename = "NDVI")]
    Ndvi,
    #[serde(rename = "ERA5")]
    Era5,
    #[serde(rename = "CHIRPS")]
    Chirps,
}

impl Satellite {
    pub const ALL: [Satellite; 3] = [Satellite::Ndvi, Satellite::Era5, Satellite::Chirps];

    /// Stable identifier, also used in task names and history.
    pub fn id(&self) -> &'static str {
        match self {
            Satellite::Ndvi => "NDVI",
            Satellite::Era5 => "ERA5",
            Satellite::Chirps => "CHIRPS",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Satellite::Ndvi => "MODIS Vegetation Indices (MOD13Q1)",
            Satellite::Era5 => "ERA5-Land Daily Aggregates",
            Satellite::Chirps => "CHIRPS Daily Precipitation",
        }
    }

    /// Earth Engine image collection the job reads from
    pub fn collection_id(&self) -> &'static str {
        match self {
            Satellite::Ndvi => "MODIS/061/MOD13Q1",
            Satellite::Era5 => "ECMWF/ERA5_LAND/DAILY_AGGR",
            Satellite::Chirps => "UCSB-CHG/CHIRPS/DAILY",
        }
    }

    /// Nominal pixel size in meters, used as the reduction scale
    pub fn pixel_size_m(&self) -> u32 {
        match self {
            Satellite::Ndvi => 250,
            Satellite::Era5 => 11132,
            Satellite::Chirps => 5566,
        }
    }

    /// First date with data, ISO-8601
    pub fn start_date(&self) -> &'static str {
        match self {
            Satellite::Ndvi => "2000-02-18",
            Satellite::Era5 => "1950-01-02",
            Satellite::Chirps => "1981-01-01",
        }
    }

    pub fn bands(&self) -> &'static [BandSpec] {
        match self {
            Satellite::Ndvi => NDVI_BANDS,
            Satellite::Era5 => ERA5_BANDS,
            Satellite::Chirps => CHIRPS_BANDS,
        }
    }

    /// Whether the user must pick bands explicitly.
    ///
    /// NDVI processing runs on a fixed band set; the reanalysis and
    /// precipitation products need a selection.
    pub fn requires_band_selection(&self) -> bool {
        !matches!(self, Satellite::Ndvi)
    }

    /// Bands used when no explicit selection is given
    pub fn fixed_bands(&self) -> &'static [BandSpec] {
        match self {
            Satellite::Ndvi => &NDVI_BANDS[..1],
            Satellite::Era5 | Satellite::Chirps => &[],
        }
    }

    /// Look up a band by user-facing name or provider id, ignoring case
    pub fn resolve_band(&self, name: &str) -> Option<&'static BandSpec> {
        let name = name.trim();
        self.bands().iter().find(|band| {
            band.name.eq_ignore_ascii_case(name) || band.provider_id.eq_ignore_ascii_case(name)
        })
    }

    /// Resolve a whole selection to canonical band specs.
    ///
    /// Fails on the first unknown entry, naming it. Repeated entries keep
    /// their first position only.
    pub fn resolve_bands<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<&'static BandSpec>> {
        let mut resolved: Vec<&'static BandSpec> = Vec::with_capacity(names.len());
        for name in names {
            let band = self.resolve_band(name.as_ref()).ok_or_else(|| GeexError::UnknownBand {
                satellite: *self,
                band: name.as_ref().to_string(),
            })?;
            if !resolved.iter().any(|b| b.name == band.name) {
                resolved.push(band);
            }
        }
        Ok(resolved)
    }
}

impl fmt::Display for Satellite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Satellite {
    type Err = GeexError;

    fn from_str(s: &str) -> Result<Self> {
        Satellite::ALL
            .into_iter()
            .find(|sat| sat.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GeexError::ConfigInvalid {
                key: "satellite".to_string(),
                reason: format!("Unknown satellite: {}. Use NDVI, ERA5, or CHIRPS", s),
            })
    }
}
