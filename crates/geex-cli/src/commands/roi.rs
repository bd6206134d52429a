//! Region-of-interest command implementation

use anyhow::{bail, Context, Result};
use geex_core::models::Geometry;
use geex_geo::{GeoJsonBoundaryLookup, GeometryExt, GeometryInput, GeometryNormalizer, VectorSource};

use crate::cli::{RoiArgs, RoiCommand, RoiSelection};
use crate::output::OutputWriter;
use crate::output_types::RoiOutput;

pub fn execute(args: RoiArgs, output: &OutputWriter) -> Result<()> {
    match args.command {
        RoiCommand::Inspect(selection) => inspect(&selection, output),
    }
}

/// Turn the command-line selection into a normalizer input
pub fn geometry_input(selection: &RoiSelection) -> Result<GeometryInput> {
    if let (Some(lat), Some(lon)) = (selection.lat, selection.lon) {
        return Ok(GeometryInput::PointCoordinate { lat, lon });
    }

    if let Some(path) = &selection.file {
        return Ok(match selection.format {
            Some(format) => {
                GeometryInput::VectorFileUpload { source: VectorSource::Path(path.clone()), format }
            }
            None => GeometryInput::from_path(path)?,
        });
    }

    if let Some(country) = &selection.country {
        return Ok(GeometryInput::AdministrativeBoundary {
            country_code: country.clone(),
            admin_level1_name: selection.region.clone(),
        });
    }

    bail!("Choose a region with --lat/--lon, --file or --country")
}

pub fn normalizer(selection: &RoiSelection) -> Result<GeometryNormalizer> {
    let mut normalizer = GeometryNormalizer::new();
    if let Some(path) = &selection.boundaries {
        let lookup = GeoJsonBoundaryLookup::open(path)
            .with_context(|| format!("Failed to load boundaries from {}", path.display()))?;
        normalizer = normalizer.with_boundaries(lookup);
    }
    if let Some(tolerance) = selection.simplify {
        normalizer = normalizer.with_simplify_tolerance(tolerance);
    }
    Ok(normalizer)
}

/// Normalize the selection, returning the geometry and its description
pub fn resolve(selection: &RoiSelection) -> Result<(Geometry, String)> {
    let input = geometry_input(selection)?;
    let geometry = normalizer(selection)?.normalize(&input)?;
    Ok((geometry, input.describe()))
}

fn inspect(selection: &RoiSelection, output: &OutputWriter) -> Result<()> {
    let (geometry, source) = resolve(selection)?;

    let result = RoiOutput {
        source,
        geometry_type: geometry.geometry_type(),
        vertex_count: geometry.positions().count(),
        bounds: geometry.bounds(),
        centroid: geometry.centroid(),
        geojson: geometry.to_geojson(),
    };

    if output.is_json() {
        return output.result(result);
    }

    output.section("Region of interest");
    output.kv("Source", &result.source);
    output.kv("Type", format!("{:?}", result.geometry_type));
    output.kv("Vertices", result.vertex_count);
    if let Some(bounds) = result.bounds {
        output.kv(
            "Bounds",
            format!(
                "lat {:.5} to {:.5}, lon {:.5} to {:.5}",
                bounds.min_lat, bounds.max_lat, bounds.min_lon, bounds.max_lon
            ),
        );
    }
    if let Some(centroid) = result.centroid {
        output.kv("Centroid", format!("({:.5}, {:.5})", centroid.lat, centroid.lon));
    }
    output.kv("GeoJSON", serde_json::to_string(&result.geojson)?);
    Ok(())
}
