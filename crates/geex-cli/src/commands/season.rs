//! Season command implementation

use anyhow::{bail, Result};
use chrono::Datelike;
use geex_core::models::DateWindow;

use crate::cli::{SeasonArgs, SeasonCommand, SeasonCheckArgs};
use crate::output::OutputWriter;
use crate::output_types::SeasonOutput;

pub fn execute(args: SeasonArgs, output: &OutputWriter) -> Result<()> {
    match args.command {
        SeasonCommand::Check(check) => check_day(check, output),
    }
}

fn check_day(args: SeasonCheckArgs, output: &OutputWriter) -> Result<()> {
    let year = args.date.map(|d| d.year()).unwrap_or(2000);
    let window = DateWindow::new(year, year, args.start_doy, args.end_doy);
    window.validate()?;

    let day = match (args.day, args.date) {
        (Some(day), _) if !(1..=366).contains(&day) => {
            bail!("Day of year must be in 1-366, got {}", day)
        }
        (Some(day), _) => Some(day),
        (None, Some(date)) => Some(date.ordinal() as u16),
        (None, None) => None,
    };

    let result = SeasonOutput {
        start_doy: args.start_doy,
        end_doy: args.end_doy,
        crosses_year_boundary: window.crosses_year_boundary(),
        doy_ranges: window.doy_ranges(),
        day_of_year: day,
        within_season: day.map(|d| window.includes_day(d)),
    };

    if output.is_json() {
        return output.result(result);
    }

    output.section(format!("Season day {} to day {}", result.start_doy, result.end_doy));
    output.kv("Crosses New Year", if result.crosses_year_boundary { "yes" } else { "no" });
    let ranges: Vec<String> =
        result.doy_ranges.iter().map(|(a, b)| format!("{}-{}", a, b)).collect();
    output.kv("Day ranges", ranges.join(", "));

    if let (Some(day), Some(within)) = (result.day_of_year, result.within_season) {
        if within {
            output.success(format!("Day {} is in season", day));
        } else {
            output.info(format!("Day {} is out of season", day));
        }
    }
    Ok(())
}
