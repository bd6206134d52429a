use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{GeexError, Result};
use crate::season::{crosses_year_boundary, is_within_season};

/// Largest day-of-year a season bound may take
pub const MAX_SEASON_DOY: u16 = 365;

/// Year span plus an optional day-of-year season inside each year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start_year: i32,
    pub end_year: i32,
    pub start_day_of_year: u16,
    pub end_day_of_year: u16,
}

impl DateWindow {
    pub fn new(
        start_year: i32,
        end_year: i32,
        start_day_of_year: u16,
        end_day_of_year: u16,
    ) -> Self {
        Self { start_year, end_year, start_day_of_year, end_day_of_year }
    }

    /// Whole years, no season filter
    pub fn full_years(start_year: i32, end_year: i32) -> Self {
        Self::new(start_year, end_year, 1, MAX_SEASON_DOY)
    }

    pub fn validate(&self) -> Result<()> {
        if self.start_year > self.end_year {
            return Err(GeexError::InvalidDateRange {
                reason: format!(
                    "end year ({}) is before start year ({})",
                    self.end_year, self.start_year
                ),
            });
        }
        for (name, doy) in [("start", self.start_day_of_year), ("end", self.end_day_of_year)] {
            if doy > MAX_SEASON_DOY {
                return Err(GeexError::InvalidDateRange {
                    reason: format!(
                        "{} day of year {} is outside 0..={}",
                        name, doy, MAX_SEASON_DOY
                    ),
                });
            }
        }
        Ok(())
    }

    pub fn crosses_year_boundary(&self) -> bool {
        crosses_year_boundary(self.start_day_of_year, self.end_day_of_year)
    }

    /// True when the season covers the whole year, so no day filter is needed
    pub fn is_full_year(&self) -> bool {
        self.start_day_of_year <= 1 && self.end_day_of_year >= MAX_SEASON_DOY
    }

    pub fn includes_day(&self, day_of_year: u16) -> bool {
        is_within_season(day_of_year, self.start_day_of_year, self.end_day_of_year)
    }

    /// Inclusive day ranges a provider-side day-of-year filter needs.
    ///
    /// A wrapping season splits into `[start, 366]` and `[1, end]`. A full
    /// year covers day 366 of leap years as well.
    pub fn doy_ranges(&self) -> Vec<(u16, u16)> {
        if self.is_full_year() {
            return vec![(1, 366)];
        }
        let start = self.start_day_of_year.max(1);
        if !self.crosses_year_boundary() {
            return vec![(start, self.end_day_of_year.max(start))];
        }
        let mut ranges = vec![(start, 366)];
        if self.end_day_of_year >= 1 {
            ranges.push((1, self.end_day_of_year));
        }
        ranges
    }

    /// First and last calendar day covered by the year span
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = NaiveDate::from_ymd_opt(self.start_year, 1, 1)?;
        let last = NaiveDate::from_ymd_opt(self.end_year, 12, 31)?;
        Some((first, last))
    }

    /// Whether an observation on `date` belongs to this window
    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.start_year..=self.end_year).contains(&date.year())
            && (self.is_full_year() || self.includes_day(date.ordinal() as u16))
    }
}
