//! Day-of-year season predicate.
//!
//! A season is an inclusive day-of-year window. When the start day comes
//! after the end day the window wraps across the year boundary, e.g. 330..60
//! covers late November through early March.

/// Whether `day_of_year` (1..=366) falls inside the season `start_doy..=end_doy`.
///
/// Equal bounds select exactly that one day, never the whole year.
pub fn is_within_season(day_of_year: u16, start_doy: u16, end_doy: u16) -> bool {
    if start_doy <= end_doy {
        start_doy <= day_of_year && day_of_year <= end_doy
    } else {
        day_of_year >= start_doy || day_of_year <= end_doy
    }
}

/// True when the season spans the turn of the year (start after end).
pub fn crosses_year_boundary(start_doy: u16, end_doy: u16) -> bool {
    start_doy > end_doy
}
