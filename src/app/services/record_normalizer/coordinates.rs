//! Coordinate parsing and repair
//!
//! Source coordinates come as separate columns, as one combined
//! `"lat, lon"` cell, with full-width decimal points, or transposed.

use crate::constants::{MAX_LATITUDE, MAX_LONGITUDE};
use once_cell::sync::Lazy;
use regex::Regex;

static NUMBER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?[0-9]+(?:\.[0-9]+)?").expect("valid number pattern"));

/// Coerce a raw string to a float
///
/// Trims, maps full-width digits, minus and decimal point to ASCII, then
/// parses the first `-?digits(.digits)?` substring.
pub fn coerce_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let ascii: String = trimmed.chars().map(to_ascii_numeric).collect();
    let matched = NUMBER_PATTERN.find(&ascii)?;
    matched.as_str().parse::<f64>().ok()
}

fn to_ascii_numeric(c: char) -> char {
    match c {
        '．' => '.',
        '－' | '−' => '-',
        '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32).unwrap_or(c),
        _ => c,
    }
}

/// Split a combined coordinate cell into latitude and longitude
///
/// Splits on commas when present, otherwise on whitespace. Fewer than two
/// parts gives `(None, None)`; extra parts are ignored.
pub fn split_pair(raw: &str) -> (Option<f64>, Option<f64>) {
    let parts: Vec<&str> = if raw.contains(',') {
        raw.split(',').map(str::trim).collect()
    } else {
        raw.split_whitespace().collect()
    };

    if parts.len() < 2 {
        return (None, None);
    }
    (coerce_number(parts[0]), coerce_number(parts[1]))
}

/// Outcome of coordinate validation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoordinateRepair {
    /// Values were already plausible (or absent)
    Unchanged(Option<f64>, Option<f64>),
    /// Latitude and longitude were transposed at the source
    Swapped(f64, f64),
    /// Still out of range after repair; the record must be dropped
    Invalid,
}

/// Swap transposed coordinates and reject anything still out of range
///
/// A pair is swapped when `|lat| > 90` and `|lon| <= 180`. After that, any
/// present value beyond its bound makes the pair invalid.
pub fn repair_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> CoordinateRepair {
    let (lat, lon, swapped) = match (latitude, longitude) {
        (Some(lat), Some(lon)) if lat.abs() > MAX_LATITUDE && lon.abs() <= MAX_LONGITUDE => {
            (Some(lon), Some(lat), true)
        }
        _ => (latitude, longitude, false),
    };

    let lat_ok = lat.is_none_or(|v| v.is_finite() && v.abs() <= MAX_LATITUDE);
    let lon_ok = lon.is_none_or(|v| v.is_finite() && v.abs() <= MAX_LONGITUDE);

    match (lat_ok && lon_ok, swapped, lat, lon) {
        (false, _, _, _) => CoordinateRepair::Invalid,
        (true, true, Some(lat), Some(lon)) => CoordinateRepair::Swapped(lat, lon),
        _ => CoordinateRepair::Unchanged(lat, lon),
    }
}
