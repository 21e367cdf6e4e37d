//! Survey formatting helpers: stations, rounding, DMS angles and bearings.
//!
//! Every helper rounds half away from zero, never to even, to match the
//! values printed on legacy InRoads reports.

use crate::geometry::normalize_azimuth;

/// Relative nudge that absorbs binary representation error before rounding,
/// so `1.005` rounds like the decimal it was written as.
const ROUNDING_NUDGE: f64 = 1e-12;

/// Rounds half away from zero at `places` decimals.
pub fn round_half_away(value: f64, places: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(places as i32);
    let scaled = value * factor;
    let nudged = scaled + scaled.signum() * scaled.abs().max(1.0) * ROUNDING_NUDGE;
    nudged.round() / factor
}

/// Formats `value` with `places` decimals. Values within `5·10^-(places+1)`
/// of an integer snap to it (so `24999.99996` prints `25000.0000` at four
/// places); midpoints themselves still round away from zero.
pub fn round_survey(value: f64, places: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    let tolerance = 5.0 / 10f64.powi(places as i32 + 1);
    let noise = f64::EPSILON * value.abs().max(1.0) * 16.0;
    let nearest = value.round();
    let rounded = if (value - nearest).abs() < tolerance - noise {
        nearest
    } else {
        round_half_away(value, places)
    };
    format!("{:.*}", places, positive_zero(rounded))
}

/// Splits a station into its 100 unit chain and the offset rounded to two
/// places. A rounded offset of 100.00 carries into the chain.
pub fn station_parts(station: f64) -> (i64, f64) {
    let mut chain = (station / 100.0).floor();
    let mut offset = round_half_away(station - chain * 100.0, 2);
    if offset >= 100.0 {
        chain += 1.0;
        offset -= 100.0;
    }
    if offset <= 0.0 {
        offset = 0.0;
    }
    (chain as i64, offset)
}

/// Formats a station as `CC+OO.OO`, e.g. `2567.894` becomes `25+67.89`.
pub fn station_format(station: f64) -> String {
    if !station.is_finite() {
        return "--+--.--".to_string();
    }
    let (chain, offset) = station_parts(station);
    format!("{chain:02}+{offset:05.2}")
}

/// Degrees, minutes and seconds of an angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dms {
    pub degrees: u32,
    pub minutes: u32,
    pub seconds: f64,
}

/// Converts decimal degrees to DMS. Degrees and minutes truncate, seconds
/// keep the fraction. The sign is dropped.
pub fn to_dms(degrees: f64) -> Dms {
    let degrees = degrees.abs();
    let d = degrees.trunc();
    let rem = (degrees - d) * 60.0;
    let m = rem.trunc();
    let s = (rem - m) * 60.0;
    Dms {
        degrees: d as u32,
        minutes: m as u32,
        seconds: s,
    }
}

/// Formats decimal degrees as `D°MM'SS.ss"` with `seconds_places` decimals.
/// Seconds that round up to 60 carry into the minutes.
pub fn format_dms(degrees: f64, seconds_places: usize) -> String {
    let dms = to_dms(degrees);
    let mut d = dms.degrees;
    let mut m = dms.minutes;
    let mut s = round_half_away(dms.seconds, seconds_places);
    if s >= 60.0 {
        s -= 60.0;
        m += 1;
    }
    if m >= 60 {
        m -= 60;
        d += 1;
    }
    let width = if seconds_places > 0 { seconds_places + 3 } else { 2 };
    format!(
        "{d}\u{00B0}{m:02}'{s:0width$.prec$}\"",
        s = positive_zero(s),
        width = width,
        prec = seconds_places
    )
}

/// Formats an angle given in radians as DMS.
pub fn format_angle(radians: f64, seconds_places: usize) -> String {
    format_dms(radians.to_degrees(), seconds_places)
}

/// Quadrant of a bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    NorthEast,
    SouthEast,
    SouthWest,
    NorthWest,
}

impl Quadrant {
    pub fn letters(&self) -> (&'static str, &'static str) {
        match self {
            Quadrant::NorthEast => ("N", "E"),
            Quadrant::SouthEast => ("S", "E"),
            Quadrant::SouthWest => ("S", "W"),
            Quadrant::NorthWest => ("N", "W"),
        }
    }
}

/// Maps an azimuth in radians to its quadrant and the acute angle in
/// degrees from the north/south axis.
pub fn quadrant_and_angle(azimuth: f64) -> (Quadrant, f64) {
    let degrees = normalize_azimuth(azimuth).to_degrees();
    if degrees < 90.0 {
        (Quadrant::NorthEast, degrees)
    } else if degrees < 180.0 {
        (Quadrant::SouthEast, 180.0 - degrees)
    } else if degrees < 270.0 {
        (Quadrant::SouthWest, degrees - 180.0)
    } else {
        (Quadrant::NorthWest, 360.0 - degrees)
    }
}

/// Formats an azimuth as a quadrant bearing such as `N 45°00'00.00" E`.
pub fn format_bearing(azimuth: f64, seconds_places: usize) -> String {
    let (quadrant, angle) = quadrant_and_angle(azimuth);
    let (ns, ew) = quadrant.letters();
    format!("{ns} {} {ew}", format_dms(angle, seconds_places))
}

/// Formats a radius; infinite and non-positive radii print `0.0000`.
pub fn format_radius(radius: f64) -> String {
    if radius.is_infinite() || radius <= 0.0 || radius.is_nan() {
        "0.0000".to_string()
    } else {
        round_survey(radius, 4)
    }
}

/// Formats a grade given as a fraction, e.g. `0.0125` becomes `1.250%`.
pub fn format_grade(grade: f64) -> String {
    format!("{}%", round_survey(grade * 100.0, 3))
}

fn positive_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}
