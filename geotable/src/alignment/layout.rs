//! Geometric alignment source that evaluates its own elements.
//!
//! Tangents are evaluated linearly, arcs by rotation about the centre and
//! spirals with Fresnel integrals. The layout helpers build elements from a
//! start point, direction and length so tests and JSON documents can lay out
//! an alignment without precomputing end coordinates.

use std::f64::consts::{FRAC_PI_2, PI};

use log::warn;

use crate::error::{GeoTableError, Result};
use crate::geometry::{
    azimuth_between, forward, normalize_azimuth, offset_point, Point, Point3,
};
use crate::normalize::{AlignmentElement, NormalizedAlignment};

use super::{
    is_straight, AlignmentSource, ArcElement, HorizontalElement, ProfileElement, SpiralElement,
    TangentElement,
};

/// Slack when locating the element that contains a station.
const STATION_EPSILON: f64 = 1e-6;

/// Alignment held entirely in memory.
#[derive(Debug, Clone)]
pub struct LayoutAlignment {
    name: String,
    description: Option<String>,
    horizontal: Vec<HorizontalElement>,
    profile: Option<Vec<ProfileElement>>,
    pieces: NormalizedAlignment,
}

impl LayoutAlignment {
    /// Prepares the elements for station lookups. Elements that fail
    /// validation are kept as given, so the row builder can report them, but
    /// contribute no span to the station lookup.
    pub fn new(name: impl Into<String>, horizontal: Vec<HorizontalElement>) -> Self {
        let name = name.into();
        let mut valid = Vec::with_capacity(horizontal.len());
        let horizontal = horizontal
            .into_iter()
            .map(|e| match e.validated() {
                Ok(checked) => {
                    valid.push(checked);
                    checked
                }
                Err(err) => {
                    warn!("{name}: {err}");
                    e
                }
            })
            .collect();
        let pieces = NormalizedAlignment::from_elements(&valid);
        Self {
            name,
            description: None,
            horizontal,
            profile: None,
            pieces,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attaches a profile. Invalid elements are kept for the vertical
    /// report to flag.
    pub fn with_profile(mut self, profile: Vec<ProfileElement>) -> Self {
        let profile = profile
            .into_iter()
            .map(|e| {
                e.validated().unwrap_or_else(|err| {
                    warn!("{}: {err}", self.name);
                    e
                })
            })
            .collect();
        self.profile = Some(profile);
        self
    }

    pub fn horizontal(&self) -> &[HorizontalElement] {
        &self.horizontal
    }

    pub fn profile(&self) -> Option<&[ProfileElement]> {
        self.profile.as_deref()
    }

    /// Plan position and azimuth at a station on the baseline.
    pub fn position_at(&self, station: f64) -> Option<(Point, f64)> {
        if !station.is_finite() {
            return None;
        }
        let piece = self.pieces.iter().find(|e| {
            let (start, end) = (e.start_station(), e.end_station());
            start - STATION_EPSILON <= station && station <= end + STATION_EPSILON
        })?;
        Some(match piece {
            AlignmentElement::Tangent(t) => tangent_position(t, station - t.start_station),
            AlignmentElement::Arc { arc, .. } => arc_position(arc, station - arc.start_station),
            AlignmentElement::Spiral(s) => spiral_position(s, station - s.start_station),
        })
    }

    /// Profile elevation at a station.
    pub fn elevation_at(&self, station: f64) -> Option<f64> {
        let profile = self.profile.as_ref()?;
        profile.iter().find_map(|e| {
            if station < e.start_station() - STATION_EPSILON
                || station > e.end_station() + STATION_EPSILON
            {
                return None;
            }
            Some(match e {
                ProfileElement::Tangent(t) => {
                    t.start_elevation + t.grade * (station - t.start_station)
                }
                ProfileElement::Circular(c) | ProfileElement::ParabolaSymmetric(c) => {
                    c.elevation_at_offset(station - c.start_station)
                }
            })
        })
    }
}

impl AlignmentSource for LayoutAlignment {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn horizontal_elements(&self) -> Result<Vec<HorizontalElement>> {
        Ok(self.horizontal.clone())
    }

    fn profile_elements(&self) -> Result<Vec<ProfileElement>> {
        self.profile
            .clone()
            .ok_or_else(|| GeoTableError::MissingProfile(self.name.clone()))
    }

    fn point_at_station(&self, station: f64, offset: f64) -> Option<Point3> {
        let (p, azimuth) = self.position_at(station)?;
        let plan = offset_point(p, azimuth, offset);
        Some(Point3::new(
            plan.x,
            plan.y,
            self.elevation_at(station).unwrap_or(0.0),
        ))
    }
}

fn tangent_position(tangent: &TangentElement, s: f64) -> (Point, f64) {
    (forward(tangent.start_point, tangent.direction, s), tangent.direction)
}

fn arc_center(arc: &ArcElement) -> Point {
    let side = if arc.clockwise { arc.radius } else { -arc.radius };
    offset_point(arc.start_point, arc.start_direction, side)
}

fn arc_position(arc: &ArcElement, s: f64) -> (Point, f64) {
    let turn = if arc.clockwise { 1.0 } else { -1.0 };
    let center = arc_center(arc);
    let radial = azimuth_between(center, arc.start_point) + turn * s / arc.radius;
    let heading = normalize_azimuth(arc.start_direction + turn * s / arc.radius);
    (forward(center, radial, arc.radius), heading)
}

fn curvature(radius: f64) -> f64 {
    if is_straight(radius) {
        0.0
    } else {
        1.0 / radius
    }
}

/// Evaluates a clothoid `s` units past its start. Curvature varies linearly
/// from the entry to the exit radius and is negative (in the math frame)
/// for a clockwise spiral.
fn spiral_position(spiral: &SpiralElement, s: f64) -> (Point, f64) {
    let sign = if spiral.clockwise { -1.0 } else { 1.0 };
    let k0 = sign * curvature(spiral.radius_in);
    let k1 = sign * curvature(spiral.radius_out);
    let length = spiral.length();
    let kp = if length > 0.0 { (k1 - k0) / length } else { 0.0 };
    let orientation = FRAC_PI_2 - spiral.start_direction;
    let start = spiral.start_point;
    let theta = orientation + k0 * s + 0.5 * kp * s * s;
    let heading = normalize_azimuth(FRAC_PI_2 - theta);

    if kp.abs() < f64::EPSILON {
        if k0.abs() < f64::EPSILON {
            return (forward(start, spiral.start_direction, s), heading);
        }
        let r = 1.0 / k0;
        let cx = start.x - r * orientation.sin();
        let cy = start.y + r * orientation.cos();
        let ang = orientation + k0 * s;
        return (Point::new(cx + r * ang.sin(), cy - r * ang.cos()), heading);
    }

    let alpha = kp / 2.0;
    let beta = k0;
    let delta = orientation - beta * beta / (4.0 * alpha);
    let sign = alpha.signum();
    let z = |x: f64| -> f64 { (2.0 * alpha.abs() / PI).sqrt() * (x + beta / (2.0 * alpha)) };
    let (s0, c0) = fresnel::fresnl(z(0.0));
    let (s1, c1) = fresnel::fresnl(z(s));
    let fac = (PI / (2.0 * alpha.abs())).sqrt();
    let dx = fac * ((c1 - c0) * delta.cos() - sign * (s1 - s0) * delta.sin());
    let dy = fac * ((c1 - c0) * delta.sin() + sign * (s1 - s0) * delta.cos());
    (Point::new(start.x + dx, start.y + dy), heading)
}

/// Lays out a tangent from its start.
pub fn tangent(start_station: f64, start: Point, direction: f64, length: f64) -> TangentElement {
    TangentElement {
        start_station,
        end_station: start_station + length,
        start_point: start,
        end_point: forward(start, direction, length),
        direction,
    }
}

/// Lays out a circular arc from its PC.
pub fn arc(
    start_station: f64,
    start: Point,
    start_direction: f64,
    radius: f64,
    length: f64,
    clockwise: bool,
) -> ArcElement {
    let mut arc = ArcElement {
        start_station,
        end_station: start_station + length,
        start_point: start,
        end_point: start,
        start_direction,
        end_direction: start_direction,
        radius,
        clockwise,
        pi_station: None,
        pi_point: None,
        center_point: None,
    };
    let (end, heading) = arc_position(&arc, length);
    arc.end_point = end;
    arc.end_direction = heading;
    arc
}

/// Lays out a spiral from its start.
pub fn spiral(
    start_station: f64,
    start: Point,
    start_direction: f64,
    radius_in: f64,
    radius_out: f64,
    length: f64,
    clockwise: bool,
) -> SpiralElement {
    let mut spiral = SpiralElement {
        start_station,
        end_station: start_station + length,
        start_point: start,
        end_point: start,
        start_direction,
        end_direction: start_direction,
        radius_in,
        radius_out,
        clockwise,
        a: None,
        spi_point: None,
        spi_station: None,
    };
    let (end, heading) = spiral_position(&spiral, length);
    spiral.end_point = end;
    spiral.end_direction = heading;
    spiral
}
