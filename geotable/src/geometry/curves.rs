//! Closed-form quantities for circular arcs and clothoid spirals.

use std::f64::consts::PI;

/// Derived values of a circular arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcQuantities {
    /// Central angle in radians.
    pub delta: f64,
    pub tangent: f64,
    pub chord: f64,
    pub middle_ordinate: f64,
    pub external: f64,
    /// Arc definition degree of curvature for a 100 unit chain, in degrees.
    pub degree_of_curvature: f64,
}

impl ArcQuantities {
    /// Computes the arc values from its radius and length. A zero length arc
    /// yields zeros rather than a NaN degree of curvature.
    pub fn new(radius: f64, length: f64) -> Self {
        if radius <= 0.0 || !radius.is_finite() {
            return Self::zero();
        }
        let delta = length / radius;
        let half = delta.abs() / 2.0;
        let degree_of_curvature = if length.abs() > 0.0 {
            100.0 * delta / length * (180.0 / PI)
        } else {
            0.0
        };
        Self {
            delta,
            tangent: radius * half.tan(),
            chord: 2.0 * radius * half.sin(),
            middle_ordinate: radius * (1.0 - half.cos()),
            external: radius * (1.0 / half.cos() - 1.0),
            degree_of_curvature,
        }
    }

    fn zero() -> Self {
        Self {
            delta: 0.0,
            tangent: 0.0,
            chord: 0.0,
            middle_ordinate: 0.0,
            external: 0.0,
            degree_of_curvature: 0.0,
        }
    }
}

/// Derived constants of a clothoid spiral from the truncated series
/// expansions used on InRoads reports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpiralQuantities {
    /// Spiral angle θs in radians.
    pub theta: f64,
    pub xs: f64,
    pub ys: f64,
    pub p: f64,
    pub k: f64,
    pub long_tangent: f64,
    pub short_tangent: f64,
    pub long_chord: f64,
}

impl SpiralQuantities {
    /// Returns `None` for a zero length spiral or a radius that is zero or
    /// infinite, where θs vanishes and the tangents are undefined.
    pub fn new(length: f64, radius: f64) -> Option<Self> {
        if length <= 0.0 || radius <= 0.0 || !radius.is_finite() || !length.is_finite() {
            return None;
        }
        let theta = length / (2.0 * radius);
        let t2 = theta * theta;
        let t3 = t2 * theta;
        let t4 = t3 * theta;
        let t5 = t4 * theta;
        let xs = length * (1.0 - t2 / 10.0 + t4 / 216.0);
        let ys = length * (theta / 3.0 - t3 / 42.0 + t5 / 1320.0);
        Some(Self {
            theta,
            xs,
            ys,
            p: ys - radius * (1.0 - theta.cos()),
            k: xs - radius * theta.sin(),
            long_tangent: xs - ys / theta.tan(),
            short_tangent: ys / theta.sin(),
            long_chord: (xs * xs + ys * ys).sqrt(),
        })
    }
}

/// Spiral constant `A = √(L·R)`.
pub fn spiral_constant(length: f64, radius: f64) -> f64 {
    if radius.is_finite() && radius > 0.0 && length > 0.0 {
        (length * radius).sqrt()
    } else {
        0.0
    }
}
