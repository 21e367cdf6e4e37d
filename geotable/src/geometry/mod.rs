//! Basic geometry primitives for alignment reports.
//!
//! Plan coordinates use `x` for easting and `y` for northing. Directions are
//! azimuths in radians: 0 points north and angles grow clockwise, so a
//! direction of `FRAC_PI_2` points east.

use std::f64::consts::{PI, TAU};

pub mod curves;
pub use curves::{ArcQuantities, SpiralQuantities};

/// Cross product denominator below which two rays are treated as parallel.
pub const PARALLEL_EPSILON: f64 = 1e-10;

/// Rays whose directions differ by less than this many radians (modulo π)
/// are also treated as parallel.
pub const PARALLEL_ANGLE_EPSILON: f64 = 1e-9;

/// Representation of a 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Representation of a 3D point.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Drops the elevation.
    pub fn plan(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Calculates the Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

/// Unit vector `(dx, dy)` for an azimuth.
pub fn direction_vector(azimuth: f64) -> (f64, f64) {
    (azimuth.sin(), azimuth.cos())
}

/// Azimuth from `a` to `b`.
pub fn azimuth_between(a: Point, b: Point) -> f64 {
    normalize_azimuth((b.x - a.x).atan2(b.y - a.y))
}

/// Wraps an angle into `[0, 2π)`.
pub fn normalize_azimuth(azimuth: f64) -> f64 {
    let a = azimuth % TAU;
    if a < 0.0 {
        a + TAU
    } else {
        a
    }
}

/// Reverses a direction.
pub fn back_azimuth(azimuth: f64) -> f64 {
    normalize_azimuth(azimuth + PI)
}

/// Computes a new point from a start point, an azimuth and a distance.
pub fn forward(start: Point, azimuth: f64, distance: f64) -> Point {
    let (dx, dy) = direction_vector(azimuth);
    Point::new(start.x + distance * dx, start.y + distance * dy)
}

/// Point offset perpendicular to `azimuth`; positive offsets fall to the right.
pub fn offset_point(base: Point, azimuth: f64, offset: f64) -> Point {
    forward(base, azimuth + PI / 2.0, offset)
}

/// Intersects two rays `p1 + t·d1` and `p2 + u·d2` given by anchor points and
/// azimuths. Returns `None` when the cross product denominator is within
/// [`PARALLEL_EPSILON`] of zero or the directions are within
/// [`PARALLEL_ANGLE_EPSILON`] of parallel.
pub fn intersect_rays(p1: Point, azimuth1: f64, p2: Point, azimuth2: f64) -> Option<Point> {
    let (dx1, dy1) = direction_vector(azimuth1);
    let (dx2, dy2) = direction_vector(azimuth2);
    let denom = dx1 * dy2 - dy1 * dx2;
    if denom.abs() <= PARALLEL_EPSILON || denom.abs().min(1.0).asin() < PARALLEL_ANGLE_EPSILON {
        return None;
    }
    let diff_x = p2.x - p1.x;
    let diff_y = p2.y - p1.y;
    let t = (diff_x * dy2 - diff_y * dx2) / denom;
    Some(Point::new(p1.x + t * dx1, p1.y + t * dy1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn distance_works() {
        assert_eq!(distance(Point::new(0.0, 0.0), Point::new(3.0, 4.0)), 5.0);
    }

    #[test]
    fn azimuth_is_measured_from_north() {
        let o = Point::new(0.0, 0.0);
        assert!(azimuth_between(o, Point::new(0.0, 10.0)).abs() < 1e-12);
        assert!((azimuth_between(o, Point::new(10.0, 0.0)) - FRAC_PI_2).abs() < 1e-12);
        assert!((azimuth_between(o, Point::new(-10.0, 0.0)) - 3.0 * FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn forward_east() {
        let p = forward(Point::new(1.0, 1.0), FRAC_PI_2, 2.0);
        assert!((p.x - 3.0).abs() < 1e-12);
        assert!((p.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn positive_offset_is_right_of_travel() {
        let p = offset_point(Point::new(0.0, 0.0), 0.0, 5.0);
        assert!((p.x - 5.0).abs() < 1e-12);
        assert!(p.y.abs() < 1e-12);
    }

    #[test]
    fn rays_intersect() {
        let int = intersect_rays(Point::new(0.0, 0.0), 0.0, Point::new(10.0, 5.0), 3.0 * FRAC_PI_2)
            .unwrap();
        assert!(int.x.abs() < 1e-9);
        assert!((int.y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn parallel_rays_do_not_intersect() {
        let a = intersect_rays(Point::new(0.0, 0.0), 0.3, Point::new(5.0, 0.0), 0.3 + 1e-12);
        assert!(a.is_none());
        let nearly = intersect_rays(Point::new(0.0, 0.0), 0.3, Point::new(5.0, 0.0), 0.3 + 5e-10);
        assert!(nearly.is_none());
        let b = intersect_rays(Point::new(0.0, 0.0), 0.3, Point::new(5.0, 0.0), 0.3 + PI);
        assert!(b.is_none());
    }

    #[test]
    fn normalize_wraps_negative() {
        assert!((normalize_azimuth(-FRAC_PI_2) - 3.0 * FRAC_PI_2).abs() < 1e-12);
        assert!((normalize_azimuth(TAU + 0.5) - 0.5).abs() < 1e-12);
    }
}
