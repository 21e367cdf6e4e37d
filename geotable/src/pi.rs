//! Point of intersection for circular curves.
//!
//! The PI is found by intersecting the tangent rays on either side of the
//! curve. Tiers run from the outermost tangents inward and stop at the first
//! one whose rays are not parallel.

use log::{debug, warn};

use crate::alignment::{ArcElement, TangentElement};
use crate::geometry::{direction_vector, intersect_rays, Point};
use crate::normalize::{AlignmentElement, CompoundContext};

/// How a PI was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PiMethod {
    /// Tangents at the TS and ST of a spiral-curve-spiral group.
    CompoundTangents,
    /// Tangents adjacent to the entry and exit spirals.
    SpiraledTangents,
    /// Tangents ending at the PC and starting at the PT.
    AdjacentTangents,
    /// The arc's own start and end directions.
    ArcEndpoints,
    /// PI supplied by the source.
    HostPoint,
    /// Projected a tangent length back from the PC.
    BackTangent,
    /// Nothing worked; the point is `(0, 0)`.
    Unresolved,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PiSolution {
    pub point: Point,
    pub method: PiMethod,
}

impl PiSolution {
    fn found(point: Point, method: PiMethod) -> Self {
        debug!("PI resolved by {method:?} at ({:.4}, {:.4})", point.x, point.y);
        Self { point, method }
    }

    pub fn is_resolved(&self) -> bool {
        self.method != PiMethod::Unresolved
    }
}

/// Solves the PI of the arc at `index`. `tolerance` bounds the station
/// mismatch accepted when matching neighbours.
pub fn solve_pi(elements: &[AlignmentElement], index: usize, tolerance: f64) -> PiSolution {
    let Some(AlignmentElement::Arc { arc, compound }) = elements.get(index) else {
        return PiSolution {
            point: Point::default(),
            method: PiMethod::Unresolved,
        };
    };

    if let Some(p) = compound.as_ref().and_then(compound_tangents) {
        return PiSolution::found(p, PiMethod::CompoundTangents);
    }
    if let Some(p) = spiraled_tangents(elements, arc, tolerance) {
        return PiSolution::found(p, PiMethod::SpiraledTangents);
    }
    if let Some(p) = adjacent_tangents(elements, arc, tolerance) {
        return PiSolution::found(p, PiMethod::AdjacentTangents);
    }
    if let Some(p) = intersect_rays(
        arc.start_point,
        arc.start_direction,
        arc.end_point,
        arc.end_direction,
    ) {
        return PiSolution::found(p, PiMethod::ArcEndpoints);
    }
    if let Some(p) = arc.pi_point {
        return PiSolution::found(p, PiMethod::HostPoint);
    }
    if let Some(p) = back_tangent(arc) {
        return PiSolution::found(p, PiMethod::BackTangent);
    }
    warn!("Could not resolve PI for arc at station {:.4}", arc.start_station);
    PiSolution {
        point: Point::default(),
        method: PiMethod::Unresolved,
    }
}

fn compound_tangents(ctx: &CompoundContext) -> Option<Point> {
    intersect_rays(ctx.ts_point, ctx.ts_direction, ctx.st_point, ctx.st_direction)
}

fn near(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() < tolerance
}

fn tangent_ending_at(elements: &[AlignmentElement], station: f64, tolerance: f64) -> Option<&TangentElement> {
    elements
        .iter()
        .filter_map(AlignmentElement::as_tangent)
        .find(|t| near(t.end_station, station, tolerance))
}

fn tangent_starting_at(elements: &[AlignmentElement], station: f64, tolerance: f64) -> Option<&TangentElement> {
    elements
        .iter()
        .filter_map(AlignmentElement::as_tangent)
        .find(|t| near(t.start_station, station, tolerance))
}

fn spiraled_tangents(elements: &[AlignmentElement], arc: &ArcElement, tolerance: f64) -> Option<Point> {
    let spirals = || elements.iter().filter_map(AlignmentElement::as_spiral);
    let entry = spirals().find(|s| near(s.end_station, arc.start_station, tolerance));
    let exit = spirals().find(|s| near(s.start_station, arc.end_station, tolerance));
    if entry.is_none() && exit.is_none() {
        return None;
    }
    let (p1, d1) = match entry {
        Some(s) => {
            let t = tangent_ending_at(elements, s.start_station, tolerance)?;
            (s.start_point, t.direction)
        }
        None => (arc.start_point, arc.start_direction),
    };
    let (p2, d2) = match exit {
        Some(s) => {
            let t = tangent_starting_at(elements, s.end_station, tolerance)?;
            (s.end_point, t.direction)
        }
        None => (arc.end_point, arc.end_direction),
    };
    intersect_rays(p1, d1, p2, d2)
}

fn adjacent_tangents(elements: &[AlignmentElement], arc: &ArcElement, tolerance: f64) -> Option<Point> {
    let entry = tangent_ending_at(elements, arc.start_station, tolerance)?;
    let exit = tangent_starting_at(elements, arc.end_station, tolerance)?;
    intersect_rays(entry.end_point, entry.direction, exit.start_point, exit.direction)
}

fn back_tangent(arc: &ArcElement) -> Option<Point> {
    let t = arc.quantities().tangent;
    let (dx, dy) = direction_vector(arc.start_direction + std::f64::consts::PI);
    let p = Point::new(arc.start_point.x + t * dx, arc.start_point.y + t * dy);
    (p.x.is_finite() && p.y.is_finite()).then_some(p)
}
