//! Station ordering and compound expansion.
//!
//! The normalized list holds only tangents, arcs and spirals. Arcs that came
//! out of a spiral-curve-spiral group keep the group's outer tangent anchors
//! so the PI solver can intersect them.

use log::{debug, warn};

use crate::alignment::{
    validate_arc, validate_spiral, validate_tangent, ArcElement, CompoundElement, ElementKind,
    HorizontalElement, SpiralElement, TangentElement,
};
use crate::error::Result;
use crate::geometry::Point;

/// Outer anchors of the spiral-curve-spiral group an arc came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompoundContext {
    pub ts_point: Point,
    pub ts_station: f64,
    /// Start direction of the entry spiral.
    pub ts_direction: f64,
    pub st_point: Point,
    pub st_station: f64,
    /// End direction of the exit spiral.
    pub st_direction: f64,
}

/// A horizontal element after compound expansion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlignmentElement {
    Tangent(TangentElement),
    Arc {
        arc: ArcElement,
        compound: Option<CompoundContext>,
    },
    Spiral(SpiralElement),
}

impl AlignmentElement {
    pub fn kind(&self) -> ElementKind {
        match self {
            AlignmentElement::Tangent(_) => ElementKind::Tangent,
            AlignmentElement::Arc { .. } => ElementKind::Arc,
            AlignmentElement::Spiral(_) => ElementKind::Spiral,
        }
    }

    pub fn start_station(&self) -> f64 {
        match self {
            AlignmentElement::Tangent(t) => t.start_station,
            AlignmentElement::Arc { arc, .. } => arc.start_station,
            AlignmentElement::Spiral(s) => s.start_station,
        }
    }

    pub fn end_station(&self) -> f64 {
        match self {
            AlignmentElement::Tangent(t) => t.end_station,
            AlignmentElement::Arc { arc, .. } => arc.end_station,
            AlignmentElement::Spiral(s) => s.end_station,
        }
    }

    pub fn as_tangent(&self) -> Option<&TangentElement> {
        match self {
            AlignmentElement::Tangent(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_spiral(&self) -> Option<&SpiralElement> {
        match self {
            AlignmentElement::Spiral(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_arc(&self) -> bool {
        matches!(self, AlignmentElement::Arc { .. })
    }

    /// Re-runs ingestion checks on one element.
    pub fn validated(self) -> Result<Self> {
        Ok(match self {
            AlignmentElement::Tangent(t) => AlignmentElement::Tangent(validate_tangent(t)?),
            AlignmentElement::Arc { arc, compound } => AlignmentElement::Arc {
                arc: validate_arc(arc)?,
                compound,
            },
            AlignmentElement::Spiral(s) => AlignmentElement::Spiral(validate_spiral(s)?),
        })
    }
}

/// Sort key used for station ordering: unresolvable stations sort last.
pub fn station_key(station: f64) -> f64 {
    if station.is_finite() {
        station
    } else {
        f64::INFINITY
    }
}

/// Ordered, expanded horizontal elements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedAlignment {
    elements: Vec<AlignmentElement>,
}

impl NormalizedAlignment {
    /// Sorts the source elements by start station (stable) and expands every
    /// compound into its parts.
    pub fn from_elements(source: &[HorizontalElement]) -> Self {
        let mut sorted: Vec<&HorizontalElement> = source.iter().collect();
        sorted.sort_by(|a, b| station_key(a.start_station()).total_cmp(&station_key(b.start_station())));

        let mut elements = Vec::with_capacity(source.len());
        for element in sorted {
            match element {
                HorizontalElement::Tangent(t) => elements.push(AlignmentElement::Tangent(*t)),
                HorizontalElement::Arc(a) => elements.push(AlignmentElement::Arc {
                    arc: *a,
                    compound: None,
                }),
                HorizontalElement::Spiral(s) => elements.push(AlignmentElement::Spiral(*s)),
                HorizontalElement::Compound(c) => expand_compound(c, &mut elements),
            }
        }
        debug!(
            "Normalized {} source elements into {}",
            source.len(),
            elements.len()
        );
        Self { elements }
    }

    /// Logs adjacent elements whose stations do not meet within `tolerance`.
    pub fn check_continuity(&self, tolerance: f64) -> usize {
        let mut gaps = 0;
        for pair in self.elements.windows(2) {
            let (end, start) = (pair[0].end_station(), pair[1].start_station());
            let gap = (end - start).abs();
            if gap.is_nan() || gap > tolerance {
                warn!("Station gap between {end:.4} and {start:.4}");
                gaps += 1;
            }
        }
        gaps
    }

    pub fn elements(&self) -> &[AlignmentElement] {
        &self.elements
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AlignmentElement> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Previous and next elements around `index`.
    pub fn neighbours(&self, index: usize) -> (Option<&AlignmentElement>, Option<&AlignmentElement>) {
        let prev = index.checked_sub(1).and_then(|i| self.elements.get(i));
        (prev, self.elements.get(index + 1))
    }
}

fn expand_compound(compound: &CompoundElement, out: &mut Vec<AlignmentElement>) {
    let context = match (&compound.spiral_in, &compound.spiral_out) {
        (Some(spiral_in), Some(spiral_out)) => Some(CompoundContext {
            ts_point: spiral_in.start_point,
            ts_station: spiral_in.start_station,
            ts_direction: spiral_in.start_direction,
            st_point: spiral_out.end_point,
            st_station: spiral_out.end_station,
            st_direction: spiral_out.end_direction,
        }),
        _ => None,
    };
    if let Some(s) = compound.spiral_in {
        out.push(AlignmentElement::Spiral(s));
    }
    if let Some(arc) = compound.arc {
        out.push(AlignmentElement::Arc {
            arc,
            compound: context,
        });
    }
    if let Some(s) = compound.spiral_out {
        out.push(AlignmentElement::Spiral(s));
    }
}
