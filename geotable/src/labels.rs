//! InRoads point labels for element boundaries.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::alignment::SpiralElement;
use crate::normalize::AlignmentElement;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointLabel {
    /// Point of beginning.
    Pob,
    Pi,
    Pc,
    Pt,
    Ts,
    Sc,
    Cs,
    St,
    /// Spiral PI.
    Spi,
    /// Curve centre.
    Cc,
    Pvc,
    Pvi,
    Pvt,
    Error,
}

impl PointLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PointLabel::Pob => "POB",
            PointLabel::Pi => "PI",
            PointLabel::Pc => "PC",
            PointLabel::Pt => "PT",
            PointLabel::Ts => "TS",
            PointLabel::Sc => "SC",
            PointLabel::Cs => "CS",
            PointLabel::St => "ST",
            PointLabel::Spi => "SPI",
            PointLabel::Cc => "CC",
            PointLabel::Pvc => "PVC",
            PointLabel::Pvi => "PVI",
            PointLabel::Pvt => "PVT",
            PointLabel::Error => "ERROR",
        }
    }
}

impl fmt::Display for PointLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Start and end labels of a horizontal element from its neighbours.
pub fn horizontal_labels(
    element: &AlignmentElement,
    index: usize,
    prev: Option<&AlignmentElement>,
    next: Option<&AlignmentElement>,
) -> (PointLabel, PointLabel) {
    match element {
        AlignmentElement::Tangent(_) => {
            let start = if index == 0 {
                PointLabel::Pob
            } else {
                match prev {
                    Some(AlignmentElement::Spiral(_)) => PointLabel::St,
                    Some(AlignmentElement::Arc { .. }) => PointLabel::Pt,
                    _ => PointLabel::Pi,
                }
            };
            let end = match next {
                Some(AlignmentElement::Spiral(_)) => PointLabel::Ts,
                Some(AlignmentElement::Arc { .. }) => PointLabel::Pc,
                _ => PointLabel::Pi,
            };
            (start, end)
        }
        AlignmentElement::Arc { .. } => {
            let start = match prev {
                Some(AlignmentElement::Spiral(_)) => PointLabel::Sc,
                _ => PointLabel::Pc,
            };
            let end = match next {
                Some(AlignmentElement::Spiral(_)) => PointLabel::Cs,
                _ => PointLabel::Pt,
            };
            (start, end)
        }
        AlignmentElement::Spiral(spiral) => {
            if spiral_is_entry(spiral, prev, next) {
                (PointLabel::Ts, PointLabel::Sc)
            } else {
                (PointLabel::Cs, PointLabel::St)
            }
        }
    }
}

/// Whether a spiral leads into a curve. Neighbouring arcs decide first, then
/// the radius shape.
pub fn spiral_is_entry(
    spiral: &SpiralElement,
    prev: Option<&AlignmentElement>,
    next: Option<&AlignmentElement>,
) -> bool {
    let next_is_arc = next.is_some_and(AlignmentElement::is_arc);
    let prev_is_arc = prev.is_some_and(AlignmentElement::is_arc);
    next_is_arc || (!prev_is_arc && spiral.shaped_as_entry())
}

/// Labels of a profile tangent.
pub fn vertical_tangent_labels(index: usize) -> (PointLabel, PointLabel) {
    let start = if index == 0 {
        PointLabel::Pob
    } else {
        PointLabel::Pvt
    };
    (start, PointLabel::Pvc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::{layout, HorizontalElement};
    use crate::geometry::Point;
    use crate::normalize::NormalizedAlignment;

    fn labels_of(elements: Vec<HorizontalElement>) -> Vec<(PointLabel, PointLabel)> {
        let n = NormalizedAlignment::from_elements(&elements);
        (0..n.len())
            .map(|i| {
                let (prev, next) = n.neighbours(i);
                horizontal_labels(&n.elements()[i], i, prev, next)
            })
            .collect()
    }

    fn t(start: f64, len: f64) -> HorizontalElement {
        HorizontalElement::Tangent(layout::tangent(start, Point::new(0.0, start), 0.0, len))
    }

    fn a(start: f64, len: f64) -> HorizontalElement {
        HorizontalElement::Arc(layout::arc(start, Point::new(0.0, start), 0.0, 500.0, len, true))
    }

    fn s(start: f64, len: f64, radius_in: f64, radius_out: f64) -> HorizontalElement {
        HorizontalElement::Spiral(layout::spiral(
            start,
            Point::new(0.0, start),
            0.0,
            radius_in,
            radius_out,
            len,
            true,
        ))
    }

    use PointLabel::*;

    #[test]
    fn simple_curve() {
        let labels = labels_of(vec![t(0.0, 100.0), a(100.0, 50.0), t(150.0, 100.0)]);
        assert_eq!(labels, vec![(Pob, Pc), (Pc, Pt), (Pt, Pi)]);
    }

    #[test]
    fn spiraled_curve() {
        let inf = f64::INFINITY;
        let labels = labels_of(vec![
            t(0.0, 100.0),
            s(100.0, 50.0, inf, 500.0),
            a(150.0, 50.0),
            s(200.0, 50.0, 500.0, inf),
            t(250.0, 100.0),
        ]);
        assert_eq!(labels, vec![(Pob, Ts), (Ts, Sc), (Sc, Cs), (Cs, St), (St, Pi)]);
    }

    #[test]
    fn back_to_back_tangents() {
        let labels = labels_of(vec![t(0.0, 100.0), t(100.0, 100.0)]);
        assert_eq!(labels, vec![(Pob, Pi), (Pi, Pi)]);
    }

    #[test]
    fn spiral_between_tangents_uses_radius_shape() {
        let inf = f64::INFINITY;
        let entry = labels_of(vec![t(0.0, 100.0), s(100.0, 50.0, inf, 500.0), t(150.0, 10.0)]);
        assert_eq!(entry[1], (Ts, Sc));
        let exit = labels_of(vec![t(0.0, 100.0), s(100.0, 50.0, 500.0, inf), t(150.0, 10.0)]);
        assert_eq!(exit[1], (Cs, St));
    }

    #[test]
    fn zero_exit_radius_between_tangents_is_entry() {
        let labels = labels_of(vec![t(0.0, 100.0), s(100.0, 50.0, 500.0, 0.0), t(150.0, 10.0)]);
        assert_eq!(labels[1], (Ts, Sc));
    }

    #[test]
    fn spiral_after_arc_is_exit_even_if_shaped_as_entry() {
        let labels = labels_of(vec![a(0.0, 50.0), s(50.0, 50.0, f64::INFINITY, 800.0)]);
        assert_eq!(labels[1], (Cs, St));
    }

    #[test]
    fn vertical_tangents() {
        assert_eq!(vertical_tangent_labels(0), (Pob, Pvc));
        assert_eq!(vertical_tangent_labels(3), (Pvt, Pvc));
    }

    #[test]
    fn display_names() {
        assert_eq!(Spi.to_string(), "SPI");
        assert_eq!(Pvi.to_string(), "PVI");
    }
}
