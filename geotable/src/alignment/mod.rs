//! Alignment element model and the [`AlignmentSource`] seam.
//!
//! Horizontal elements are stationed along the baseline; directions are
//! azimuths in radians. Optional host properties stay `Option` so a missing
//! value can fall back to a computed one downstream.

use serde::{Deserialize, Serialize};

use crate::error::{GeoTableError, Result};
use crate::geometry::{ArcQuantities, Point, Point3};

pub mod layout;
pub use layout::LayoutAlignment;

/// Straight tangent between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TangentElement {
    pub start_station: f64,
    pub end_station: f64,
    pub start_point: Point,
    pub end_point: Point,
    pub direction: f64,
}

impl TangentElement {
    pub fn length(&self) -> f64 {
        self.end_station - self.start_station
    }
}

/// Circular curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcElement {
    pub start_station: f64,
    pub end_station: f64,
    pub start_point: Point,
    pub end_point: Point,
    pub start_direction: f64,
    pub end_direction: f64,
    pub radius: f64,
    pub clockwise: bool,
    #[serde(default)]
    pub pi_station: Option<f64>,
    #[serde(default)]
    pub pi_point: Option<Point>,
    #[serde(default)]
    pub center_point: Option<Point>,
}

impl ArcElement {
    pub fn length(&self) -> f64 {
        self.end_station - self.start_station
    }

    pub fn quantities(&self) -> ArcQuantities {
        ArcQuantities::new(self.radius, self.length())
    }
}

/// Clothoid transition spiral. A radius that is infinite or zero marks the
/// straight side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpiralElement {
    pub start_station: f64,
    pub end_station: f64,
    pub start_point: Point,
    pub end_point: Point,
    pub start_direction: f64,
    pub end_direction: f64,
    #[serde(with = "radius_serde", default = "infinite")]
    pub radius_in: f64,
    #[serde(with = "radius_serde", default = "infinite")]
    pub radius_out: f64,
    pub clockwise: bool,
    /// Spiral constant `A` when the host provides it.
    #[serde(default)]
    pub a: Option<f64>,
    #[serde(default)]
    pub spi_point: Option<Point>,
    #[serde(default)]
    pub spi_station: Option<f64>,
}

impl SpiralElement {
    pub fn length(&self) -> f64 {
        self.end_station - self.start_station
    }

    /// Entry shape: a straight start, or a start radius larger than the end
    /// radius. A zero end radius compares as zero.
    pub fn shaped_as_entry(&self) -> bool {
        is_straight(self.radius_in) || self.radius_in > self.radius_out
    }

    /// Radius on the curve side: the exit radius for an entry spiral, the
    /// entry radius for an exit spiral.
    pub fn curve_radius(&self, entry: bool) -> f64 {
        if entry {
            self.radius_out
        } else {
            self.radius_in
        }
    }
}

/// Spiral-curve-spiral group. Each part is optional; its stations span all
/// present parts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompoundElement {
    #[serde(default)]
    pub start_station: f64,
    #[serde(default)]
    pub end_station: f64,
    #[serde(default)]
    pub spiral_in: Option<SpiralElement>,
    #[serde(default)]
    pub arc: Option<ArcElement>,
    #[serde(default)]
    pub spiral_out: Option<SpiralElement>,
}

/// A horizontal element as provided by a source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HorizontalElement {
    Tangent(TangentElement),
    Arc(ArcElement),
    Spiral(SpiralElement),
    Compound(CompoundElement),
}

impl HorizontalElement {
    pub fn start_station(&self) -> f64 {
        match self {
            HorizontalElement::Tangent(t) => t.start_station,
            HorizontalElement::Arc(a) => a.start_station,
            HorizontalElement::Spiral(s) => s.start_station,
            HorizontalElement::Compound(c) => c.start_station,
        }
    }

    pub fn end_station(&self) -> f64 {
        match self {
            HorizontalElement::Tangent(t) => t.end_station,
            HorizontalElement::Arc(a) => a.end_station,
            HorizontalElement::Spiral(s) => s.end_station,
            HorizontalElement::Compound(c) => c.end_station,
        }
    }

    /// Normalises host values once at ingestion. Negative radii become
    /// magnitudes (a negative arc radius turns counter-clockwise), and a
    /// compound with zero stations takes them from its parts.
    pub fn validated(self) -> Result<Self> {
        Ok(match self {
            HorizontalElement::Tangent(t) => HorizontalElement::Tangent(validate_tangent(t)?),
            HorizontalElement::Arc(a) => HorizontalElement::Arc(validate_arc(a)?),
            HorizontalElement::Spiral(s) => HorizontalElement::Spiral(validate_spiral(s)?),
            HorizontalElement::Compound(c) => HorizontalElement::Compound(validate_compound(c)?),
        })
    }
}

fn check_stations(kind: &str, start: f64, end: f64) -> Result<()> {
    if start.is_finite() && end.is_finite() && end < start {
        return Err(GeoTableError::InvalidElement(format!(
            "{kind} ends at {end:.4} before it starts at {start:.4}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_tangent(tangent: TangentElement) -> Result<TangentElement> {
    check_stations("tangent", tangent.start_station, tangent.end_station)?;
    Ok(tangent)
}

pub(crate) fn validate_arc(mut arc: ArcElement) -> Result<ArcElement> {
    check_stations("arc", arc.start_station, arc.end_station)?;
    if arc.radius.is_nan() || arc.radius == 0.0 || arc.radius.is_infinite() {
        return Err(GeoTableError::InvalidElement(format!(
            "arc at station {:.4} has radius {}",
            arc.start_station, arc.radius
        )));
    }
    if arc.radius < 0.0 {
        arc.radius = -arc.radius;
        arc.clockwise = false;
    }
    Ok(arc)
}

pub(crate) fn validate_spiral(mut spiral: SpiralElement) -> Result<SpiralElement> {
    check_stations("spiral", spiral.start_station, spiral.end_station)?;
    spiral.radius_in = spiral.radius_in.abs();
    spiral.radius_out = spiral.radius_out.abs();
    if spiral.radius_in.is_nan() || spiral.radius_out.is_nan() {
        return Err(GeoTableError::InvalidElement(format!(
            "spiral at station {:.4} has an undefined radius",
            spiral.start_station
        )));
    }
    Ok(spiral)
}

fn validate_compound(mut compound: CompoundElement) -> Result<CompoundElement> {
    compound.spiral_in = compound.spiral_in.map(validate_spiral).transpose()?;
    compound.arc = compound.arc.map(validate_arc).transpose()?;
    compound.spiral_out = compound.spiral_out.map(validate_spiral).transpose()?;
    if compound.start_station == 0.0 && compound.end_station == 0.0 {
        let starts = [
            compound.spiral_in.map(|s| s.start_station),
            compound.arc.map(|a| a.start_station),
            compound.spiral_out.map(|s| s.start_station),
        ];
        let ends = [
            compound.spiral_in.map(|s| s.end_station),
            compound.arc.map(|a| a.end_station),
            compound.spiral_out.map(|s| s.end_station),
        ];
        if let Some(start) = starts.iter().flatten().copied().reduce(f64::min) {
            compound.start_station = start;
        }
        if let Some(end) = ends.iter().flatten().copied().reduce(f64::max) {
            compound.end_station = end;
        }
    }
    check_stations("compound", compound.start_station, compound.end_station)?;
    Ok(compound)
}

/// Straight grade between two stations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileTangent {
    pub start_station: f64,
    pub end_station: f64,
    pub start_elevation: f64,
    pub end_elevation: f64,
    /// Grade as a fraction.
    pub grade: f64,
}

impl ProfileTangent {
    pub fn length(&self) -> f64 {
        self.end_station - self.start_station
    }
}

/// Vertical curve around a PVI. Grades are fractions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerticalCurve {
    pub start_station: f64,
    pub end_station: f64,
    pub pvi_station: f64,
    pub pvi_elevation: f64,
    pub grade_in: f64,
    pub grade_out: f64,
    pub length: f64,
    #[serde(default)]
    pub start_elevation: Option<f64>,
    #[serde(default)]
    pub end_elevation: Option<f64>,
}

impl VerticalCurve {
    pub fn grade_change(&self) -> f64 {
        self.grade_out - self.grade_in
    }

    /// PVC elevation from the PVI, unless the source supplied it.
    pub fn pvc_elevation(&self) -> f64 {
        self.start_elevation
            .unwrap_or(self.pvi_elevation - self.grade_in * self.length / 2.0)
    }

    /// PVT elevation from the source, else projected from the PVI.
    pub fn pvt_elevation(&self) -> f64 {
        self.end_elevation
            .unwrap_or(self.pvi_elevation + self.grade_out * self.length / 2.0)
    }

    /// Elevation on the parabola `x` units past the PVC.
    pub fn elevation_at_offset(&self, x: f64) -> f64 {
        let rate = if self.length > 0.0 {
            self.grade_change() / self.length
        } else {
            0.0
        };
        self.pvc_elevation() + self.grade_in * x + 0.5 * rate * x * x
    }
}

/// Types of vertical alignment elements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProfileElement {
    Tangent(ProfileTangent),
    Circular(VerticalCurve),
    ParabolaSymmetric(VerticalCurve),
}

impl ProfileElement {
    pub fn start_station(&self) -> f64 {
        match self {
            ProfileElement::Tangent(t) => t.start_station,
            ProfileElement::Circular(c) | ProfileElement::ParabolaSymmetric(c) => c.start_station,
        }
    }

    pub fn end_station(&self) -> f64 {
        match self {
            ProfileElement::Tangent(t) => t.end_station,
            ProfileElement::Circular(c) | ProfileElement::ParabolaSymmetric(c) => c.end_station,
        }
    }

    /// A curve with no length takes it from its stations.
    pub fn validated(self) -> Result<Self> {
        let fix = |mut c: VerticalCurve| -> Result<VerticalCurve> {
            check_stations("vertical curve", c.start_station, c.end_station)?;
            if c.length < 0.0 || c.length.is_nan() {
                return Err(GeoTableError::InvalidElement(format!(
                    "vertical curve at station {:.4} has length {}",
                    c.start_station, c.length
                )));
            }
            if c.length == 0.0 {
                c.length = c.end_station - c.start_station;
            }
            Ok(c)
        };
        Ok(match self {
            ProfileElement::Tangent(t) => {
                check_stations("profile tangent", t.start_station, t.end_station)?;
                ProfileElement::Tangent(t)
            }
            ProfileElement::Circular(c) => ProfileElement::Circular(fix(c)?),
            ProfileElement::ParabolaSymmetric(c) => ProfileElement::ParabolaSymmetric(fix(c)?),
        })
    }
}

/// Report element kinds, horizontal and vertical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Tangent,
    Arc,
    Spiral,
    ProfileTangent,
    Circular,
    ParabolaSymmetric,
}

impl ElementKind {
    /// Heading used by the InRoads style reports.
    pub fn display_name(&self) -> &'static str {
        match self {
            ElementKind::Tangent => "Linear",
            ElementKind::Arc => "Circular",
            ElementKind::Spiral => "Clothoid",
            ElementKind::ProfileTangent => "Linear",
            ElementKind::Circular | ElementKind::ParabolaSymmetric => "Parabola",
        }
    }
}

/// Read-only provider of alignment geometry.
pub trait AlignmentSource {
    fn name(&self) -> &str;

    fn description(&self) -> Option<&str> {
        None
    }

    /// All horizontal elements in source order.
    fn horizontal_elements(&self) -> Result<Vec<HorizontalElement>>;

    /// All profile elements; a source without a profile returns
    /// [`GeoTableError::MissingProfile`].
    fn profile_elements(&self) -> Result<Vec<ProfileElement>>;

    /// Position at a station and perpendicular offset, positive to the right.
    fn point_at_station(&self, station: f64, offset: f64) -> Option<Point3>;
}

/// True for an infinite or zero radius.
pub fn is_straight(radius: f64) -> bool {
    radius.is_infinite() || radius == 0.0
}

fn infinite() -> f64 {
    f64::INFINITY
}

/// Serialises infinite radii as `"INF"`; accepts numbers, `"INF"` or `null`.
mod radius_serde {
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_infinite() {
            serializer.serialize_str("INF")
        } else {
            serializer.serialize_f64(*value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Option::<Repr>::deserialize(deserializer)? {
            None => Ok(f64::INFINITY),
            Some(Repr::Number(v)) => Ok(v),
            Some(Repr::Text(t)) if t.trim().eq_ignore_ascii_case("inf") => Ok(f64::INFINITY),
            Some(Repr::Text(t)) => t.trim().parse().map_err(de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arc(radius: f64) -> ArcElement {
        ArcElement {
            start_station: 500.0,
            end_station: 700.0,
            start_point: Point::new(0.0, 500.0),
            end_point: Point::new(63.5, 690.0),
            start_direction: 0.0,
            end_direction: 200.0 / 300.0,
            radius,
            clockwise: true,
            pi_station: None,
            pi_point: None,
            center_point: None,
        }
    }

    fn spiral(start: f64, end: f64, radius_in: f64, radius_out: f64) -> SpiralElement {
        SpiralElement {
            start_station: start,
            end_station: end,
            start_point: Point::default(),
            end_point: Point::default(),
            start_direction: 0.0,
            end_direction: 0.0,
            radius_in,
            radius_out,
            clockwise: true,
            a: None,
            spi_point: None,
            spi_station: None,
        }
    }

    #[test]
    fn negative_radius_turns_left() {
        let e = HorizontalElement::Arc(arc(-300.0)).validated().unwrap();
        match e {
            HorizontalElement::Arc(a) => {
                assert_eq!(a.radius, 300.0);
                assert!(!a.clockwise);
            }
            _ => panic!("expected arc"),
        }
    }

    #[test]
    fn zero_radius_is_rejected() {
        assert!(HorizontalElement::Arc(arc(0.0)).validated().is_err());
    }

    #[test]
    fn reversed_stations_are_rejected() {
        let s = spiral(200.0, 100.0, f64::INFINITY, 500.0);
        assert!(HorizontalElement::Spiral(s).validated().is_err());
    }

    #[test]
    fn compound_derives_stations() {
        let c = CompoundElement {
            start_station: 0.0,
            end_station: 0.0,
            spiral_in: Some(spiral(100.0, 200.0, f64::INFINITY, 500.0)),
            arc: None,
            spiral_out: Some(spiral(300.0, 400.0, 500.0, f64::INFINITY)),
        };
        match HorizontalElement::Compound(c).validated().unwrap() {
            HorizontalElement::Compound(c) => {
                assert_eq!(c.start_station, 100.0);
                assert_eq!(c.end_station, 400.0);
            }
            _ => panic!("expected compound"),
        }
    }

    #[test]
    fn entry_shape() {
        assert!(spiral(0.0, 1.0, f64::INFINITY, 500.0).shaped_as_entry());
        assert!(spiral(0.0, 1.0, 0.0, 500.0).shaped_as_entry());
        assert!(!spiral(0.0, 1.0, 500.0, f64::INFINITY).shaped_as_entry());
        assert!(spiral(0.0, 1.0, 1000.0, 500.0).shaped_as_entry());
        assert!(!spiral(0.0, 1.0, 500.0, 1000.0).shaped_as_entry());
        assert!(spiral(0.0, 1.0, 500.0, 0.0).shaped_as_entry());
    }

    #[test]
    fn infinite_radius_json() {
        let json = r#"{"type":"Spiral","start_station":0.0,"end_station":100.0,
            "start_point":{"x":0.0,"y":0.0},"end_point":{"x":0.0,"y":100.0},
            "start_direction":0.0,"end_direction":0.1,
            "radius_in":"INF","radius_out":500.0,"clockwise":true}"#;
        let e: HorizontalElement = serde_json::from_str(json).unwrap();
        match e {
            HorizontalElement::Spiral(s) => {
                assert!(s.radius_in.is_infinite());
                assert_eq!(s.radius_out, 500.0);
                assert!(s.a.is_none());
            }
            _ => panic!("expected spiral"),
        }
        let back = serde_json::to_string(&e).unwrap();
        assert!(back.contains("\"INF\""));
    }

    #[test]
    fn vertical_curve_elevations() {
        let c = VerticalCurve {
            start_station: 900.0,
            end_station: 1100.0,
            pvi_station: 1000.0,
            pvi_elevation: 110.0,
            grade_in: 0.02,
            grade_out: -0.01,
            length: 200.0,
            start_elevation: None,
            end_elevation: None,
        };
        assert!((c.pvc_elevation() - 108.0).abs() < 1e-9);
        assert!((c.pvt_elevation() - 109.0).abs() < 1e-9);
        assert!((c.elevation_at_offset(200.0) - 109.0).abs() < 1e-9);
    }
}
