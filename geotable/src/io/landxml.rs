//! LandXML alignment reader.
//!
//! Point text is "northing easting", directions are decimal-degree azimuths
//! and radii may be `INF`.

use std::f64::consts::FRAC_PI_2;
use std::path::Path;

use log::{debug, warn};
use roxmltree::{Document, Node};

use crate::alignment::{
    ArcElement, HorizontalElement, LayoutAlignment, ProfileElement, ProfileTangent, SpiralElement,
    TangentElement, VerticalCurve,
};
use crate::error::{GeoTableError, Result};
use crate::geometry::{azimuth_between, distance, normalize_azimuth, Point};

use super::read_to_string;

/// Reads every `<Alignment>` in a LandXML file.
pub fn read_landxml(path: impl AsRef<Path>) -> Result<Vec<LayoutAlignment>> {
    let xml = read_to_string(path)?;
    parse_landxml(&xml)
}

/// Parses every `<Alignment>` in a LandXML document.
pub fn parse_landxml(xml: &str) -> Result<Vec<LayoutAlignment>> {
    let doc = Document::parse(xml)?;
    let mut alignments = Vec::new();
    for (i, node) in doc
        .descendants()
        .filter(|n| n.has_tag_name("Alignment"))
        .enumerate()
    {
        let name = node
            .attribute("name")
            .map(str::to_owned)
            .unwrap_or_else(|| format!("Alignment {}", i + 1));
        let start_station = number_attr(node, "staStart").unwrap_or(0.0);
        let horizontal = node
            .children()
            .find(|c| c.has_tag_name("CoordGeom"))
            .map(|coord| read_coord_geom(coord, start_station))
            .transpose()?
            .unwrap_or_default();
        debug!("Alignment {name}: {} horizontal elements", horizontal.len());

        let mut layout = LayoutAlignment::new(name, horizontal);
        if let Some(desc) = node.attribute("desc") {
            layout = layout.with_description(desc);
        }
        if let Some(prof_align) = node
            .descendants()
            .find(|n| n.has_tag_name("ProfAlign"))
        {
            let profile = read_prof_align(prof_align)?;
            if !profile.is_empty() {
                layout = layout.with_profile(profile);
            }
        }
        alignments.push(layout);
    }
    if alignments.is_empty() {
        return Err(GeoTableError::MissingAlignment(
            "no <Alignment> in LandXML document".into(),
        ));
    }
    Ok(alignments)
}

fn numbers(text: &str) -> Vec<f64> {
    text.split_whitespace()
        .filter_map(|s| s.parse().ok())
        .collect()
}

fn number_attr(node: Node, name: &str) -> Option<f64> {
    node.attribute(name).and_then(|v| v.trim().parse().ok())
}

/// Radius attribute; `INF` reads as a straight side.
fn radius_attr(node: Node, name: &str) -> Option<f64> {
    let value = node.attribute(name)?.trim();
    if value.eq_ignore_ascii_case("INF") {
        Some(f64::INFINITY)
    } else {
        value.parse().ok()
    }
}

fn direction_attr(node: Node, name: &str) -> Option<f64> {
    number_attr(node, name).map(|deg| normalize_azimuth(deg.to_radians()))
}

fn child_point(node: Node, tag: &str) -> Option<Point> {
    let child = node.children().find(|c| c.has_tag_name(tag))?;
    let nums = numbers(child.text()?);
    if nums.len() >= 2 {
        Some(Point::new(nums[1], nums[0]))
    } else {
        None
    }
}

fn required_point(node: Node, tag: &str, station: f64) -> Result<Point> {
    child_point(node, tag).ok_or_else(|| {
        GeoTableError::InvalidElement(format!(
            "<{}> at station {station:.4} has no <{tag}>",
            node.tag_name().name()
        ))
    })
}

fn clockwise(node: Node) -> bool {
    node.attribute("rot")
        .map(|r| r.eq_ignore_ascii_case("cw"))
        .unwrap_or(false)
}

fn read_coord_geom(coord: Node, start_station: f64) -> Result<Vec<HorizontalElement>> {
    let mut elements = Vec::new();
    let mut station = start_station;
    for child in coord.children().filter(|c| c.is_element()) {
        let element = match child.tag_name().name() {
            "Line" => HorizontalElement::Tangent(read_line(child, station)?),
            "Curve" => HorizontalElement::Arc(read_curve(child, station)?),
            "Spiral" => HorizontalElement::Spiral(read_spiral(child, station)?),
            other => {
                warn!("Skipping unsupported <{other}> in CoordGeom");
                continue;
            }
        };
        station = element.end_station();
        elements.push(element);
    }
    Ok(elements)
}

fn read_line(node: Node, station: f64) -> Result<TangentElement> {
    let station = number_attr(node, "staStart").unwrap_or(station);
    let start = required_point(node, "Start", station)?;
    let end = required_point(node, "End", station)?;
    let length = number_attr(node, "length").unwrap_or_else(|| distance(start, end));
    let direction = direction_attr(node, "dir").unwrap_or_else(|| azimuth_between(start, end));
    Ok(TangentElement {
        start_station: station,
        end_station: station + length,
        start_point: start,
        end_point: end,
        direction,
    })
}

fn read_curve(node: Node, station: f64) -> Result<ArcElement> {
    let station = number_attr(node, "staStart").unwrap_or(station);
    let start = required_point(node, "Start", station)?;
    let end = required_point(node, "End", station)?;
    let center = child_point(node, "Center");
    let pi = child_point(node, "PI");
    let cw = clockwise(node);
    let radius = number_attr(node, "radius")
        .or_else(|| center.map(|c| distance(c, start)))
        .ok_or_else(|| {
            GeoTableError::InvalidElement(format!("<Curve> at station {station:.4} has no radius"))
        })?;

    // Tangent direction is the radial azimuth turned a quarter toward travel.
    let turn = if cw { FRAC_PI_2 } else { -FRAC_PI_2 };
    let radial = |p: Point| center.map(|c| normalize_azimuth(azimuth_between(c, p) + turn));
    let start_direction = direction_attr(node, "dirStart")
        .or_else(|| radial(start))
        .or_else(|| pi.map(|p| azimuth_between(start, p)))
        .unwrap_or_else(|| azimuth_between(start, end));
    let end_direction = direction_attr(node, "dirEnd")
        .or_else(|| radial(end))
        .or_else(|| pi.map(|p| azimuth_between(p, end)))
        .unwrap_or(start_direction);

    let length = number_attr(node, "length").unwrap_or_else(|| {
        let mut delta = (end_direction - start_direction).abs();
        if delta > std::f64::consts::PI {
            delta = 2.0 * std::f64::consts::PI - delta;
        }
        radius.abs() * delta
    });
    Ok(ArcElement {
        start_station: station,
        end_station: station + length,
        start_point: start,
        end_point: end,
        start_direction,
        end_direction,
        radius,
        clockwise: cw,
        pi_station: None,
        pi_point: pi,
        center_point: center,
    })
}

fn read_spiral(node: Node, station: f64) -> Result<SpiralElement> {
    let station = number_attr(node, "staStart").unwrap_or(station);
    let start = required_point(node, "Start", station)?;
    let end = required_point(node, "End", station)?;
    let pi = child_point(node, "PI");
    let length = number_attr(node, "length").ok_or_else(|| {
        GeoTableError::InvalidElement(format!("<Spiral> at station {station:.4} has no length"))
    })?;
    let start_direction = direction_attr(node, "dirStart")
        .or_else(|| pi.map(|p| azimuth_between(start, p)))
        .unwrap_or_else(|| azimuth_between(start, end));
    let end_direction = direction_attr(node, "dirEnd")
        .or_else(|| pi.map(|p| azimuth_between(p, end)))
        .unwrap_or(start_direction);
    Ok(SpiralElement {
        start_station: station,
        end_station: station + length,
        start_point: start,
        end_point: end,
        start_direction,
        end_direction,
        radius_in: radius_attr(node, "radiusStart").unwrap_or(f64::INFINITY),
        radius_out: radius_attr(node, "radiusEnd").unwrap_or(f64::INFINITY),
        clockwise: clockwise(node),
        a: number_attr(node, "constant"),
        spi_point: pi,
        spi_station: None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PviKind {
    Point,
    Parabola,
    Circular,
}

#[derive(Debug, Clone, Copy)]
struct Pvi {
    station: f64,
    elevation: f64,
    length: f64,
    kind: PviKind,
}

/// Converts a PVI list into tangents and vertical curves.
fn read_prof_align(node: Node) -> Result<Vec<ProfileElement>> {
    let mut pvis = Vec::new();
    for child in node.children().filter(|c| c.is_element()) {
        let kind = match child.tag_name().name() {
            "PVI" => PviKind::Point,
            "ParaCurve" => PviKind::Parabola,
            "CircCurve" => PviKind::Circular,
            other => {
                warn!("Skipping unsupported <{other}> in ProfAlign");
                continue;
            }
        };
        let nums = child.text().map(numbers).unwrap_or_default();
        if nums.len() < 2 {
            return Err(GeoTableError::InvalidElement(format!(
                "<{}> needs \"station elevation\" text",
                child.tag_name().name()
            )));
        }
        let length = if kind == PviKind::Point {
            0.0
        } else {
            number_attr(child, "length").unwrap_or(0.0)
        };
        pvis.push(Pvi {
            station: nums[0],
            elevation: nums[1],
            length,
            kind,
        });
    }
    Ok(profile_from_pvis(&pvis))
}

fn profile_from_pvis(pvis: &[Pvi]) -> Vec<ProfileElement> {
    let grades: Vec<f64> = pvis
        .windows(2)
        .map(|w| {
            let run = w[1].station - w[0].station;
            if run.abs() > 0.0 {
                (w[1].elevation - w[0].elevation) / run
            } else {
                0.0
            }
        })
        .collect();
    // Half curve length at each PVI; endpoints carry no curve.
    let half = |i: usize| {
        if i == 0 || i + 1 == pvis.len() {
            0.0
        } else {
            pvis[i].length / 2.0
        }
    };

    let mut elements = Vec::new();
    for i in 0..pvis.len() {
        let pvi = pvis[i];
        if half(i) > 0.0 {
            let curve = VerticalCurve {
                start_station: pvi.station - half(i),
                end_station: pvi.station + half(i),
                pvi_station: pvi.station,
                pvi_elevation: pvi.elevation,
                grade_in: grades[i - 1],
                grade_out: grades[i],
                length: pvi.length,
                start_elevation: None,
                end_elevation: None,
            };
            elements.push(match pvi.kind {
                PviKind::Circular => ProfileElement::Circular(curve),
                _ => ProfileElement::ParabolaSymmetric(curve),
            });
        }
        if let Some(&grade) = grades.get(i) {
            let start_station = pvi.station + half(i);
            let end_station = pvis[i + 1].station - half(i + 1);
            if end_station - start_station > 0.0 {
                elements.push(ProfileElement::Tangent(ProfileTangent {
                    start_station,
                    end_station,
                    start_elevation: pvi.elevation + grade * half(i),
                    end_elevation: pvis[i + 1].elevation - grade * half(i + 1),
                    grade,
                }));
            }
        }
    }
    elements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::AlignmentSource;

    const SAMPLE: &str = r#"<?xml version="1.0"?>
<LandXML>
  <Alignments>
    <Alignment name="Main" desc="Test road" staStart="1000">
      <CoordGeom>
        <Line>
          <Start>0 0</Start>
          <End>100 0</End>
        </Line>
        <Curve rot="cw" radius="100">
          <Start>100 0</Start>
          <Center>100 100</Center>
          <End>200 100</End>
        </Curve>
      </CoordGeom>
      <Profile>
        <ProfAlign name="FG">
          <PVI>1000 100</PVI>
          <ParaCurve length="40">1100 110</ParaCurve>
          <PVI>1200 105</PVI>
        </ProfAlign>
      </Profile>
    </Alignment>
  </Alignments>
</LandXML>"#;

    #[test]
    fn reads_coord_geom() {
        let alignments = parse_landxml(SAMPLE).unwrap();
        assert_eq!(alignments.len(), 1);
        let main = &alignments[0];
        assert_eq!(main.name(), "Main");
        assert_eq!(main.description(), Some("Test road"));
        let elements = main.horizontal_elements().unwrap();
        assert_eq!(elements.len(), 2);
        match elements[0] {
            HorizontalElement::Tangent(t) => {
                assert_eq!(t.start_station, 1000.0);
                assert!((t.end_station - 1100.0).abs() < 1e-6);
                assert!((t.end_point.y - 100.0).abs() < 1e-6);
                assert!(t.direction.abs() < 1e-9);
            }
            ref other => panic!("expected tangent, got {other:?}"),
        }
        match elements[1] {
            HorizontalElement::Arc(a) => {
                assert!(a.clockwise);
                assert!((a.start_station - 1100.0).abs() < 1e-6);
                assert!((a.length() - 100.0 * FRAC_PI_2).abs() < 1e-6);
                assert!(a.start_direction.abs() < 1e-9);
                assert!((a.end_direction - FRAC_PI_2).abs() < 1e-9);
                assert_eq!(a.center_point, Some(Point::new(100.0, 100.0)));
            }
            ref other => panic!("expected arc, got {other:?}"),
        }
    }

    #[test]
    fn reads_profile() {
        let alignments = parse_landxml(SAMPLE).unwrap();
        let profile = alignments[0].profile_elements().unwrap();
        assert_eq!(profile.len(), 3);
        match profile[1] {
            ProfileElement::ParabolaSymmetric(c) => {
                assert!((c.start_station - 1080.0).abs() < 1e-9);
                assert!((c.grade_in - 0.1).abs() < 1e-9);
                assert!((c.grade_out + 0.05).abs() < 1e-9);
                assert!((c.pvc_elevation() - 108.0).abs() < 1e-9);
                assert!((c.pvt_elevation() - 109.0).abs() < 1e-9);
            }
            ref other => panic!("expected parabola, got {other:?}"),
        }
        match profile[2] {
            ProfileElement::Tangent(t) => {
                assert!((t.start_station - 1120.0).abs() < 1e-9);
                assert!((t.start_elevation - 109.0).abs() < 1e-9);
                assert!((t.end_elevation - 105.0).abs() < 1e-9);
            }
            ref other => panic!("expected tangent, got {other:?}"),
        }
    }

    #[test]
    fn spiral_with_infinite_start() {
        let xml = r#"<LandXML><Alignment name="S"><CoordGeom>
            <Spiral length="50" radiusStart="INF" radiusEnd="400" rot="ccw" dirStart="90" dirEnd="86.4">
              <Start>0 0</Start><PI>0 33.3</PI><End>2 50</End>
            </Spiral></CoordGeom></Alignment></LandXML>"#;
        let alignments = parse_landxml(xml).unwrap();
        let elements = alignments[0].horizontal_elements().unwrap();
        match elements[0] {
            HorizontalElement::Spiral(s) => {
                assert!(s.radius_in.is_infinite());
                assert_eq!(s.radius_out, 400.0);
                assert!(!s.clockwise);
                assert!((s.start_direction - FRAC_PI_2).abs() < 1e-9);
                assert_eq!(s.spi_point, Some(Point::new(33.3, 0.0)));
            }
            ref other => panic!("expected spiral, got {other:?}"),
        }
    }

    #[test]
    fn missing_alignment_is_an_error() {
        let err = parse_landxml("<LandXML/>").unwrap_err();
        assert!(matches!(err, GeoTableError::MissingAlignment(_)));
    }

    #[test]
    fn line_without_end_is_an_error() {
        let xml = r#"<LandXML><Alignment name="A"><CoordGeom>
            <Line><Start>0 0</Start></Line></CoordGeom></Alignment></LandXML>"#;
        assert!(matches!(
            parse_landxml(xml),
            Err(GeoTableError::InvalidElement(_))
        ));
    }
}
