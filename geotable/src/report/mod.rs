//! Report rows shared by every renderer.
//!
//! [`HorizontalRows`] and [`VerticalRows`] yield rows one element at a time.
//! An element that fails is replaced by a single error row and the rest of
//! the alignment still reports.

use log::{debug, warn};
use serde::Serialize;

use crate::alignment::{
    AlignmentSource, ArcElement, ElementKind, HorizontalElement, ProfileElement, ProfileTangent,
    SpiralElement, TangentElement, VerticalCurve,
};
use crate::error::{GeoTableError, Result};
use crate::format::{
    format_angle, format_bearing, format_dms, format_grade, format_radius, round_survey,
    station_format,
};
use crate::geometry::curves::spiral_constant;
use crate::geometry::{azimuth_between, offset_point, Point, SpiralQuantities};
use crate::labels::{horizontal_labels, spiral_is_entry, vertical_tangent_labels, PointLabel};
use crate::normalize::{station_key, AlignmentElement, NormalizedAlignment};
use crate::pi::solve_pi;
use crate::settings::ReportSettings;

pub mod text;
pub mod xml;

#[cfg(feature = "reporting")]
pub mod excel;
#[cfg(feature = "reporting")]
pub mod pdf;

/// Grade differences at or below this (in percent) have no finite K.
const GRADE_EPSILON: f64 = 1e-8;

/// Decimal places for vertical lengths and elevations.
const VERTICAL_PRECISION: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReportKind {
    Horizontal,
    Vertical,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Horizontal => "Horizontal",
            ReportKind::Vertical => "Vertical",
        }
    }
}

/// A named, already formatted value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataField {
    pub name: String,
    pub value: String,
}

/// One line of a report: a labeled point, a data-only line, or an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    /// Position of the element in the normalized sequence.
    pub element_index: usize,
    pub element_kind: ElementKind,
    pub point_label: Option<PointLabel>,
    pub station: Option<f64>,
    pub northing: Option<f64>,
    pub easting: Option<f64>,
    pub elevation: Option<f64>,
    pub fields: Vec<DataField>,
}

impl ReportRow {
    fn new(element_index: usize, element_kind: ElementKind, point_label: Option<PointLabel>) -> Self {
        Self {
            element_index,
            element_kind,
            point_label,
            station: None,
            northing: None,
            easting: None,
            elevation: None,
            fields: Vec::new(),
        }
    }

    fn point(element_index: usize, kind: ElementKind, label: PointLabel, station: Option<f64>) -> Self {
        let mut row = Self::new(element_index, kind, Some(label));
        row.station = station;
        row
    }

    fn at(mut self, p: Option<Point>) -> Self {
        if let Some(p) = p {
            self.northing = Some(p.y);
            self.easting = Some(p.x);
        }
        self
    }

    fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = Some(elevation);
        self
    }

    fn field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.push(DataField {
            name: name.to_string(),
            value: value.into(),
        });
        self
    }

    fn error(element_index: usize, kind: ElementKind, err: &GeoTableError) -> Self {
        Self::new(element_index, kind, Some(PointLabel::Error)).field("Error", err.to_string())
    }

    pub fn is_error(&self) -> bool {
        self.point_label == Some(PointLabel::Error)
    }

    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

/// Project and alignment identification printed above the rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportHeader {
    pub project_name: String,
    pub alignment_name: String,
    pub description: Option<String>,
    pub style: String,
    pub created: Option<String>,
}

impl ReportHeader {
    pub fn new<S: AlignmentSource + ?Sized>(source: &S, settings: &ReportSettings) -> Self {
        Self {
            project_name: settings.project_name.clone(),
            alignment_name: source.name().to_string(),
            description: settings
                .description
                .clone()
                .or_else(|| source.description().map(str::to_string)),
            style: settings.style.clone(),
            created: settings
                .timestamp
                .then(|| chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }
}

/// A fully collected report ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub kind: ReportKind,
    pub header: ReportHeader,
    pub rows: Vec<ReportRow>,
    /// Decimal places used for coordinates.
    pub precision: usize,
}

impl Report {
    pub fn horizontal<S: AlignmentSource + ?Sized>(source: &S, settings: &ReportSettings) -> Result<Self> {
        let rows = HorizontalRows::new(source, settings)?;
        Ok(Self {
            kind: ReportKind::Horizontal,
            header: ReportHeader::new(source, settings),
            rows: rows.rows().collect(),
            precision: settings.linear_precision,
        })
    }

    pub fn vertical<S: AlignmentSource + ?Sized>(source: &S, settings: &ReportSettings) -> Result<Self> {
        let rows = VerticalRows::new(source)?;
        Ok(Self {
            kind: ReportKind::Vertical,
            header: ReportHeader::new(source, settings),
            rows: rows.rows().collect(),
            precision: VERTICAL_PRECISION,
        })
    }

    /// Consecutive rows grouped by element.
    pub fn elements(&self) -> Vec<&[ReportRow]> {
        let mut groups = Vec::new();
        let mut start = 0;
        for i in 1..=self.rows.len() {
            if i == self.rows.len() || self.rows[i].element_index != self.rows[start].element_index {
                groups.push(&self.rows[start..i]);
                start = i;
            }
        }
        groups
    }

    /// Station, northing, easting and elevation columns of a row formatted
    /// for display. Missing values are empty.
    pub fn columns(&self, row: &ReportRow) -> [String; 4] {
        let num = |v: Option<f64>, places: usize| v.map(|v| round_survey(v, places)).unwrap_or_default();
        [
            row.station.map(station_format).unwrap_or_default(),
            num(row.northing, self.precision),
            num(row.easting, self.precision),
            num(row.elevation, VERTICAL_PRECISION),
        ]
    }
}

/// Lazily built horizontal rows.
pub struct HorizontalRows<'a, S: ?Sized> {
    source: &'a S,
    settings: &'a ReportSettings,
    alignment: NormalizedAlignment,
    curve_numbers: Vec<Option<usize>>,
}

impl<'a, S: AlignmentSource + ?Sized> HorizontalRows<'a, S> {
    /// Reads and normalizes the source elements. Fails only when the source
    /// cannot supply any.
    pub fn new(source: &'a S, settings: &'a ReportSettings) -> Result<Self> {
        let raw = source.horizontal_elements()?;
        if raw.is_empty() {
            return Err(GeoTableError::MissingAlignment(source.name().to_string()));
        }
        let elements: Vec<HorizontalElement> = raw
            .into_iter()
            .map(|e| {
                e.validated().unwrap_or_else(|err| {
                    warn!("{err}; the element will report as an error");
                    e
                })
            })
            .collect();
        let alignment = NormalizedAlignment::from_elements(&elements);
        alignment.check_continuity(settings.station_tolerance);
        let mut count = 0;
        let curve_numbers = alignment
            .iter()
            .map(|e| {
                e.is_arc().then(|| {
                    count += 1;
                    count
                })
            })
            .collect();
        Ok(Self {
            source,
            settings,
            alignment,
            curve_numbers,
        })
    }

    pub fn alignment(&self) -> &NormalizedAlignment {
        &self.alignment
    }

    pub fn rows(&self) -> impl Iterator<Item = ReportRow> + '_ {
        (0..self.alignment.len()).flat_map(move |i| self.element_rows(i))
    }

    fn element_rows(&self, index: usize) -> Vec<ReportRow> {
        let element = &self.alignment.elements()[index];
        debug!("Reporting {:?} at station {:.4}", element.kind(), element.start_station());
        match self.try_element_rows(index, element) {
            Ok(rows) => rows,
            Err(err) => {
                warn!("Element {index} failed: {err}");
                vec![ReportRow::error(index, element.kind(), &err)]
            }
        }
    }

    fn try_element_rows(&self, index: usize, element: &AlignmentElement) -> Result<Vec<ReportRow>> {
        let element = element.validated()?;
        let (prev, next) = self.alignment.neighbours(index);
        let (start_label, end_label) = horizontal_labels(&element, index, prev, next);
        match &element {
            AlignmentElement::Tangent(t) => self.tangent_rows(index, t, start_label, end_label),
            AlignmentElement::Arc { arc, .. } => self.arc_rows(index, arc, start_label, end_label),
            AlignmentElement::Spiral(s) => {
                let entry = spiral_is_entry(s, prev, next);
                self.spiral_rows(index, s, entry, start_label, end_label)
            }
        }
    }

    fn locate(&self, station: f64) -> Result<Point> {
        self.source
            .point_at_station(station, 0.0)
            .map(|p| p.plan())
            .ok_or(GeoTableError::StationOutOfRange(station))
    }

    fn linear(&self, value: f64) -> String {
        round_survey(value, self.settings.linear_precision)
    }

    fn tangent_rows(
        &self,
        index: usize,
        t: &TangentElement,
        start_label: PointLabel,
        end_label: PointLabel,
    ) -> Result<Vec<ReportRow>> {
        let kind = ElementKind::Tangent;
        let start = self.locate(t.start_station)?;
        let end = self.locate(t.end_station)?;
        Ok(vec![
            ReportRow::point(index, kind, start_label, Some(t.start_station))
                .at(Some(start))
                .field("Direction", format_bearing(t.direction, self.settings.seconds_precision))
                .field("Length", self.linear(t.length())),
            ReportRow::point(index, kind, end_label, Some(t.end_station)).at(Some(end)),
        ])
    }

    fn arc_rows(
        &self,
        index: usize,
        arc: &ArcElement,
        start_label: PointLabel,
        end_label: PointLabel,
    ) -> Result<Vec<ReportRow>> {
        let kind = ElementKind::Arc;
        let seconds = self.settings.seconds_precision;
        let q = arc.quantities();
        let start = self.locate(arc.start_station)?;
        let end = self.locate(arc.end_station)?;

        let pi = solve_pi(
            self.alignment.elements(),
            index,
            self.settings.station_tolerance,
        );
        let pi_station = arc.pi_station.unwrap_or(arc.start_station + q.tangent);
        let center = arc.center_point.unwrap_or_else(|| {
            let side = if arc.clockwise { arc.radius } else { -arc.radius };
            offset_point(start, arc.start_direction, side)
        });
        let turn = if arc.clockwise { "R" } else { "L" };
        let hand = if arc.clockwise { "Right" } else { "Left" };
        let number = self.curve_numbers[index].unwrap_or(0);

        Ok(vec![
            ReportRow::point(index, kind, start_label, Some(arc.start_station))
                .at(Some(start))
                .field("Curve No.", format!("{number}-{turn}"))
                .field("Radius", format_radius(arc.radius))
                .field("Delta", format!("{} {hand}", format_angle(q.delta.abs(), seconds)))
                .field(
                    "Degree of Curvature",
                    format_dms(q.degree_of_curvature.abs(), seconds),
                )
                .field("Length", self.linear(arc.length()))
                .field("Tangent", self.linear(q.tangent))
                .field("Chord", self.linear(q.chord))
                .field("Middle Ordinate", self.linear(q.middle_ordinate))
                .field("External", self.linear(q.external))
                .field("Start Tangent Direction", format_bearing(arc.start_direction, seconds)),
            ReportRow::point(index, kind, PointLabel::Pi, Some(pi_station))
                .at(pi.is_resolved().then_some(pi.point)),
            ReportRow::point(index, kind, PointLabel::Cc, None).at(Some(center)),
            ReportRow::point(index, kind, end_label, Some(arc.end_station))
                .at(Some(end))
                .field("End Tangent Direction", format_bearing(arc.end_direction, seconds)),
        ])
    }

    fn spiral_rows(
        &self,
        index: usize,
        s: &SpiralElement,
        entry: bool,
        start_label: PointLabel,
        end_label: PointLabel,
    ) -> Result<Vec<ReportRow>> {
        let kind = ElementKind::Spiral;
        let start = self.locate(s.start_station)?;
        let end = self.locate(s.end_station)?;
        let length = s.length();
        let radius = s.curve_radius(entry);

        let mut rows = vec![ReportRow::point(index, kind, start_label, Some(s.start_station)).at(Some(start))];
        if let Some(spi) = s.spi_point {
            rows.push(ReportRow::point(index, kind, PointLabel::Spi, s.spi_station).at(Some(spi)));
        }
        rows.push(ReportRow::point(index, kind, end_label, Some(s.end_station)).at(Some(end)));

        let q = SpiralQuantities::new(length, radius);
        let value = |f: fn(&SpiralQuantities) -> f64| self.linear(q.as_ref().map(f).unwrap_or(0.0));
        let theta = q.as_ref().map(|q| q.theta).unwrap_or(0.0);
        let a = s.a.unwrap_or_else(|| spiral_constant(length, radius));
        let seconds = self.settings.seconds_precision;
        let hand = if s.clockwise { "Right" } else { "Left" };
        rows.push(
            ReportRow::new(index, kind, None)
                .field("\u{03B8}s", format_angle(theta, seconds))
                .field("Angle", format!("{} {hand}", format_angle(theta, seconds)))
                .field("Ls", self.linear(length))
                .field("A", self.linear(a))
                .field("Entrance Radius", format_radius(s.radius_in))
                .field("Exit Radius", format_radius(s.radius_out))
                .field("Long Tangent", value(|q| q.long_tangent))
                .field("Short Tangent", value(|q| q.short_tangent))
                .field("Long Chord", value(|q| q.long_chord))
                .field("Xs", value(|q| q.xs))
                .field("Ys", value(|q| q.ys))
                .field("P", value(|q| q.p))
                .field("K", value(|q| q.k))
                .field("Start Tangent Direction", format_bearing(s.start_direction, seconds))
                .field("End Tangent Direction", format_bearing(s.end_direction, seconds))
                .field("Chord Direction", format_bearing(azimuth_between(start, end), seconds)),
        );
        Ok(rows)
    }
}

/// Lazily built vertical rows.
pub struct VerticalRows {
    profile: Vec<ProfileElement>,
}

impl VerticalRows {
    pub fn new<S: AlignmentSource + ?Sized>(source: &S) -> Result<Self> {
        let mut profile = source.profile_elements()?;
        if profile.is_empty() {
            return Err(GeoTableError::MissingProfile(source.name().to_string()));
        }
        profile.sort_by(|a, b| station_key(a.start_station()).total_cmp(&station_key(b.start_station())));
        Ok(Self { profile })
    }

    pub fn rows(&self) -> impl Iterator<Item = ReportRow> + '_ {
        (0..self.profile.len()).flat_map(move |i| self.element_rows(i))
    }

    fn element_rows(&self, index: usize) -> Vec<ReportRow> {
        let element = self.profile[index];
        let kind = match element {
            ProfileElement::Tangent(_) => ElementKind::ProfileTangent,
            ProfileElement::Circular(_) => ElementKind::Circular,
            ProfileElement::ParabolaSymmetric(_) => ElementKind::ParabolaSymmetric,
        };
        let built = element.validated().map(|e| match e {
            ProfileElement::Tangent(t) => tangent_rows(index, &t),
            ProfileElement::Circular(c) | ProfileElement::ParabolaSymmetric(c) => {
                curve_rows(index, kind, &c)
            }
        });
        built.unwrap_or_else(|err| {
            warn!("Profile element {index} failed: {err}");
            vec![ReportRow::error(index, kind, &err)]
        })
    }
}

fn curve_rows(index: usize, kind: ElementKind, c: &VerticalCurve) -> Vec<ReportRow> {
    let grade_diff = c.grade_change() * 100.0;
    let r = if c.length.abs() > GRADE_EPSILON {
        grade_diff / c.length
    } else {
        0.0
    };
    let k = if grade_diff.abs() > GRADE_EPSILON {
        round_survey((c.length / grade_diff).abs(), VERTICAL_PRECISION)
    } else {
        "INF".to_string()
    };
    let middle_ordinate = (r * c.length * c.length / 800.0).abs();
    vec![
        ReportRow::point(index, kind, PointLabel::Pvc, Some(c.start_station))
            .with_elevation(c.pvc_elevation())
            .field("Length", round_survey(c.length, VERTICAL_PRECISION))
            .field("Entrance Grade", format_grade(c.grade_in))
            .field("Exit Grade", format_grade(c.grade_out))
            .field("r", round_survey(r * 100.0, VERTICAL_PRECISION))
            .field("K", k)
            .field("Middle Ordinate", round_survey(middle_ordinate, VERTICAL_PRECISION)),
        ReportRow::point(index, kind, PointLabel::Pvi, Some(c.pvi_station))
            .with_elevation(c.pvi_elevation),
        ReportRow::point(index, kind, PointLabel::Pvt, Some(c.end_station))
            .with_elevation(c.pvt_elevation()),
    ]
}

fn tangent_rows(index: usize, t: &ProfileTangent) -> Vec<ReportRow> {
    let kind = ElementKind::ProfileTangent;
    let (start_label, end_label) = vertical_tangent_labels(index);
    vec![
        ReportRow::point(index, kind, start_label, Some(t.start_station))
            .with_elevation(t.start_elevation)
            .field("Grade", format_grade(t.grade))
            .field("Length", round_survey(t.length(), VERTICAL_PRECISION)),
        ReportRow::point(index, kind, end_label, Some(t.end_station)).with_elevation(t.end_elevation),
    ]
}
