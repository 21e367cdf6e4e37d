//! Plain text report in the InRoads layout.

use std::fmt::{self, Write as _};

use crate::error::{GeoTableError, Result};

use super::{Report, ReportKind, ReportRow};

/// Renders the report as text.
pub fn render_text(report: &Report) -> Result<String> {
    let mut out = String::new();
    write_text(report, &mut out).map_err(|e| GeoTableError::Render(e.to_string()))?;
    Ok(out)
}

fn write_text(report: &Report, out: &mut String) -> fmt::Result {
    let h = &report.header;
    writeln!(out, "GeoTable {} Report", report.kind.as_str())?;
    if !h.project_name.is_empty() {
        writeln!(out, "Project: {}", h.project_name)?;
    }
    writeln!(out, "Alignment: {}", h.alignment_name)?;
    if let Some(description) = &h.description {
        writeln!(out, "Description: {description}")?;
    }
    writeln!(out, "Style: {}", h.style)?;
    if let Some(created) = &h.created {
        writeln!(out, "Created: {created}")?;
    }

    for rows in report.elements() {
        let Some(first) = rows.first() else { continue };
        writeln!(out)?;
        writeln!(out, "Element: {}", first.element_kind.display_name())?;
        for row in rows {
            write_row(report, row, out)?;
        }
    }
    Ok(())
}

fn write_row(report: &Report, row: &ReportRow, out: &mut String) -> fmt::Result {
    if let Some(label) = row.point_label.filter(|_| !row.is_error()) {
        let [station, northing, easting, elevation] = report.columns(row);
        match report.kind {
            ReportKind::Horizontal => writeln!(
                out,
                "    {:<5} {:>12} {:>16} {:>16}",
                label.as_str(),
                station,
                northing,
                easting
            )?,
            ReportKind::Vertical => {
                writeln!(out, "    {:<5} {:>12} {:>12}", label.as_str(), station, elevation)?
            }
        }
    }
    for field in &row.fields {
        writeln!(out, "        {}: {}", field.name, field.value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::{layout, HorizontalElement, LayoutAlignment};
    use crate::geometry::Point;
    use crate::settings::ReportSettings;

    #[test]
    fn tangent_text() {
        let t = layout::tangent(2500.0, Point::new(1000.0, 5000.0), 0.0, 67.894);
        let source = LayoutAlignment::new("Main", vec![HorizontalElement::Tangent(t)]);
        let settings = ReportSettings {
            project_name: "Route 9".into(),
            ..ReportSettings::default()
        };
        let text = render_text(&Report::horizontal(&source, &settings).unwrap()).unwrap();
        assert!(text.starts_with("GeoTable Horizontal Report\nProject: Route 9\n"));
        assert!(text.contains("Element: Linear"));
        assert!(text.contains("POB"));
        assert!(text.contains("25+67.89"));
        assert!(text.contains("5067.8940"));
        assert!(text.contains("Direction: N 0\u{00B0}00'00.00\" E"));
        assert!(!text.contains("Created:"));
    }
}
