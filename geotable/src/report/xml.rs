//! XML report writer.

use std::fmt::{self, Write as _};

use crate::alignment::ElementKind;
use crate::error::{GeoTableError, Result};

use super::{Report, ReportKind};

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn tag_name(kind: ElementKind) -> &'static str {
    match kind {
        ElementKind::Tangent => "Line",
        ElementKind::Arc => "Arc",
        ElementKind::Spiral => "Spiral",
        ElementKind::ProfileTangent => "Tangent",
        ElementKind::Circular => "Circular",
        ElementKind::ParabolaSymmetric => "ParabolaSymmetric",
    }
}

/// Renders the report as a `<GeoTableReport>` document.
pub fn render_xml(report: &Report) -> Result<String> {
    let mut xml = String::new();
    write_xml(report, &mut xml).map_err(|e| GeoTableError::Render(e.to_string()))?;
    Ok(xml)
}

fn write_xml(report: &Report, xml: &mut String) -> fmt::Result {
    let h = &report.header;
    writeln!(xml, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
    writeln!(xml, "<GeoTableReport Type=\"{}\">", report.kind.as_str())?;
    writeln!(xml, "  <Project>")?;
    writeln!(xml, "    <Name>{}</Name>", escape(&h.project_name))?;
    if let Some(created) = &h.created {
        writeln!(xml, "    <Created>{}</Created>", escape(created))?;
    }
    writeln!(xml, "  </Project>")?;
    let alignment_tag = match report.kind {
        ReportKind::Horizontal => "HorizontalAlignment",
        ReportKind::Vertical => "VerticalAlignment",
    };
    writeln!(xml, "  <{alignment_tag}>")?;
    writeln!(xml, "    <Name>{}</Name>", escape(&h.alignment_name))?;
    writeln!(
        xml,
        "    <Description>{}</Description>",
        escape(h.description.as_deref().unwrap_or(""))
    )?;
    writeln!(xml, "    <Style>{}</Style>", escape(&h.style))?;
    writeln!(xml, "  </{alignment_tag}>")?;
    writeln!(xml, "  <Elements>")?;
    for rows in report.elements() {
        let Some(first) = rows.first() else { continue };
        writeln!(
            xml,
            "    <Element Index=\"{}\" Type=\"{}\">",
            first.element_index,
            tag_name(first.element_kind)
        )?;
        for row in rows {
            if row.is_error() {
                let message = row.field_value("Error").unwrap_or("");
                writeln!(xml, "      <Error>{}</Error>", escape(message))?;
                continue;
            }
            if let Some(label) = row.point_label {
                let [station, northing, easting, elevation] = report.columns(row);
                write!(xml, "      <Point Label=\"{label}\"")?;
                for (name, value) in [
                    ("Station", station),
                    ("Northing", northing),
                    ("Easting", easting),
                    ("Elevation", elevation),
                ] {
                    if !value.is_empty() {
                        write!(xml, " {name}=\"{}\"", escape(&value))?;
                    }
                }
                writeln!(xml, "/>")?;
            }
            for field in &row.fields {
                writeln!(
                    xml,
                    "      <Data Name=\"{}\">{}</Data>",
                    escape(&field.name),
                    escape(&field.value)
                )?;
            }
        }
        writeln!(xml, "    </Element>")?;
    }
    writeln!(xml, "  </Elements>")?;
    writeln!(xml, "</GeoTableReport>")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::{layout, HorizontalElement, LayoutAlignment};
    use crate::geometry::Point;
    use crate::settings::ReportSettings;

    #[test]
    fn escapes_text() {
        assert_eq!(escape("A & <B> \"c\""), "A &amp; &lt;B&gt; &quot;c&quot;");
    }

    #[test]
    fn parses_back() {
        let t = layout::tangent(0.0, Point::new(0.0, 0.0), 0.0, 100.0);
        let source = LayoutAlignment::new("R&D <Main>", vec![HorizontalElement::Tangent(t)])
            .with_description("Test");
        let xml = render_xml(&Report::horizontal(&source, &ReportSettings::default()).unwrap()).unwrap();
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let root = doc.root_element();
        assert_eq!(root.attribute("Type"), Some("Horizontal"));
        let name = doc
            .descendants()
            .find(|n| n.has_tag_name("HorizontalAlignment"))
            .and_then(|n| n.children().find(|c| c.has_tag_name("Name")))
            .and_then(|n| n.text());
        assert_eq!(name, Some("R&D <Main>"));
        let points: Vec<_> = doc.descendants().filter(|n| n.has_tag_name("Point")).collect();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].attribute("Label"), Some("POB"));
        assert_eq!(points[1].attribute("Station"), Some("01+00.00"));
        let data = doc
            .descendants()
            .find(|n| n.has_tag_name("Data") && n.attribute("Name") == Some("Length"))
            .and_then(|n| n.text());
        assert_eq!(data, Some("100.0000"));
    }
}
