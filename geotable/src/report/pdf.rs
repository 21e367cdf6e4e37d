//! PDF sink built on `genpdf`.

use std::path::Path;

use genpdf::{elements::Paragraph, Alignment, Document};

use crate::error::{GeoTableError, Result};

use super::text::render_text;
use super::Report;

/// Font family looked up in the font directory.
pub const FONT_FAMILY: &str = "DejaVuSans";

/// Writes one paragraph per text report line. Fonts are loaded from
/// `font_dir`, which must hold the `DejaVuSans` family files.
pub fn write_pdf(report: &Report, path: impl AsRef<Path>, font_dir: impl AsRef<Path>) -> Result<()> {
    let font_family = genpdf::fonts::from_files(font_dir.as_ref(), FONT_FAMILY, None)
        .map_err(|e| GeoTableError::Render(e.to_string()))?;
    let mut doc = Document::new(font_family);
    doc.set_title(format!(
        "{} {} Report",
        report.header.alignment_name,
        report.kind.as_str()
    ));
    for line in render_text(report)?.lines() {
        doc.push(Paragraph::new(line).aligned(Alignment::Left));
    }
    doc.render_to_file(path.as_ref())
        .map_err(|e| GeoTableError::Render(e.to_string()))
}
