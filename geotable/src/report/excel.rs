//! Excel sink built on `umya-spreadsheet`.

use std::path::Path;

use umya_spreadsheet::{self, writer::xlsx, Spreadsheet};

use crate::error::{GeoTableError, Result};

use super::{Report, ReportKind};

/// Flattens the report into worksheet rows, header first. Each data field
/// becomes `name: value` in the DATA column.
pub fn sheet_rows(report: &Report) -> Vec<Vec<String>> {
    let header: Vec<&str> = match report.kind {
        ReportKind::Horizontal => vec!["ELEMENT", "POINT", "STATION", "NORTHING", "EASTING", "DATA"],
        ReportKind::Vertical => vec!["ELEMENT", "POINT", "STATION", "ELEVATION", "DATA"],
    };
    let mut rows = vec![header.into_iter().map(String::from).collect::<Vec<_>>()];
    for row in &report.rows {
        let [station, northing, easting, elevation] = report.columns(row);
        let label = row.point_label.map(|l| l.to_string()).unwrap_or_default();
        let data = row
            .fields
            .iter()
            .map(|f| format!("{}: {}", f.name, f.value))
            .collect::<Vec<_>>()
            .join("; ");
        let kind = row.element_kind.display_name().to_string();
        rows.push(match report.kind {
            ReportKind::Horizontal => vec![kind, label, station, northing, easting, data],
            ReportKind::Vertical => vec![kind, label, station, elevation, data],
        });
    }
    rows
}

/// Writes the report to a single `GeoTable` worksheet.
pub fn write_excel(report: &Report, path: impl AsRef<Path>) -> Result<()> {
    let mut wb: Spreadsheet = umya_spreadsheet::new_file();
    let ws = wb
        .get_sheet_mut(&0)
        .ok_or_else(|| GeoTableError::Render("workbook has no sheet".to_string()))?;
    ws.set_name("GeoTable");
    for (r_idx, row) in sheet_rows(report).iter().enumerate() {
        for (c_idx, val) in row.iter().enumerate() {
            ws.get_cell_mut(((c_idx + 1) as u32, (r_idx + 1) as u32))
                .set_value(val);
        }
    }
    xlsx::write(&wb, path.as_ref()).map_err(|e| GeoTableError::Render(e.to_string()))
}
