//! File input and output helpers for alignment sources and reports.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::alignment::LayoutAlignment;
use crate::error::{GeoTableError, Result};

pub mod json;
pub mod landxml;

/// Reads a file to string.
pub fn read_to_string(path: impl AsRef<Path>) -> Result<String> {
    let mut buffer = String::new();
    File::open(path)?.read_to_string(&mut buffer)?;
    Ok(buffer)
}

/// Writes a string to a file, replacing it.
pub fn write_string(path: impl AsRef<Path>, contents: &str) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents.as_bytes())?;
    Ok(())
}

/// Reads every alignment in a file, picking the reader by extension:
/// `.xml`/`.landxml` for LandXML, `.json` for a JSON document.
pub fn read_alignments(path: impl AsRef<Path>) -> Result<Vec<LayoutAlignment>> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let alignments = match ext.as_str() {
        "xml" | "landxml" => landxml::read_landxml(path)?,
        "json" => vec![json::read_json(path)?],
        _ => {
            return Err(GeoTableError::MissingAlignment(format!(
                "unsupported input {}",
                path.display()
            )))
        }
    };
    if alignments.is_empty() {
        return Err(GeoTableError::MissingAlignment(path.display().to_string()));
    }
    Ok(alignments)
}
