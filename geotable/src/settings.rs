//! Report tunables loaded from JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::io::read_to_string;

/// Options shared by every report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub project_name: String,
    /// Overrides the alignment description reported by the source.
    pub description: Option<String>,
    pub style: String,
    /// Largest station mismatch accepted between neighbouring elements.
    pub station_tolerance: f64,
    /// Decimal places for coordinates, lengths and radii.
    pub linear_precision: usize,
    /// Decimal places of DMS seconds.
    pub seconds_precision: usize,
    /// Stamp the report header with the creation time.
    pub timestamp: bool,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            project_name: String::new(),
            description: None,
            style: "Default".to_string(),
            station_tolerance: 0.1,
            linear_precision: 4,
            seconds_precision: 2,
            timestamp: false,
        }
    }
}

impl ReportSettings {
    /// Loads settings from a JSON file; missing keys keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn partial_json_keeps_defaults() {
        let s: ReportSettings = serde_json::from_str(r#"{"project_name":"Route 9"}"#).unwrap();
        assert_eq!(s.project_name, "Route 9");
        assert_eq!(s.station_tolerance, 0.1);
        assert_eq!(s.linear_precision, 4);
        assert_eq!(s.seconds_precision, 2);
        assert!(!s.timestamp);
    }

    #[test]
    fn load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"linear_precision":2,"style":"Rail"}}"#).unwrap();
        let s = ReportSettings::load(file.path()).unwrap();
        assert_eq!(s.linear_precision, 2);
        assert_eq!(s.style, "Rail");
    }

    #[test]
    fn bad_json_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(ReportSettings::load(file.path()).is_err());
    }
}
