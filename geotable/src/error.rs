//! Error types for the geotable library.

use std::io;
use thiserror::Error;

/// Errors raised while reading alignments or writing reports.
#[derive(Debug, Error)]
pub enum GeoTableError {
    /// IO error occurred during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Malformed XML input
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// Malformed JSON input or settings
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Element data that cannot be used even with defaults
    #[error("Invalid element: {0}")]
    InvalidElement(String),

    /// The source exposes no alignment to report on
    #[error("No alignment found: {0}")]
    MissingAlignment(String),

    /// The source exposes no profile for the vertical report
    #[error("No profile found for alignment {0}")]
    MissingProfile(String),

    /// `point_at_station` could not resolve a station
    #[error("Station {0:.4} is outside the alignment")]
    StationOutOfRange(f64),

    /// A renderer failed to produce its document
    #[error("Render error: {0}")]
    Render(String),
}

/// Result type alias for geotable operations
pub type Result<T> = std::result::Result<T, GeoTableError>;
