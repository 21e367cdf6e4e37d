//! Alignment geometry reports: station-ordered tables of critical points and
//! curve data for horizontal and vertical alignments.

pub mod alignment;
pub mod error;
pub mod format;
pub mod geometry;
pub mod io;
pub mod labels;
pub mod normalize;
pub mod pi;
pub mod report;
pub mod settings;

pub use alignment::{AlignmentSource, HorizontalElement, LayoutAlignment, ProfileElement};
pub use error::{GeoTableError, Result};
pub use report::{Report, ReportKind, ReportRow};
pub use settings::ReportSettings;
