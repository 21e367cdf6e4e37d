//! JSON alignment documents.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::alignment::{HorizontalElement, LayoutAlignment, ProfileElement};
use crate::error::Result;

use super::{read_to_string, write_string};

/// Serialized form of one alignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentDocument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub horizontal: Vec<HorizontalElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Vec<ProfileElement>>,
}

impl AlignmentDocument {
    /// Builds an evaluable alignment. Invalid elements are kept for the
    /// report to flag.
    pub fn into_layout(self) -> LayoutAlignment {
        let mut layout = LayoutAlignment::new(self.name, self.horizontal);
        if let Some(description) = self.description {
            layout = layout.with_description(description);
        }
        if let Some(profile) = self.profile {
            layout = layout.with_profile(profile);
        }
        layout
    }
}

pub fn read_json(path: impl AsRef<Path>) -> Result<LayoutAlignment> {
    let contents = read_to_string(path)?;
    let doc: AlignmentDocument = serde_json::from_str(&contents)?;
    Ok(doc.into_layout())
}

pub fn write_json(path: impl AsRef<Path>, doc: &AlignmentDocument) -> Result<()> {
    let json = serde_json::to_string_pretty(doc)?;
    write_string(path, &json)
}
