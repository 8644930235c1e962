use serde::{Deserialize, Serialize};

/// One name/value pair produced by scraping a source page.
///
/// The value is untyped text; numeric interpretation happens only inside
/// the sum step of the transform pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRow {
    pub name: String,
    pub value: String,
}

impl DataRow {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A configured row appended to the processed output.
///
/// Rows tagged `filtered` exist only to be selectable through the filter
/// index upstream of the pipeline; they are never appended directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRow {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub filtered: bool,
}

/// Per-source outcome of one cycle, in configuration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStatus {
    pub url: String,
    pub has_data: bool,
    pub row_count: usize,
    pub drifted: bool,
}
