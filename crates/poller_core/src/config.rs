use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::data::CustomRow;

/// Extraction strategy, selected once per whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// Table rows: two cell texts per row become name and value.
    Plain,
    /// Paragraph text split on the first `=` into name and value.
    Keyed,
}

/// Text encoding used by the TXT sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    Utf8,
    Windows1252,
}

/// Immutable configuration snapshot handed to a running loop.
///
/// A snapshot is never mutated once a loop holds it; configuration changes
/// take effect only through an explicit stop-then-start with a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeConfig {
    /// Source URLs, fetched sequentially in this order every cycle.
    pub sources: Vec<String>,
    pub fetch_mode: FetchMode,
    /// 1-based line indices to keep; empty means pass everything through.
    pub filter_lines: Vec<usize>,
    pub custom_rows: Vec<CustomRow>,
    pub append_sum: bool,
    /// Suffix appended verbatim to the sum value in the `sum_symbol` row.
    /// Empty disables the extra row.
    pub sum_suffix: String,
    pub interval_ms: u64,
    pub write_csv: bool,
    pub csv_path: PathBuf,
    pub write_txt: bool,
    pub txt_path: PathBuf,
    pub txt_encoding: TextEncoding,
    pub dataset_name: Option<String>,
    pub stop_on_drift: bool,
}

impl ScrapeConfig {
    /// Filter lines converted to zero-based indices.
    ///
    /// A configured index of 0 has no zero-based counterpart and is dropped.
    pub fn filter_lines_zero_indexed(&self) -> Vec<usize> {
        self.filter_lines
            .iter()
            .filter_map(|line| line.checked_sub(1))
            .collect()
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            fetch_mode: FetchMode::Plain,
            filter_lines: Vec::new(),
            custom_rows: Vec::new(),
            append_sum: false,
            sum_suffix: String::new(),
            interval_ms: 1000,
            write_csv: false,
            csv_path: PathBuf::new(),
            write_txt: false,
            txt_path: PathBuf::new(),
            txt_encoding: TextEncoding::Windows1252,
            dataset_name: None,
            stop_on_drift: false,
        }
    }
}
