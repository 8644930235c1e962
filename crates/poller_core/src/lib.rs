//! Poller core: pure data model, transform pipeline and drift detection.
mod config;
mod data;
mod monitor;
mod state;
mod transform;

pub use config::{FetchMode, ScrapeConfig, TextEncoding};
pub use data::{CustomRow, DataRow, SourceStatus};
pub use monitor::{RowCountDrift, RowCountMemory};
pub use state::ScraperState;
pub use transform::apply;
