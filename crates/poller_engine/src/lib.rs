//! Poller engine: fetch, sink and loop coordination.
mod engine;
mod export;
mod fetch;
mod preview;
mod types;

pub use engine::Scraper;
pub use export::{ensure_output_files, write_csv, write_txt, SinkError};
pub use fetch::{FetchSettings, Fetcher, HttpFetcher};
pub use preview::{preview, PreviewResult};
pub use types::{ChannelEventSink, EventSink, ScraperEvent, StartError};
