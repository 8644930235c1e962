use std::fmt;

use serde::{Deserialize, Serialize};

/// Observable state of the scrape loop, emitted through the event sink.
///
/// Within one cycle the loop emits `Scraping` first and exactly one of
/// `Idle` or `Error` last; `Stopped` is emitted once when the loop exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScraperState {
    Scraping,
    Idle,
    Error,
    Stopped,
}

impl fmt::Display for ScraperState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ScraperState::Scraping => "scraping",
            ScraperState::Idle => "idle",
            ScraperState::Error => "error",
            ScraperState::Stopped => "stopped",
        };
        write!(f, "{label}")
    }
}
