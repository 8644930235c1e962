use std::sync::mpsc;

use poller_core::{DataRow, ScraperState, SourceStatus};
use thiserror::Error;

/// Capability set consumed by the loop to publish live state.
///
/// All notifications are fire-and-forget: the loop never blocks on or
/// retries delivery, and implementations must not panic.
pub trait EventSink: Send + Sync {
    fn emit_state(&self, state: ScraperState);
    fn emit_data(&self, processed: &[DataRow], raw: &[DataRow]);
    fn emit_status(&self, statuses: &[SourceStatus]);
    fn emit_error(&self, message: &str);
}

/// One notification from the loop, as carried by [`ChannelEventSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScraperEvent {
    State(ScraperState),
    Data {
        processed: Vec<DataRow>,
        raw: Vec<DataRow>,
    },
    Status(Vec<SourceStatus>),
    Error(String),
}

/// Event sink that forwards notifications over an mpsc channel.
pub struct ChannelEventSink {
    tx: mpsc::Sender<ScraperEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<ScraperEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit_state(&self, state: ScraperState) {
        let _ = self.tx.send(ScraperEvent::State(state));
    }

    fn emit_data(&self, processed: &[DataRow], raw: &[DataRow]) {
        let _ = self.tx.send(ScraperEvent::Data {
            processed: processed.to_vec(),
            raw: raw.to_vec(),
        });
    }

    fn emit_status(&self, statuses: &[SourceStatus]) {
        let _ = self.tx.send(ScraperEvent::Status(statuses.to_vec()));
    }

    fn emit_error(&self, message: &str) {
        let _ = self.tx.send(ScraperEvent::Error(message.to_string()));
    }
}

/// Why a loop could not be started.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StartError {
    #[error("scraper is already running")]
    AlreadyRunning,
}
