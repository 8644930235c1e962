//! Forwards loop notifications to the application log.

use std::sync::mpsc;
use std::thread;

use poller_engine::ScraperEvent;
use poller_logging::{poller_debug, poller_error, poller_info};

/// Consumes scraper events until the sending side is dropped.
pub fn spawn_event_logger(rx: mpsc::Receiver<ScraperEvent>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for event in rx {
            match event {
                ScraperEvent::State(state) => {
                    poller_info!("scraper state: {state}");
                }
                ScraperEvent::Status(statuses) => {
                    for status in &statuses {
                        poller_debug!(
                            "source {}: has_data={} rows={} drifted={}",
                            status.url,
                            status.has_data,
                            status.row_count,
                            status.drifted
                        );
                    }
                }
                ScraperEvent::Data { processed, raw } => {
                    poller_debug!(
                        "cycle data: {} processed rows, {} raw rows",
                        processed.len(),
                        raw.len()
                    );
                }
                ScraperEvent::Error(message) => {
                    poller_error!("scraper error: {message}");
                }
            }
        }
    })
}
