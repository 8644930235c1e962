use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use poller_logging::{poller_error, poller_info, poller_warn};

use poller_core::{
    apply, DataRow, RowCountMemory, ScrapeConfig, ScraperState, SourceStatus,
};

use crate::export;
use crate::fetch::Fetcher;
use crate::types::{EventSink, StartError};

/// Intervals below this only produce an advisory warning, never an error.
const MIN_INTERVAL_WARN_MS: u64 = 50;

/// Owns the single scrape loop of the process.
///
/// At most one loop is active at a time; `start` on a running scraper
/// fails fast instead of silently running two loops against the same
/// sinks. The caller is responsible for the stop-then-start sequence when
/// configuration changes: the loop itself never observes a new snapshot.
pub struct Scraper {
    worker: Option<Worker>,
}

struct Worker {
    cancel_tx: mpsc::Sender<()>,
    active: Arc<AtomicBool>,
    events: Arc<dyn EventSink>,
    thread: thread::JoinHandle<()>,
}

impl Scraper {
    pub fn new() -> Self {
        Self { worker: None }
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| worker.active.load(Ordering::SeqCst))
    }

    /// Spawns the cycle loop with a fresh row-count memory.
    pub fn start(
        &mut self,
        cfg: ScrapeConfig,
        fetcher: Arc<dyn Fetcher>,
        events: Arc<dyn EventSink>,
    ) -> Result<(), StartError> {
        if self.is_running() {
            return Err(StartError::AlreadyRunning);
        }
        if cfg.interval_ms < MIN_INTERVAL_WARN_MS {
            poller_warn!(
                "update interval of {} ms is very low and may cause high CPU usage and server load",
                cfg.interval_ms
            );
        }
        poller_info!(
            "starting scrape loop: {} sources, {} ms interval",
            cfg.sources.len(),
            cfg.interval_ms
        );

        let (cancel_tx, cancel_rx) = mpsc::channel();
        let active = Arc::new(AtomicBool::new(true));
        let thread = thread::spawn({
            let active = Arc::clone(&active);
            let events = Arc::clone(&events);
            move || run_loop(cfg, fetcher, events.as_ref(), &cancel_rx, &active)
        });
        self.worker = Some(Worker {
            cancel_tx,
            active,
            events,
            thread,
        });
        Ok(())
    }

    /// Cancels the loop, waits for it to exit and emits the final state.
    ///
    /// Idempotent: a no-op when no loop is running. When the loop already
    /// stopped itself (fatal drift) no second `stopped` is emitted.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        poller_info!("stopping scrape loop");
        let _ = worker.cancel_tx.send(());
        if worker.thread.join().is_err() {
            poller_error!("scrape loop thread panicked");
        }
        if worker.active.swap(false, Ordering::SeqCst) {
            worker.events.emit_state(ScraperState::Stopped);
        }
    }
}

impl Default for Scraper {
    fn default() -> Self {
        Self::new()
    }
}

fn run_loop(
    cfg: ScrapeConfig,
    fetcher: Arc<dyn Fetcher>,
    events: &dyn EventSink,
    cancel_rx: &mpsc::Receiver<()>,
    active: &AtomicBool,
) {
    let mut memory = RowCountMemory::new();
    let interval = Duration::from_millis(cfg.interval_ms);
    let mut cycle: u64 = 0;

    loop {
        match cancel_rx.try_recv() {
            Ok(()) | Err(TryRecvError::Disconnected) => return,
            Err(TryRecvError::Empty) => {}
        }
        cycle += 1;
        poller_logging::set_cycle(cycle);

        events.emit_state(ScraperState::Scraping);
        let start = Instant::now();

        let (raw, mut statuses) = fetch_all(&cfg, fetcher.as_ref());

        let mut any_drift = false;
        for status in &mut statuses {
            if let Some(drift) = memory.observe(&status.url, status.row_count) {
                status.drifted = true;
                any_drift = true;
                let message = format!(
                    "row count for {} changed from {} to {}",
                    status.url, drift.previous, drift.current
                );
                poller_error!("{message}");
                events.emit_error(&message);
            }
        }
        events.emit_status(&statuses);

        if cfg.stop_on_drift && any_drift {
            poller_error!("row count drift detected, stopping loop");
            active.store(false, Ordering::SeqCst);
            events.emit_state(ScraperState::Stopped);
            return;
        }

        let processed = apply(&raw, &cfg);
        let cycle_error = run_sinks(&cfg, &processed, events);

        events.emit_data(&processed, &raw);
        events.emit_state(if cycle_error {
            ScraperState::Error
        } else {
            ScraperState::Idle
        });

        let elapsed = start.elapsed();
        match interval.checked_sub(elapsed) {
            Some(remaining) if !remaining.is_zero() => {
                // Sleeping on the cancel channel keeps cancellation prompt.
                match cancel_rx.recv_timeout(remaining) {
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
                    Err(RecvTimeoutError::Timeout) => {}
                }
            }
            _ => {
                poller_warn!(
                    "cycle took {:?}, longer than the update interval of {} ms",
                    elapsed,
                    cfg.interval_ms
                );
            }
        }
    }
}

/// Fetches every configured source sequentially, in configuration order.
pub(crate) fn fetch_all(
    cfg: &ScrapeConfig,
    fetcher: &dyn Fetcher,
) -> (Vec<DataRow>, Vec<SourceStatus>) {
    let mut raw = Vec::new();
    let mut statuses = Vec::with_capacity(cfg.sources.len());
    for url in &cfg.sources {
        let rows = fetcher.fetch(url, cfg.fetch_mode);
        if rows.is_empty() {
            poller_warn!("no data from {url}");
        }
        statuses.push(SourceStatus {
            url: url.clone(),
            has_data: !rows.is_empty(),
            row_count: rows.len(),
            drifted: false,
        });
        raw.extend(rows);
    }
    (raw, statuses)
}

/// Runs the enabled sinks; returns whether the cycle must be marked errored.
fn run_sinks(cfg: &ScrapeConfig, processed: &[DataRow], events: &dyn EventSink) -> bool {
    let mut cycle_error = false;
    if cfg.write_csv {
        if let Err(err) = export::write_csv(&cfg.csv_path, processed) {
            let message = format!("failed to write to CSV file: {err}");
            poller_error!("{message}");
            events.emit_error(&message);
            cycle_error = true;
        }
    }
    if cfg.write_txt {
        // Best effort: a TXT failure never escalates the cycle state.
        if let Err(err) = export::write_txt(
            &cfg.txt_path,
            processed,
            cfg.dataset_name.as_deref(),
            cfg.txt_encoding,
        ) {
            poller_warn!("failed to write to TXT file: {err}");
        }
    }
    cycle_error
}
