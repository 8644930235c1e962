//! Poller: periodic poll-page scraper with CSV/TXT output sinks.

mod app;
mod config_store;
mod events;
mod logging;

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;

use anyhow::Context;
use poller_engine::{ChannelEventSink, FetchSettings, HttpFetcher};
use poller_logging::poller_info;

use crate::app::App;
use crate::config_store::Config;

const CONFIG_PATH: &str = "config.json";

fn main() -> anyhow::Result<()> {
    let cfg = Config::load(Path::new(CONFIG_PATH)).context("failed to load config")?;
    logging::initialize(cfg.debug);
    poller_info!(
        "config loaded: {} sources, interval {} ms, debug={}",
        cfg.links.len(),
        cfg.update_interval,
        cfg.debug
    );

    let (event_tx, event_rx) = mpsc::channel();
    let event_logger = events::spawn_event_logger(event_rx);

    let fetcher = Arc::new(HttpFetcher::new(FetchSettings::default()));
    let mut app = App::new(
        cfg,
        PathBuf::from(CONFIG_PATH),
        fetcher,
        Arc::new(ChannelEventSink::new(event_tx)),
    );
    app.start_scraper().context("failed to start scraper")?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.send(());
    })
    .context("failed to install shutdown handler")?;
    let _ = shutdown_rx.recv();

    poller_info!("shutting down");
    app.stop_scraper();
    drop(app);
    let _ = event_logger.join();
    Ok(())
}
