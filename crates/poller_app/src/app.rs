//! Application controller: owns the scraper and the current configuration.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use poller_engine::{
    ensure_output_files, preview, EventSink, Fetcher, PreviewResult, Scraper, StartError,
};
use poller_logging::{poller_error, poller_info};

use crate::config_store::Config;

pub struct App {
    cfg: Config,
    config_path: PathBuf,
    scraper: Scraper,
    fetcher: Arc<dyn Fetcher>,
    events: Arc<dyn EventSink>,
}

impl App {
    pub fn new(
        cfg: Config,
        config_path: PathBuf,
        fetcher: Arc<dyn Fetcher>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        if let Err(err) = ensure_output_files(&cfg.scrape_config()) {
            poller_error!("failed to init output files: {err}");
        }
        Self {
            cfg,
            config_path,
            scraper: Scraper::new(),
            fetcher,
            events,
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn is_scraper_running(&self) -> bool {
        self.scraper.is_running()
    }

    pub fn start_scraper(&mut self) -> Result<(), StartError> {
        self.scraper.start(
            self.cfg.scrape_config(),
            Arc::clone(&self.fetcher),
            Arc::clone(&self.events),
        )
    }

    pub fn stop_scraper(&mut self) {
        self.scraper.stop();
    }

    /// On-demand fetch and transform, independent of the loop.
    pub fn preview(&self) -> PreviewResult {
        preview(&self.cfg.scrape_config(), self.fetcher.as_ref())
    }

    /// Persists the new configuration and applies it.
    ///
    /// A running loop is stopped first and started again with the new
    /// snapshot; the drift memory and cycle counter reset with it.
    pub fn update_config(&mut self, mut new_cfg: Config) -> anyhow::Result<()> {
        poller_info!("config update requested");
        new_cfg
            .save(&self.config_path)
            .context("failed to save config")?;
        log_config_changes(&self.cfg, &new_cfg);

        let was_running = self.is_scraper_running();
        if was_running {
            self.stop_scraper();
        }

        let output_changed = self.cfg.write_to_csv != new_cfg.write_to_csv
            || self.cfg.csv_path != new_cfg.csv_path
            || self.cfg.write_to_txt != new_cfg.write_to_txt
            || self.cfg.txt_path != new_cfg.txt_path;
        self.cfg = new_cfg;
        if output_changed {
            if let Err(err) = ensure_output_files(&self.cfg.scrape_config()) {
                poller_error!("failed to reinit output files: {err}");
            }
        }

        if was_running {
            self.start_scraper()
                .context("failed to restart scraper after config update")?;
        }
        poller_info!("config updated");
        Ok(())
    }
}

fn log_config_changes(old: &Config, new: &Config) {
    if old.update_interval != new.update_interval {
        poller_info!(
            "config changed: update_interval {} -> {}",
            old.update_interval,
            new.update_interval
        );
    }
    if old.with_eq != new.with_eq {
        poller_info!("config changed: with_eq {} -> {}", old.with_eq, new.with_eq);
    }
    if old.write_to_csv != new.write_to_csv {
        poller_info!(
            "config changed: write_to_csv {} -> {}",
            old.write_to_csv,
            new.write_to_csv
        );
    }
    if old.csv_path != new.csv_path {
        poller_info!("config changed: csv_path {:?} -> {:?}", old.csv_path, new.csv_path);
    }
    if old.write_to_txt != new.write_to_txt {
        poller_info!(
            "config changed: write_to_txt {} -> {}",
            old.write_to_txt,
            new.write_to_txt
        );
    }
    if old.txt_path != new.txt_path {
        poller_info!("config changed: txt_path {:?} -> {:?}", old.txt_path, new.txt_path);
    }
    if old.txt_encoding != new.txt_encoding {
        poller_info!(
            "config changed: txt_encoding {:?} -> {:?}",
            old.txt_encoding,
            new.txt_encoding
        );
    }
    if old.dataset_name != new.dataset_name {
        poller_info!(
            "config changed: dataset_name {:?} -> {:?}",
            old.dataset_name,
            new.dataset_name
        );
    }
    if old.debug != new.debug {
        poller_info!("config changed: debug {} -> {}", old.debug, new.debug);
    }
    if old.add_sum != new.add_sum {
        poller_info!("config changed: add_sum {} -> {}", old.add_sum, new.add_sum);
    }
    if old.sum_symbols != new.sum_symbols {
        poller_info!(
            "config changed: sum_symbols {:?} -> {:?}",
            old.sum_symbols,
            new.sum_symbols
        );
    }
    if old.stop_on_line_count_change != new.stop_on_line_count_change {
        poller_info!(
            "config changed: stop_on_line_count_change {} -> {}",
            old.stop_on_line_count_change,
            new.stop_on_line_count_change
        );
    }
    if old.links != new.links {
        poller_info!(
            "config changed: links {} -> {} entries",
            old.links.len(),
            new.links.len()
        );
    }
    if old.filter_lines != new.filter_lines {
        poller_info!(
            "config changed: filter_lines {} -> {} entries",
            old.filter_lines.len(),
            new.filter_lines.len()
        );
    }
    if old.add_lines != new.add_lines {
        poller_info!(
            "config changed: add_lines {} -> {} entries",
            old.add_lines.len(),
            new.add_lines.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    use poller_core::{DataRow, FetchMode, ScraperState};
    use poller_engine::{ChannelEventSink, ScraperEvent};

    struct OneRowFetcher;

    impl Fetcher for OneRowFetcher {
        fn fetch(&self, _url: &str, _mode: FetchMode) -> Vec<DataRow> {
            vec![DataRow::new("A", "1")]
        }
    }

    fn test_app(dir: &tempfile::TempDir) -> (App, mpsc::Receiver<ScraperEvent>) {
        poller_logging::initialize_for_tests();
        let (tx, rx) = mpsc::channel();
        let cfg = Config {
            links: vec!["http://a.example".to_string()],
            update_interval: 60_000,
            ..Config::default()
        };
        let app = App::new(
            cfg,
            dir.path().join("config.json"),
            Arc::new(OneRowFetcher),
            Arc::new(ChannelEventSink::new(tx)),
        );
        (app, rx)
    }

    fn wait_for_state(rx: &mpsc::Receiver<ScraperEvent>, state: ScraperState) {
        loop {
            let event = rx
                .recv_timeout(std::time::Duration::from_secs(5))
                .expect("expected an event");
            if event == ScraperEvent::State(state) {
                return;
            }
        }
    }

    #[test]
    fn update_config_restarts_a_running_scraper() {
        let dir = tempfile::TempDir::new().unwrap();
        let (mut app, rx) = test_app(&dir);
        app.start_scraper().unwrap();
        wait_for_state(&rx, ScraperState::Idle);

        let new_cfg = Config {
            links: vec!["http://b.example".to_string()],
            update_interval: 60_000,
            ..Config::default()
        };
        app.update_config(new_cfg.clone()).unwrap();

        assert!(app.is_scraper_running());
        assert_eq!(app.config().links, new_cfg.links);
        // The old loop stopped before the new one started.
        wait_for_state(&rx, ScraperState::Stopped);
        wait_for_state(&rx, ScraperState::Idle);
        assert!(dir.path().join("config.json").exists());
        app.stop_scraper();
    }

    #[test]
    fn update_config_leaves_a_stopped_scraper_stopped() {
        let dir = tempfile::TempDir::new().unwrap();
        let (mut app, _rx) = test_app(&dir);

        app.update_config(Config::default()).unwrap();

        assert!(!app.is_scraper_running());
    }

    #[test]
    fn start_is_rejected_while_running() {
        let dir = tempfile::TempDir::new().unwrap();
        let (mut app, rx) = test_app(&dir);
        app.start_scraper().unwrap();
        wait_for_state(&rx, ScraperState::Idle);

        assert_eq!(app.start_scraper(), Err(StartError::AlreadyRunning));

        app.stop_scraper();
    }
}
