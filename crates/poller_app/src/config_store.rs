//! On-disk configuration: JSON load/save with defaults and validation.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use poller_core::{CustomRow, FetchMode, ScrapeConfig, TextEncoding};
use poller_logging::{poller_debug, poller_info, poller_warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_UPDATE_INTERVAL_MS: i64 = 1000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("update_interval cannot be negative")]
    NegativeInterval,
    #[error("csv_path is required when write_to_csv is true")]
    MissingCsvPath,
    #[error("txt_path is required when write_to_txt is true")]
    MissingTxtPath,
    #[error("dataset_name is required when write_to_txt is true")]
    MissingDatasetName,
}

/// Persistent application configuration, stored as pretty-printed JSON.
///
/// Unknown fields are rejected so typos in hand-edited files surface as
/// load errors instead of silently falling back to defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    pub links: Vec<String>,
    pub with_eq: bool,
    pub filter_lines: Vec<usize>,
    pub add_lines: Vec<CustomRow>,
    pub add_sum: bool,
    pub sum_symbols: String,
    pub update_interval: i64,
    pub write_to_csv: bool,
    pub csv_path: String,
    pub write_to_txt: bool,
    pub txt_path: String,
    pub txt_encoding: TextEncoding,
    pub dataset_name: String,
    pub debug: bool,
    pub stop_on_line_count_change: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            links: Vec::new(),
            with_eq: false,
            filter_lines: Vec::new(),
            add_lines: Vec::new(),
            add_sum: false,
            sum_symbols: String::new(),
            update_interval: DEFAULT_UPDATE_INTERVAL_MS,
            write_to_csv: false,
            csv_path: String::new(),
            write_to_txt: false,
            txt_path: String::new(),
            txt_encoding: TextEncoding::Windows1252,
            dataset_name: String::new(),
            debug: false,
            stop_on_line_count_change: false,
        }
    }
}

impl Config {
    /// Loads the configuration, creating a default file when none exists.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        poller_debug!("loading config from {}", path.display());
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                poller_info!("config file not found, creating default at {}", path.display());
                let mut cfg = Config::default();
                cfg.save(path)?;
                return Ok(cfg);
            }
            Err(err) => return Err(err.into()),
        };

        let mut cfg: Config = serde_json::from_str(&content)?;
        cfg.validate()?;
        cfg.apply_defaults();
        cfg.sort_filters();
        poller_debug!(
            "config loaded: {} links, {} filter lines, {} custom lines",
            cfg.links.len(),
            cfg.filter_lines.len(),
            cfg.add_lines.len()
        );
        Ok(cfg)
    }

    /// Normalizes, validates and writes the configuration to disk.
    pub fn save(&mut self, path: &Path) -> Result<(), ConfigError> {
        self.apply_defaults();
        self.sort_filters();
        self.validate()?;
        self.warn_empty_values();

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.update_interval < 0 {
            return Err(ConfigError::NegativeInterval);
        }
        if self.write_to_csv && self.csv_path.is_empty() {
            return Err(ConfigError::MissingCsvPath);
        }
        if self.write_to_txt && self.txt_path.is_empty() {
            return Err(ConfigError::MissingTxtPath);
        }
        if self.write_to_txt && self.dataset_name.is_empty() {
            return Err(ConfigError::MissingDatasetName);
        }
        Ok(())
    }

    fn apply_defaults(&mut self) {
        if self.update_interval == 0 {
            self.update_interval = DEFAULT_UPDATE_INTERVAL_MS;
        }
    }

    fn sort_filters(&mut self) {
        self.filter_lines.sort_unstable();
    }

    fn warn_empty_values(&self) {
        if self.links.is_empty() {
            poller_warn!("no URLs configured");
        }
        for (i, line) in self.add_lines.iter().enumerate() {
            if line.name.is_empty() || line.value.is_empty() {
                poller_warn!(
                    "custom line {i} has an empty field: name={:?} value={:?}",
                    line.name,
                    line.value
                );
            }
        }
        if self.add_sum && self.sum_symbols.is_empty() {
            poller_warn!("add_sum enabled but sum_symbols is empty");
        }
    }

    /// The immutable snapshot handed to a starting loop.
    pub fn scrape_config(&self) -> ScrapeConfig {
        ScrapeConfig {
            sources: self.links.clone(),
            fetch_mode: if self.with_eq {
                FetchMode::Keyed
            } else {
                FetchMode::Plain
            },
            filter_lines: self.filter_lines.clone(),
            custom_rows: self.add_lines.clone(),
            append_sum: self.add_sum,
            sum_suffix: self.sum_symbols.clone(),
            // Validation guarantees a non-negative interval.
            interval_ms: self.update_interval as u64,
            write_csv: self.write_to_csv,
            csv_path: PathBuf::from(&self.csv_path),
            write_txt: self.write_to_txt,
            txt_path: PathBuf::from(&self.txt_path),
            txt_encoding: self.txt_encoding,
            dataset_name: (!self.dataset_name.is_empty()).then(|| self.dataset_name.clone()),
            stop_on_drift: self.stop_on_line_count_change,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logging() {
        poller_logging::initialize_for_tests();
    }

    #[test]
    fn missing_file_creates_a_default_config_on_disk() {
        init_logging();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let cfg = Config::load(&path).unwrap();

        assert_eq!(cfg, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn save_and_load_round_trip() {
        init_logging();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let mut cfg = Config {
            links: vec!["http://a.example".to_string()],
            with_eq: true,
            filter_lines: vec![3, 1],
            add_sum: true,
            sum_symbols: "$".to_string(),
            ..Config::default()
        };

        cfg.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();

        // Filters come back sorted by normalization on save.
        assert_eq!(loaded.filter_lines, vec![1, 3]);
        assert_eq!(loaded.links, cfg.links);
        assert!(loaded.with_eq);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        init_logging();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"lnks": ["typo"]}"#).unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn negative_interval_is_rejected_not_clamped() {
        init_logging();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"update_interval": -5}"#).unwrap();

        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::NegativeInterval)
        ));
    }

    #[test]
    fn zero_interval_falls_back_to_the_default() {
        init_logging();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"update_interval": 0}"#).unwrap();

        let cfg = Config::load(&path).unwrap();

        assert_eq!(cfg.update_interval, DEFAULT_UPDATE_INTERVAL_MS);
    }

    #[test]
    fn txt_sink_requires_path_and_dataset_name() {
        init_logging();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"write_to_txt": true, "txt_path": "out.txt"}"#,
        )
        .unwrap();

        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::MissingDatasetName)
        ));
    }

    #[test]
    fn scrape_config_maps_the_on_disk_fields() {
        init_logging();
        let cfg = Config {
            links: vec!["http://a.example".to_string()],
            with_eq: true,
            dataset_name: String::new(),
            update_interval: 250,
            stop_on_line_count_change: true,
            ..Config::default()
        };

        let snapshot = cfg.scrape_config();

        assert_eq!(snapshot.sources, cfg.links);
        assert_eq!(snapshot.fetch_mode, FetchMode::Keyed);
        assert_eq!(snapshot.interval_ms, 250);
        assert_eq!(snapshot.dataset_name, None);
        assert!(snapshot.stop_on_drift);
    }
}
