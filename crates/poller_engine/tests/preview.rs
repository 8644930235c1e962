use std::sync::Mutex;

use poller_core::{CustomRow, DataRow, FetchMode, ScrapeConfig};
use poller_engine::{preview, Fetcher};
use pretty_assertions::assert_eq;

/// Returns a shrinking row count on every call, to show the preview
/// never treats count changes as drift.
struct ShrinkingFetcher {
    remaining: Mutex<usize>,
}

impl Fetcher for ShrinkingFetcher {
    fn fetch(&self, _url: &str, _mode: FetchMode) -> Vec<DataRow> {
        let mut remaining = self.remaining.lock().unwrap();
        let count = *remaining;
        *remaining = remaining.saturating_sub(1);
        (0..count)
            .map(|i| DataRow::new(format!("row{i}"), (i + 1).to_string()))
            .collect()
    }
}

#[test]
fn preview_applies_the_full_pipeline_ordering() {
    let fetcher = ShrinkingFetcher {
        remaining: Mutex::new(3),
    };
    let cfg = ScrapeConfig {
        sources: vec!["http://a.example".to_string()],
        filter_lines: vec![2],
        custom_rows: vec![CustomRow {
            name: "extra".into(),
            value: "5".into(),
            filtered: false,
        }],
        append_sum: true,
        sum_suffix: "%".into(),
        ..ScrapeConfig::default()
    };

    let result = preview(&cfg, &fetcher);

    assert_eq!(result.raw_rows.len(), 3);
    assert_eq!(
        result.processed_rows,
        vec![
            DataRow::new("row1", "2"),
            DataRow::new("extra", "5"),
            DataRow::new("sum", "7"),
            DataRow::new("sum_symbol", "7%"),
        ]
    );
    assert_eq!(result.statuses.len(), 1);
    assert!(result.statuses[0].has_data);
    assert_eq!(result.statuses[0].row_count, 3);
}

#[test]
fn repeated_previews_never_report_drift() {
    let fetcher = ShrinkingFetcher {
        remaining: Mutex::new(3),
    };
    let cfg = ScrapeConfig {
        sources: vec!["http://a.example".to_string()],
        ..ScrapeConfig::default()
    };

    let first = preview(&cfg, &fetcher);
    let second = preview(&cfg, &fetcher);

    assert_eq!(first.statuses[0].row_count, 3);
    assert_eq!(second.statuses[0].row_count, 2);
    assert!(!first.statuses[0].drifted);
    assert!(!second.statuses[0].drifted);
}

#[test]
fn preview_does_not_touch_the_sinks() {
    let dir = tempfile::TempDir::new().unwrap();
    let csv_path = dir.path().join("out.csv");
    let fetcher = ShrinkingFetcher {
        remaining: Mutex::new(2),
    };
    let cfg = ScrapeConfig {
        sources: vec!["http://a.example".to_string()],
        write_csv: true,
        csv_path: csv_path.clone(),
        ..ScrapeConfig::default()
    };

    let result = preview(&cfg, &fetcher);

    assert_eq!(result.processed_rows.len(), 2);
    assert!(!csv_path.exists());
}

#[test]
fn preview_merges_sources_in_configuration_order() {
    struct NamedFetcher;
    impl Fetcher for NamedFetcher {
        fn fetch(&self, url: &str, _mode: FetchMode) -> Vec<DataRow> {
            vec![DataRow::new(url, "1")]
        }
    }

    let cfg = ScrapeConfig {
        sources: vec![
            "http://b.example".to_string(),
            "http://a.example".to_string(),
        ],
        ..ScrapeConfig::default()
    };

    let result = preview(&cfg, &NamedFetcher);

    let names: Vec<&str> = result.raw_rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["http://b.example", "http://a.example"]);
    let status_urls: Vec<&str> = result.statuses.iter().map(|s| s.url.as_str()).collect();
    assert_eq!(status_urls, vec!["http://b.example", "http://a.example"]);
}
