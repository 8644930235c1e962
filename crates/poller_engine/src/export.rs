use std::borrow::Cow;
use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;

use encoding_rs::WINDOWS_1252;
use poller_logging::poller_info;
use thiserror::Error;

use poller_core::{DataRow, ScrapeConfig, TextEncoding};

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("file must be of type {expected}: {path}")]
    WrongExtension { expected: &'static str, path: String },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Overwrites `path` with one two-field record per processed row.
///
/// The file is opened, truncated and closed once per call; a failure here
/// is recoverable and must be surfaced by the caller.
pub fn write_csv(path: &Path, rows: &[DataRow]) -> Result<(), SinkError> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.write_record([row.name.as_str(), row.value.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Overwrites `path` with the dataset header and one `Value<i>=` line per row.
///
/// Layout: an optional `[<dataset>]` line, a `Count=<N>` line, then
/// `Value1=..` through `ValueN=..`. The whole document is encoded per
/// `encoding` before the single write.
pub fn write_txt(
    path: &Path,
    rows: &[DataRow],
    dataset_name: Option<&str>,
    encoding: TextEncoding,
) -> Result<(), SinkError> {
    let mut text = String::new();
    if let Some(name) = dataset_name {
        let _ = writeln!(text, "[{name}]");
    }
    let _ = writeln!(text, "Count={}", rows.len());
    for (i, row) in rows.iter().enumerate() {
        let _ = writeln!(text, "Value{}={}", i + 1, row.value);
    }

    let bytes: Cow<'_, [u8]> = match encoding {
        TextEncoding::Utf8 => Cow::Borrowed(text.as_bytes()),
        TextEncoding::Windows1252 => {
            let (encoded, _, _) = WINDOWS_1252.encode(&text);
            encoded
        }
    };
    fs::write(path, bytes)?;
    Ok(())
}

/// Validates sink paths and creates empty output files for the enabled
/// sinks, without truncating existing content.
pub fn ensure_output_files(cfg: &ScrapeConfig) -> Result<(), SinkError> {
    if cfg.write_csv {
        check_extension(&cfg.csv_path, "csv")?;
        touch(&cfg.csv_path)?;
        poller_info!("output file initialized: CSV at {}", cfg.csv_path.display());
    }
    if cfg.write_txt {
        check_extension(&cfg.txt_path, "txt")?;
        touch(&cfg.txt_path)?;
        poller_info!("output file initialized: TXT at {}", cfg.txt_path.display());
    }
    Ok(())
}

fn check_extension(path: &Path, expected: &'static str) -> Result<(), SinkError> {
    let matches = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(expected));
    if matches {
        Ok(())
    } else {
        Err(SinkError::WrongExtension {
            expected,
            path: path.display().to_string(),
        })
    }
}

fn touch(path: &Path) -> Result<(), io::Error> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;
    Ok(())
}
