use poller_logging::poller_warn;

use crate::config::ScrapeConfig;
use crate::data::DataRow;

/// Applies the transform pipeline to one cycle's raw rows.
///
/// Steps, in order: filter by configured line indices, append unfiltered
/// custom rows, append the sum row(s). Pure: logging of skipped values is
/// advisory and never alters the output.
pub fn apply(raw: &[DataRow], cfg: &ScrapeConfig) -> Vec<DataRow> {
    let mut rows = filter_rows(raw, &cfg.filter_lines_zero_indexed());

    for custom in &cfg.custom_rows {
        if !custom.filtered {
            rows.push(DataRow::new(custom.name.clone(), custom.value.clone()));
        }
    }

    if cfg.append_sum {
        append_sum(&mut rows, &cfg.sum_suffix);
    }

    rows
}

/// Selects `raw[i]` for each zero-based index, in index order.
///
/// Out-of-range indices are skipped without error; duplicate indices
/// duplicate the row. An empty index list passes everything through.
fn filter_rows(raw: &[DataRow], lines: &[usize]) -> Vec<DataRow> {
    if lines.is_empty() {
        return raw.to_vec();
    }
    lines
        .iter()
        .filter_map(|&line| raw.get(line).cloned())
        .collect()
}

fn append_sum(rows: &mut Vec<DataRow>, suffix: &str) {
    let mut sum: i64 = 0;
    for row in rows.iter() {
        match row.value.parse::<i64>() {
            Ok(value) => sum += value,
            Err(err) => {
                poller_warn!("cannot convert value of [{}] to integer: {err}", row.value);
            }
        }
    }
    rows.push(DataRow::new("sum", sum.to_string()));
    if !suffix.is_empty() {
        rows.push(DataRow::new("sum_symbol", format!("{sum}{suffix}")));
    }
}
