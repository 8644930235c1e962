use std::time::Duration;

use poller_logging::{poller_debug, poller_error};
use scraper::{Html, Selector};

use poller_core::{DataRow, FetchMode};

/// Caller-enforced bounds on a single page fetch.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// A single blocking page fetch.
///
/// Implementations never raise to the caller: any internal failure is
/// logged and yields an empty row list, which the loop treats as
/// "no data" rather than an error signal.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str, mode: FetchMode) -> Vec<DataRow>;
}

/// Production fetcher: blocking HTTP GET plus HTML extraction.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    settings: FetchSettings,
}

impl HttpFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::blocking::Client, reqwest::Error> {
        reqwest::blocking::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, mode: FetchMode) -> Vec<DataRow> {
        let parsed = match url::Url::parse(url) {
            Ok(parsed) => parsed,
            Err(err) => {
                poller_error!("invalid source URL {url}: {err}");
                return Vec::new();
            }
        };

        let client = match self.build_client() {
            Ok(client) => client,
            Err(err) => {
                poller_error!("failed to build HTTP client: {err}");
                return Vec::new();
            }
        };

        let response = match client.get(parsed.as_str()).send() {
            Ok(response) => response,
            Err(err) => {
                poller_error!("request to {url} failed: {err}");
                return Vec::new();
            }
        };

        let status = response.status();
        if !status.is_success() {
            poller_error!("request to {url} failed: http status {status}");
            return Vec::new();
        }

        let body = match response.text() {
            Ok(body) => body,
            Err(err) => {
                poller_error!("failed to read response body from {url}: {err}");
                return Vec::new();
            }
        };

        let rows = match mode {
            FetchMode::Plain => extract_table_rows(&body),
            FetchMode::Keyed => extract_keyed_rows(&body),
        };
        poller_debug!("fetched {} rows from {url}", rows.len());
        rows
    }
}

/// Plain mode: one row per table body row, name and value taken from the
/// first two `pdg`-class cells.
fn extract_table_rows(html: &str) -> Vec<DataRow> {
    let doc = Html::parse_document(html);
    let row_sel = Selector::parse("tbody tr").ok();
    let cell_sel = Selector::parse(".pdg").ok();
    let (Some(row_sel), Some(cell_sel)) = (row_sel, cell_sel) else {
        return Vec::new();
    };

    let mut rows = Vec::new();
    for tr in doc.select(&row_sel) {
        let cells: Vec<String> = tr
            .select(&cell_sel)
            .map(|cell| cell.text().collect::<String>().trim().to_string())
            .collect();
        if cells.len() >= 2 {
            rows.push(DataRow::new(cells[0].clone(), cells[1].clone()));
        }
    }
    rows
}

/// Keyed mode: one row per paragraph whose text contains an `=`,
/// split at the first occurrence.
fn extract_keyed_rows(html: &str) -> Vec<DataRow> {
    let doc = Html::parse_document(html);
    let Some(para_sel) = Selector::parse("p").ok() else {
        return Vec::new();
    };

    let mut rows = Vec::new();
    for p in doc.select(&para_sel) {
        let text = p.text().collect::<String>();
        if let Some((name, value)) = text.split_once('=') {
            rows.push(DataRow::new(name.trim(), value.trim()));
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_rows_need_at_least_two_cells() {
        let html = r#"<table><tbody>
            <tr><td class="pdg">A</td><td class="pdg">1</td></tr>
            <tr><td class="pdg">lonely</td></tr>
            <tr><td class="pdg"> B </td><td class="pdg"> 2 </td><td class="pdg">extra</td></tr>
        </tbody></table>"#;

        let rows = extract_table_rows(html);

        assert_eq!(rows, vec![DataRow::new("A", "1"), DataRow::new("B", "2")]);
    }

    #[test]
    fn keyed_rows_split_on_first_equals() {
        let html = "<p>votes = 42</p><p>no separator here</p><p>a=b=c</p>";

        let rows = extract_keyed_rows(html);

        assert_eq!(
            rows,
            vec![DataRow::new("votes", "42"), DataRow::new("a", "b=c")]
        );
    }
}
