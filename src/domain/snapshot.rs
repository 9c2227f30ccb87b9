use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A record of one HTTP exchange, saved next to the scraped data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub method: String,
    pub url: String,
    pub status: String,
    pub status_code: u16,
    pub request_ok: bool,
    pub response_ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub time_start: DateTime<Utc>,
    pub time_end: DateTime<Utc>,
    pub duration_ms: i64,
}

/// Host part of the URL, used as the snapshot directory.
pub fn url_host(url: &str) -> String {
    url::Url::parse(&with_scheme(url))
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Prefixes `https://` when the URL carries no scheme.
pub fn with_scheme(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// Derives a flat file name from a URL: scheme and host dropped, slashes
/// removed, `=` to `-` and `?` to `.`.
pub fn snapshot_file_name(url: &str) -> String {
    let url = with_scheme(url);
    let rest = match url::Url::parse(&url) {
        Ok(parsed) => {
            let mut rest = parsed.path().to_string();
            if let Some(query) = parsed.query() {
                rest.push('?');
                rest.push_str(query);
            }
            rest
        }
        Err(_) => url
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .to_string(),
    };

    let name: String = rest
        .chars()
        .filter(|c| *c != '/' && *c != '\\')
        .map(|c| match c {
            '=' => '-',
            '?' => '.',
            c => c,
        })
        .collect();
    let name = name.trim_start_matches('.');

    if name.is_empty() {
        "index.json".to_string()
    } else {
        format!("{}.json", name)
    }
}
