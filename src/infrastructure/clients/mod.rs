use crate::domain::storage::Storage;
use crate::domain::{with_scheme, Snapshot};
use crate::error::{Result, SteamerError};
use crate::infrastructure::scrapers::PageScraper;
use chrono::Utc;
use reqwest::header::COOKIE;
use reqwest::Client;
use scraper::Html;
use std::sync::Arc;
use tracing::{debug, warn};

pub(crate) mod steam_charts;
pub(crate) mod steam_store;

/// Issues a GET and records the exchange. The body is only returned for
/// a 2xx response.
pub async fn fetch(client: &Client, url: &str, cookie: Option<&str>) -> (Snapshot, Option<String>) {
    let url = with_scheme(url);
    let time_start = Utc::now();

    let mut request = client.get(&url);
    if let Some(cookie) = cookie {
        request = request.header(COOKIE, cookie);
    }

    let mut snapshot = Snapshot {
        method: "GET".to_string(),
        url: url.clone(),
        status: String::new(),
        status_code: 0,
        request_ok: false,
        response_ok: false,
        error: None,
        time_start,
        time_end: time_start,
        duration_ms: 0,
    };

    let body = match request.send().await {
        Ok(response) => {
            let status = response.status();
            snapshot.request_ok = true;
            snapshot.status_code = status.as_u16();
            snapshot.status = status.to_string();
            snapshot.response_ok = status.is_success();

            if status.is_success() {
                match response.text().await {
                    Ok(text) => Some(text),
                    Err(e) => {
                        snapshot.response_ok = false;
                        snapshot.error = Some(e.to_string());
                        None
                    }
                }
            } else {
                None
            }
        }
        Err(e) => {
            snapshot.error = Some(e.to_string());
            None
        }
    };

    snapshot.time_end = Utc::now();
    snapshot.duration_ms = (snapshot.time_end - snapshot.time_start).num_milliseconds();
    debug!(
        "GET {} -> {} in {}ms",
        snapshot.url, snapshot.status_code, snapshot.duration_ms
    );

    (snapshot, body)
}

/// Shared by the site clients: fetches a page, stores its snapshot and
/// hands the body to a scraper.
#[derive(Clone)]
pub struct PageFetcher {
    client: Client,
    store: Arc<dyn Storage>,
}

impl PageFetcher {
    pub fn new(client: Client, store: Arc<dyn Storage>) -> Self {
        Self { client, store }
    }

    pub async fn get(&self, url: &str, cookie: Option<&str>) -> Result<String> {
        let (snapshot, body) = fetch(&self.client, url, cookie).await;

        if let Err(e) = self.store.save_snapshot(&snapshot) {
            warn!("Could not save snapshot for {}: {}", snapshot.url, e);
        }

        body_or_error(&snapshot, body)
    }

    pub async fn scrape<S: PageScraper>(
        &self,
        scraper: &S,
        url: &str,
        cookie: Option<&str>,
    ) -> Result<S::Output> {
        let body = self.get(url, cookie).await?;
        parse_page(scraper, &body, url)
    }
}

fn body_or_error(snapshot: &Snapshot, body: Option<String>) -> Result<String> {
    match (body, &snapshot.error) {
        (Some(body), _) => Ok(body),
        (None, Some(error)) => Err(SteamerError::Other(format!(
            "GET {} failed: {}",
            snapshot.url, error
        ))),
        (None, None) => Err(SteamerError::Http {
            status: snapshot.status.clone(),
            url: snapshot.url.clone(),
        }),
    }
}

fn parse_page<S: PageScraper>(scraper: &S, body: &str, url: &str) -> Result<S::Output> {
    let document = Html::parse_document(body);
    scraper.scrape(&document, url)
}

#[cfg(test)]
pub(crate) mod testing {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Local HTTP server answering `(target, status line, body)` routes,
    /// matched on the exact request target. Anything else is a 404.
    /// Returns the base URL, e.g. `http://127.0.0.1:40000`.
    pub(crate) async fn serve(routes: Vec<(&'static str, &'static str, &'static str)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let read = socket.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..read]);
                let target = request.split_whitespace().nth(1).unwrap_or_default();

                let (status, body) = routes
                    .iter()
                    .find(|(path, _, _)| *path == target)
                    .map(|(_, status, body)| (*status, *body))
                    .unwrap_or(("404 Not Found", ""));
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{}", addr)
    }
}
