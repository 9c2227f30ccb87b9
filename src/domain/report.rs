use super::GamePage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bookkeeping for one crawl over a page range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlLog {
    pub pages_from: u32,
    pub pages_to: u32,
    pub pages_ok: BTreeMap<u32, bool>,
    pub terminate_zero: bool,
    pub games_found: usize,
    pub games_skipped: usize,
    pub games_scraped: usize,
    pub charts_scraped: usize,
    pub failures: usize,
    pub time_start: DateTime<Utc>,
    pub time_end: Option<DateTime<Utc>>,
    pub duration_ms: Option<i64>,
}

impl CrawlLog {
    pub fn new(pages_from: u32, pages_to: u32, terminate_zero: bool) -> Self {
        Self {
            pages_from,
            pages_to,
            pages_ok: BTreeMap::new(),
            terminate_zero,
            games_found: 0,
            games_skipped: 0,
            games_scraped: 0,
            charts_scraped: 0,
            failures: 0,
            time_start: Utc::now(),
            time_end: None,
            duration_ms: None,
        }
    }

    /// Records a page's status. The first status recorded for a page wins;
    /// returns whether this call recorded it.
    pub fn record_page(&mut self, page: u32, ok: bool) -> bool {
        if self.pages_ok.contains_key(&page) {
            return false;
        }
        self.pages_ok.insert(page, ok);
        true
    }

    pub fn finish(&mut self) {
        let end = Utc::now();
        self.duration_ms = Some((end - self.time_start).num_milliseconds());
        self.time_end = Some(end);
    }
}

/// Crawl-wide aggregation over every scraped game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlSummary {
    pub games: usize,
    pub pages_from: u32,
    pub pages_to: u32,
    pub developers: BTreeMap<String, Vec<String>>,
    pub publishers: BTreeMap<String, Vec<String>>,
    pub genres: BTreeMap<String, usize>,
    pub sentiments: BTreeMap<String, usize>,
}

impl CrawlSummary {
    pub fn new(pages_from: u32, pages_to: u32) -> Self {
        Self {
            pages_from,
            pages_to,
            ..Self::default()
        }
    }

    pub fn add(&mut self, page: &GamePage) {
        self.games += 1;

        for developer in &page.developers {
            self.developers
                .entry(developer.title.clone())
                .or_default()
                .push(page.title.clone());
        }
        for publisher in &page.publishers {
            self.publishers
                .entry(publisher.title.clone())
                .or_default()
                .push(page.title.clone());
        }
        for genre in &page.genres {
            *self.genres.entry(genre.title.clone()).or_default() += 1;
        }
        if !page.reviews_all.sentiment.is_empty() {
            *self
                .sentiments
                .entry(page.reviews_all.sentiment.clone())
                .or_default() += 1;
        }
    }

    pub fn from_pages<'a>(
        pages_from: u32,
        pages_to: u32,
        pages: impl IntoIterator<Item = &'a GamePage>,
    ) -> Self {
        let mut summary = Self::new(pages_from, pages_to);
        for page in pages {
            summary.add(page);
        }
        summary
    }
}
