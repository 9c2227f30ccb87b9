use super::{alphanumeric, attr, first_text, parse_number, parse_selector, PageScraper};
use crate::domain::{SearchPage, SearchResult};
use crate::error::Result;
use chrono::Utc;
use scraper::{ElementRef, Html, Selector};
use tracing::warn;

pub struct SearchScraper {
    row: Selector,
    title: Selector,
}

impl SearchScraper {
    pub fn new() -> Result<Self> {
        Ok(Self {
            row: parse_selector("a.search_result_row[href]")?,
            title: parse_selector(".title")?,
        })
    }

    fn scrape_row(&self, row: &ElementRef) -> Option<SearchResult> {
        let url = attr(row, "href")?;
        let app_id: u64 = attr(row, "data-ds-appid").and_then(|id| parse_number(&id))?;
        let title = first_text(row, &self.title);

        let mut name = alphanumeric(&title);
        if name.is_empty() {
            name = app_id.to_string();
        }

        Some(SearchResult {
            app_id,
            bundle_id: attr(row, "data-ds-bundleid").and_then(|id| parse_number(&id)),
            package_id: attr(row, "data-ds-packageid").and_then(|id| parse_number(&id)),
            crtr_ids: id_list(row, "data-ds-crtrids"),
            desc_ids: id_list(row, "data-ds-descids"),
            tag_ids: id_list(row, "data-ds-tagids"),
            name,
            title,
            timestamp: Utc::now(),
            url,
        })
    }
}

/// Reads an attribute shaped like `[19,1685,3814]`. Entries that are not
/// integers are dropped.
fn id_list(row: &ElementRef, name: &str) -> Vec<u64> {
    attr(row, name)
        .map(|raw| {
            raw.trim_start_matches('[')
                .trim_end_matches(']')
                .split(',')
                .filter_map(|id| id.trim().parse().ok())
                .collect()
        })
        .unwrap_or_default()
}

impl PageScraper for SearchScraper {
    type Output = SearchPage;

    fn scrape(&self, document: &Html, url: &str) -> Result<SearchPage> {
        let mut page = SearchPage::default();

        for row in document.select(&self.row) {
            match self.scrape_row(&row) {
                Some(result) => page.results.push(result),
                None => {
                    warn!(
                        "Search row without app id on {}: {:?}",
                        url,
                        row.value().attr("href")
                    );
                    page.rejected += 1;
                }
            }
        }

        Ok(page)
    }
}
