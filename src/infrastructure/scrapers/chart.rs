use super::{alphanumeric, attr, element_text, first_text, parse_number, parse_selector, PageScraper};
use crate::domain::{ChartGrowth, ChartPage};
use crate::error::{Result, SteamerError};
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};

pub struct ChartScraper {
    title: Selector,
    players_now: Selector,
    peak_24_hour: Selector,
    peak_all_time: Selector,
    last_updated: Selector,
    table_body: Selector,
    row: Selector,
    month: Selector,
    columns: [Selector; 4],
}

impl ChartScraper {
    pub fn new() -> Result<Self> {
        Ok(Self {
            title: parse_selector("#app-title")?,
            players_now: parse_selector("#app-heading div:nth-child(2) span.num")?,
            peak_24_hour: parse_selector("#app-heading div:nth-child(3) span.num")?,
            peak_all_time: parse_selector("#app-heading div:nth-child(4) span.num")?,
            last_updated: parse_selector("div.app-stat abbr.timeago")?,
            table_body: parse_selector("table.common-table tbody")?,
            row: parse_selector("tr")?,
            month: parse_selector("td.month-cell")?,
            columns: [
                parse_selector("td:nth-child(2)")?,
                parse_selector("td:nth-child(3)")?,
                parse_selector("td:nth-child(4)")?,
                parse_selector("td:nth-child(5)")?,
            ],
        })
    }

    fn growth_row(&self, row: &ElementRef) -> ChartGrowth {
        let [average, gain, percentage, peak] =
            self.columns.each_ref().map(|col| first_text(row, col));

        ChartGrowth {
            month: first_text(row, &self.month),
            players_average: parse_number(&average),
            gain: parse_number(&gain),
            gain_percentage: parse_number(&percentage),
            players_peak: parse_number(&peak),
        }
    }

    fn last_updated(&self, root: &ElementRef) -> Option<DateTime<Utc>> {
        let abbr = root.select(&self.last_updated).next()?;
        let raw = attr(&abbr, "title").unwrap_or_else(|| element_text(&abbr));
        DateTime::parse_from_rfc3339(&raw)
            .ok()
            .map(|date| date.with_timezone(&Utc))
    }
}

/// The trailing path segment of `https://steamcharts.com/app/<id>`.
fn app_id_from_url(url: &str) -> Option<u64> {
    url.trim_end_matches('/').rsplit('/').next()?.parse().ok()
}

impl PageScraper for ChartScraper {
    type Output = ChartPage;

    fn scrape(&self, document: &Html, url: &str) -> Result<ChartPage> {
        let root = document.root_element();

        let name = alphanumeric(&first_text(&root, &self.title));
        if name.is_empty() {
            return Err(SteamerError::Parse(format!("no app title on chart page {}", url)));
        }

        let growth = root
            .select(&self.table_body)
            .next()
            .map(|body| {
                body.select(&self.row)
                    .map(|row| self.growth_row(&row))
                    .collect()
            })
            .unwrap_or_default();

        Ok(ChartPage {
            app_id: app_id_from_url(url).unwrap_or_default(),
            name,
            players_now: parse_number(&first_text(&root, &self.players_now)),
            peak_24_hour: parse_number(&first_text(&root, &self.peak_24_hour)),
            peak_all_time: parse_number(&first_text(&root, &self.peak_all_time)),
            last_updated: self.last_updated(&root),
            growth,
            timestamp: Utc::now(),
            url: url.to_string(),
        })
    }
}
