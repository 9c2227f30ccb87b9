use super::PageFetcher;
use crate::domain::{chart_url, ChartPage, STEAM_CHARTS_URL};
use crate::error::Result;
use crate::infrastructure::scrapers::chart::ChartScraper;

pub struct SteamChartsClient {
    fetcher: PageFetcher,
    chart: ChartScraper,
    charts_url: String,
}

impl SteamChartsClient {
    pub fn new(fetcher: PageFetcher) -> Result<Self> {
        Self::with_base_url(fetcher, STEAM_CHARTS_URL)
    }

    /// `charts_url` is the prefix the app id is appended to.
    pub fn with_base_url(fetcher: PageFetcher, charts_url: &str) -> Result<Self> {
        Ok(Self {
            fetcher,
            chart: ChartScraper::new()?,
            charts_url: charts_url.to_string(),
        })
    }

    pub fn chart_url(&self, app_id: u64) -> String {
        chart_url(&self.charts_url, app_id)
    }

    pub async fn chart(&self, app_id: u64) -> Result<ChartPage> {
        let mut chart = self
            .fetcher
            .scrape(&self.chart, &self.chart_url(app_id), None)
            .await?;
        chart.app_id = app_id;
        Ok(chart)
    }
}
