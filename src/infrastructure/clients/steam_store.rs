use super::PageFetcher;
use crate::domain::{GamePage, SearchFilters, SearchPage, SearchQuery, STEAM_SEARCH_URL};
use crate::error::Result;
use crate::infrastructure::scrapers::{
    filters::FilterScraper, game_page::GamePageScraper, search::SearchScraper,
};
use tracing::info;

/// Sent with every game page request so the age gate is skipped.
pub const AGE_GATE_COOKIE: &str =
    "birthtime=-949485599; lastagecheckage=1-0-1940; wants_mature_content=1";

pub struct SteamStoreClient {
    fetcher: PageFetcher,
    filters: FilterScraper,
    search: SearchScraper,
    game_page: GamePageScraper,
    search_url: String,
}

impl SteamStoreClient {
    pub fn new(fetcher: PageFetcher) -> Result<Self> {
        Self::with_search_url(fetcher, STEAM_SEARCH_URL)
    }

    pub fn with_search_url(fetcher: PageFetcher, search_url: &str) -> Result<Self> {
        Ok(Self {
            fetcher,
            filters: FilterScraper::new()?,
            search: SearchScraper::new()?,
            game_page: GamePageScraper::new()?,
            search_url: search_url.to_string(),
        })
    }

    pub async fn search_filters(&self) -> Result<SearchFilters> {
        let filters = self
            .fetcher
            .scrape(&self.filters, &self.search_url, None)
            .await?;
        info!(
            "Fetched {} search filter categories",
            filters.categories().len()
        );
        Ok(filters)
    }

    pub async fn search_page(&self, query: &SearchQuery, page: u32) -> Result<SearchPage> {
        let url = query.page_url(&self.search_url, page);
        self.fetcher.scrape(&self.search, &url, None).await
    }

    pub async fn game_page(&self, url: &str) -> Result<GamePage> {
        self.fetcher
            .scrape(&self.game_page, url, Some(AGE_GATE_COOKIE))
            .await
    }
}
