use super::{
    ChartPage, CrawlLog, CrawlSummary, GamePage, GameSummary, SearchResult, Snapshot,
    SummaryRecord,
};
use crate::error::Result;

/// Identifies a game's output directory. Names alone collide (they are
/// stripped to alphanumerics), so the app id is part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameKey {
    pub app_id: u64,
    pub name: String,
}

impl GameKey {
    pub fn new(app_id: u64, name: impl Into<String>) -> Self {
        Self {
            app_id,
            name: name.into(),
        }
    }

    pub fn dir_name(&self) -> String {
        format!("{}-{}", self.app_id, self.name)
    }
}

impl From<&SearchResult> for GameKey {
    fn from(result: &SearchResult) -> Self {
        Self::new(result.app_id, result.name.clone())
    }
}

impl From<&GamePage> for GameKey {
    fn from(page: &GamePage) -> Self {
        Self::new(page.app_id, page.name.clone())
    }
}

pub trait Storage: Send + Sync {
    fn save_search_result(&self, result: &SearchResult) -> Result<()>;
    fn save_game_page(&self, page: &GamePage) -> Result<()>;
    fn save_chart_page(&self, game: &GameKey, chart: &ChartPage) -> Result<()>;
    fn save_summary(&self, summary: &GameSummary) -> Result<()>;
    fn save_summary_records(
        &self,
        pages_from: u32,
        pages_to: u32,
        records: &[SummaryRecord],
    ) -> Result<()>;
    fn save_snapshot(&self, snapshot: &Snapshot) -> Result<()>;
    fn has_visited(&self, url: &str) -> Result<bool>;
    fn save_crawl_log(&self, log: &CrawlLog) -> Result<()>;
    fn load_crawl_log(&self, pages_from: u32, pages_to: u32) -> Result<Option<CrawlLog>>;
    fn save_crawl_summary(&self, summary: &CrawlSummary) -> Result<()>;
}

pub struct StorageKeys;

impl StorageKeys {
    // Base directories
    pub const GAMES_DIR: &'static str = "games";

    pub const SEARCH_RESULT_PREFIX: &'static str = "search-result";
    pub const PAGE_RESULT_PREFIX: &'static str = "page-result";
    pub const CHART_RESULT_PREFIX: &'static str = "chart-result";
    pub const SUMMARY_PREFIX: &'static str = "summary";
    pub const SUMMARY_CSV: &'static str = "summary.csv";

    pub const CRAWL_LOG_SUFFIX: &'static str = "log";
    pub const CRAWL_SUMMARY_SUFFIX: &'static str = "summary";
    pub const SUMMARIES_CSV_SUFFIX: &'static str = "summaries";
}
