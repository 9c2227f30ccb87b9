mod chart;
mod filters;
mod game_page;
mod report;
mod search;
mod snapshot;
pub(crate) mod storage;
mod summary;

pub use chart::{chart_url, ChartGrowth, ChartPage, STEAM_CHARTS_URL};
pub use filters::{normalize_key, SearchFilters, SearchQuery, STEAM_SEARCH_URL};
pub use game_page::{
    AggregateReview, GamePage, Language, MetaTag, PageLink, Requirement, SocialMedia,
};
pub use report::{CrawlLog, CrawlSummary};
pub use search::{SearchPage, SearchResult};
pub use snapshot::{snapshot_file_name, url_host, with_scheme, Snapshot};
pub use summary::{GameSummary, SummaryRecord, SummaryStatistics};
