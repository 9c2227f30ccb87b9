use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the store search results, the abbreviated view of a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub app_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_id: Option<u64>,
    pub crtr_ids: Vec<u64>,
    pub desc_ids: Vec<u64>,
    pub tag_ids: Vec<u64>,
    pub name: String,
    pub title: String,
    pub timestamp: DateTime<Utc>,
    pub url: String,
}

/// The rows of one search page.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub results: Vec<SearchResult>,
    /// Rows that were present but could not be used, e.g. bundles without an app id.
    pub rejected: usize,
}

impl SearchPage {
    /// A page with no rows at all marks the end of the result set.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty() && self.rejected == 0
    }
}
