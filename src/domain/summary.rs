use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Player statistics derived from a chart's monthly growth table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub average_decline: i64,
    pub average_gain: i64,
    pub average_max_player_count: i64,
    pub average_min_player_count: i64,
    pub average_player_count: i64,
    pub months_since_release: i64,
    pub peak_players: u64,
    pub peak_players_date: String,
    pub trough_players: u64,
    pub trough_players_date: String,
    pub years_since_release: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSummary {
    pub app_id: u64,
    pub name: String,
    pub title: String,
    pub available: bool,
    pub coming_soon: bool,
    pub early_access: bool,
    #[serde(flatten)]
    pub statistics: SummaryStatistics,
    pub categories: Vec<String>,
    pub developers: Vec<String>,
    pub genres: Vec<String>,
    pub publishers: Vec<String>,
    pub tags: Vec<String>,
    pub social_media: Vec<String>,
    pub website: Option<String>,
    pub player_peak_24_hour: Option<u64>,
    pub player_peak_all: Option<u64>,
    pub release_date: Option<NaiveDate>,
    pub reviews_all_count: u64,
    pub reviews_all_sentiment: String,
    pub reviews_recent_count: u64,
    pub reviews_recent_sentiment: String,
    pub timestamp: DateTime<Utc>,
    pub url: String,
}

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn row(label: &str, value: impl ToString) -> Vec<String> {
    vec![label.to_string(), value.to_string()]
}

fn list_row(label: &str, values: &[String]) -> Vec<String> {
    let mut row = vec![label.to_string()];
    row.extend(values.iter().cloned());
    row
}

impl GameSummary {
    /// Vertical label/value rows for the per-game `summary.csv`. List values
    /// spill into extra columns, so rows differ in length.
    pub fn to_csv_rows(&self) -> Vec<Vec<String>> {
        let s = &self.statistics;
        vec![
            row("App ID", self.app_id),
            row("Available", self.available),
            row("Average Decline", s.average_decline),
            row("Average Gain", s.average_gain),
            row("Average Max Player Count", s.average_max_player_count),
            row("Average Min Player Count", s.average_min_player_count),
            row("Average Player Count", s.average_player_count),
            list_row("Categories", &self.categories),
            row("Coming Soon", self.coming_soon),
            list_row("Developers", &self.developers),
            row("Early Access", self.early_access),
            list_row("Genres", &self.genres),
            row("Name", &self.name),
            row("Months Since Release", s.months_since_release),
            row("Peak Players", s.peak_players),
            row("Peak Players Date", &s.peak_players_date),
            row("Player Peak 24 Hour", opt(&self.player_peak_24_hour)),
            row("Player Peak All", opt(&self.player_peak_all)),
            list_row("Publishers", &self.publishers),
            row("Release Date", opt(&self.release_date)),
            row("Reviews All Count", self.reviews_all_count),
            row("Reviews All Sentiment", &self.reviews_all_sentiment),
            row("Reviews Recent Count", self.reviews_recent_count),
            row("Reviews Recent Sentiment", &self.reviews_recent_sentiment),
            list_row("Social Media", &self.social_media),
            list_row("Tags", &self.tags),
            row("Timestamp", self.timestamp.to_rfc3339()),
            row("Title", &self.title),
            row("Trough Players", s.trough_players),
            row("Trough Players Date", &s.trough_players_date),
            row("URL", &self.url),
            row("Website", opt(&self.website)),
            row("Years Since Release", s.years_since_release),
        ]
    }
}

/// Flat form of a [`GameSummary`], one line of the crawl-wide summaries CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub app_id: u64,
    pub name: String,
    pub title: String,
    pub available: bool,
    pub coming_soon: bool,
    pub early_access: bool,
    pub average_decline: i64,
    pub average_gain: i64,
    pub average_max_player_count: i64,
    pub average_min_player_count: i64,
    pub average_player_count: i64,
    pub months_since_release: i64,
    pub peak_players: u64,
    pub peak_players_date: String,
    pub trough_players: u64,
    pub trough_players_date: String,
    pub years_since_release: i64,
    pub categories: String,
    pub developers: String,
    pub genres: String,
    pub publishers: String,
    pub tags: String,
    pub social_media: String,
    pub website: String,
    pub player_peak_24_hour: String,
    pub player_peak_all: String,
    pub release_date: String,
    pub reviews_all_count: u64,
    pub reviews_all_sentiment: String,
    pub reviews_recent_count: u64,
    pub reviews_recent_sentiment: String,
    pub timestamp: String,
    pub url: String,
}

impl From<&GameSummary> for SummaryRecord {
    fn from(summary: &GameSummary) -> Self {
        let s = &summary.statistics;
        Self {
            app_id: summary.app_id,
            name: summary.name.clone(),
            title: summary.title.clone(),
            available: summary.available,
            coming_soon: summary.coming_soon,
            early_access: summary.early_access,
            average_decline: s.average_decline,
            average_gain: s.average_gain,
            average_max_player_count: s.average_max_player_count,
            average_min_player_count: s.average_min_player_count,
            average_player_count: s.average_player_count,
            months_since_release: s.months_since_release,
            peak_players: s.peak_players,
            peak_players_date: s.peak_players_date.clone(),
            trough_players: s.trough_players,
            trough_players_date: s.trough_players_date.clone(),
            years_since_release: s.years_since_release,
            categories: summary.categories.join(","),
            developers: summary.developers.join(","),
            genres: summary.genres.join(","),
            publishers: summary.publishers.join(","),
            tags: summary.tags.join(","),
            social_media: summary.social_media.join(","),
            website: opt(&summary.website),
            player_peak_24_hour: opt(&summary.player_peak_24_hour),
            player_peak_all: opt(&summary.player_peak_all),
            release_date: opt(&summary.release_date),
            reviews_all_count: summary.reviews_all_count,
            reviews_all_sentiment: summary.reviews_all_sentiment.clone(),
            reviews_recent_count: summary.reviews_recent_count,
            reviews_recent_sentiment: summary.reviews_recent_sentiment.clone(),
            timestamp: summary.timestamp.to_rfc3339(),
            url: summary.url.clone(),
        }
    }
}
