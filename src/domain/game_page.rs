use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A link on the game page that names something: a tag, genre, developer...
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    /// Normalized lookup key, e.g. `CHOICES-MATTER`.
    pub name: String,
    /// Display text, e.g. `Choices Matter`.
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub name: String,
    pub interface: bool,
    pub audio: bool,
    pub subtitles: bool,
}

/// A minimum or recommended hardware specification for one platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Value of the `data-os` attribute: `win`, `mac` or `linux`.
    pub platform: String,
    pub os: String,
    pub processor: String,
    pub memory: String,
    pub graphics: String,
    pub directx: String,
    pub network: String,
    pub storage: String,
    pub soundcard: String,
    pub additional_notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateReview {
    pub count: u64,
    pub percentage: u32,
    pub sentiment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialMedia {
    /// Host of the linked site.
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaTag {
    pub content: Option<String>,
    pub name: Option<String>,
    pub property: Option<String>,
}

/// Everything scraped from a game's store page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamePage {
    pub app_id: u64,
    pub name: String,
    pub title: String,
    pub description: String,
    pub verbose: String,
    pub available: bool,
    pub coming_soon: bool,
    pub early_access: bool,
    pub categories: Vec<PageLink>,
    pub developers: Vec<PageLink>,
    pub genres: Vec<PageLink>,
    pub publishers: Vec<PageLink>,
    pub tags: Vec<PageLink>,
    pub languages: Vec<Language>,
    pub requirements_minimum: Vec<Requirement>,
    pub requirements_recommended: Vec<Requirement>,
    pub reviews_all: AggregateReview,
    pub reviews_recent: AggregateReview,
    pub release_date_text: String,
    pub release_date: Option<NaiveDate>,
    pub website: Option<String>,
    pub social_media: Vec<SocialMedia>,
    pub meta: Vec<MetaTag>,
    pub timestamp: DateTime<Utc>,
    pub url: String,
}
