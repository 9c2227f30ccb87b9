use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const STEAM_CHARTS_URL: &str = "https://steamcharts.com/app/";

/// One month of player history from the chart table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartGrowth {
    pub month: String,
    pub players_average: Option<f64>,
    pub gain: Option<f64>,
    pub gain_percentage: Option<f64>,
    pub players_peak: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartPage {
    pub app_id: u64,
    pub name: String,
    pub players_now: Option<u64>,
    pub peak_24_hour: Option<u64>,
    pub peak_all_time: Option<u64>,
    pub last_updated: Option<DateTime<Utc>>,
    pub growth: Vec<ChartGrowth>,
    pub timestamp: DateTime<Utc>,
    pub url: String,
}

pub fn chart_url(charts_url: &str, app_id: u64) -> String {
    format!("{}{}", charts_url, app_id)
}
