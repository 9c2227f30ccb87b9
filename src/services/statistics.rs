use crate::domain::{ChartGrowth, ChartPage, GamePage, GameSummary, PageLink, SummaryStatistics};
use chrono::Utc;

/// Folds the monthly growth rows of a chart into summary statistics.
///
/// Months with a positive gain feed the gain and max-player sums, the
/// remaining months that report a gain feed the decline and min-player
/// sums. Every month counts towards the player average. Values are
/// truncated to whole numbers per month before summing.
pub fn summarize_growth(growth: &[ChartGrowth]) -> SummaryStatistics {
    if growth.is_empty() {
        return SummaryStatistics::default();
    }

    let mut gain_sum = 0i64;
    let mut decline_sum = 0i64;
    let mut max_players_sum = 0i64;
    let mut min_players_sum = 0i64;
    let mut players_sum = 0i64;
    let mut peak: Option<(u64, &str)> = None;
    let mut trough: Option<(u64, &str)> = None;

    for month in growth {
        let players_peak = month.players_peak.unwrap_or(0) as i64;

        if let Some(gain) = month.gain {
            if gain > 0.0 {
                gain_sum += gain as i64;
                max_players_sum += players_peak;
            } else {
                decline_sum += gain as i64;
                min_players_sum += players_peak;
            }
        }

        if let Some(players) = month.players_peak {
            if peak.map_or(true, |(best, _)| players > best) {
                peak = Some((players, month.month.as_str()));
            }
            if trough.map_or(true, |(worst, _)| players < worst) {
                trough = Some((players, month.month.as_str()));
            }
        }

        players_sum += month.players_average.unwrap_or(0.0) as i64;
    }

    let months = growth.len() as i64;
    let (peak_players, peak_players_date) = peak.unwrap_or((0, ""));
    let (trough_players, trough_players_date) = trough.unwrap_or((0, ""));

    SummaryStatistics {
        average_decline: decline_sum / months,
        average_gain: gain_sum / months,
        average_max_player_count: max_players_sum / months,
        average_min_player_count: min_players_sum / months,
        average_player_count: players_sum / months,
        months_since_release: months,
        peak_players,
        peak_players_date: peak_players_date.to_string(),
        trough_players,
        trough_players_date: trough_players_date.to_string(),
        years_since_release: months / 12,
    }
}

fn names(links: &[PageLink]) -> Vec<String> {
    links.iter().map(|link| link.name.clone()).collect()
}

pub fn build_summary(page: &GamePage, chart: Option<&ChartPage>) -> GameSummary {
    let statistics = chart
        .map(|chart| summarize_growth(&chart.growth))
        .unwrap_or_default();

    GameSummary {
        app_id: page.app_id,
        name: page.name.clone(),
        title: page.title.clone(),
        available: page.available,
        coming_soon: page.coming_soon,
        early_access: page.early_access,
        statistics,
        categories: names(&page.categories),
        developers: names(&page.developers),
        genres: names(&page.genres),
        publishers: names(&page.publishers),
        tags: names(&page.tags),
        social_media: page.social_media.iter().map(|s| s.url.clone()).collect(),
        website: page.website.clone(),
        player_peak_24_hour: chart.and_then(|c| c.peak_24_hour),
        player_peak_all: chart.and_then(|c| c.peak_all_time),
        release_date: page.release_date,
        reviews_all_count: page.reviews_all.count,
        reviews_all_sentiment: page.reviews_all.sentiment.clone(),
        reviews_recent_count: page.reviews_recent.count,
        reviews_recent_sentiment: page.reviews_recent.sentiment.clone(),
        timestamp: Utc::now(),
        url: page.url.clone(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::{AggregateReview, SocialMedia};
    use chrono::NaiveDate;

    fn month(name: &str, average: f64, gain: Option<f64>, peak: Option<u64>) -> ChartGrowth {
        ChartGrowth {
            month: name.to_string(),
            players_average: Some(average),
            gain,
            gain_percentage: None,
            players_peak: peak,
        }
    }

    fn link(title: &str) -> PageLink {
        PageLink {
            name: title.to_uppercase(),
            title: title.to_string(),
            url: String::new(),
        }
    }

    pub(crate) fn game_page(app_id: u64, title: &str) -> GamePage {
        GamePage {
            app_id,
            name: title.replace(' ', ""),
            title: title.to_string(),
            description: String::new(),
            verbose: String::new(),
            available: true,
            coming_soon: false,
            early_access: false,
            categories: vec![link("Single-player")],
            developers: vec![link("Valve")],
            genres: vec![link("Action"), link("Puzzle")],
            publishers: vec![link("Valve")],
            tags: vec![link("Co-op")],
            languages: Vec::new(),
            requirements_minimum: Vec::new(),
            requirements_recommended: Vec::new(),
            reviews_all: AggregateReview {
                count: 300,
                percentage: 98,
                sentiment: "Overwhelmingly Positive".to_string(),
            },
            reviews_recent: AggregateReview::default(),
            release_date_text: "18 Apr, 2011".to_string(),
            release_date: NaiveDate::from_ymd_opt(2011, 4, 18),
            website: Some("http://www.thinkwithportals.com/".to_string()),
            social_media: vec![SocialMedia {
                name: "twitter.com".to_string(),
                url: "https://twitter.com/valve".to_string(),
            }],
            meta: Vec::new(),
            timestamp: Utc::now(),
            url: format!("https://store.steampowered.com/app/{}/", app_id),
        }
    }

    #[test]
    fn empty_growth_is_all_zero() {
        assert_eq!(summarize_growth(&[]), SummaryStatistics::default());
    }

    #[test]
    fn splits_gains_from_declines() {
        let growth = vec![
            month("Last 30 Days", 100.9, Some(10.7), Some(300)),
            month("March 2024", 90.0, Some(-20.2), Some(200)),
            month("February 2024", 110.0, Some(30.0), Some(500)),
            month("July 2012", 60.5, None, Some(100)),
        ];

        let stats = summarize_growth(&growth);

        // gains 10 + 30, decline -20, over four months
        assert_eq!(stats.average_gain, 10);
        assert_eq!(stats.average_decline, -5);
        assert_eq!(stats.average_max_player_count, 200);
        assert_eq!(stats.average_min_player_count, 50);
        assert_eq!(stats.average_player_count, 90);
        assert_eq!(stats.months_since_release, 4);
        assert_eq!(stats.years_since_release, 0);
        assert_eq!(stats.peak_players, 500);
        assert_eq!(stats.peak_players_date, "February 2024");
        assert_eq!(stats.trough_players, 100);
        assert_eq!(stats.trough_players_date, "July 2012");
    }

    #[test]
    fn first_extreme_wins_on_ties() {
        let growth = vec![
            month("A", 1.0, Some(1.0), Some(50)),
            month("B", 1.0, Some(1.0), Some(50)),
        ];

        let stats = summarize_growth(&growth);

        assert_eq!(stats.peak_players_date, "A");
        assert_eq!(stats.trough_players_date, "A");
    }

    #[test]
    fn missing_peaks_are_ignored_for_extremes() {
        let growth = vec![
            month("A", 1.0, Some(1.0), None),
            month("B", 1.0, Some(-1.0), Some(7)),
        ];

        let stats = summarize_growth(&growth);

        assert_eq!(stats.peak_players, 7);
        assert_eq!(stats.trough_players, 7);
        assert_eq!(stats.trough_players_date, "B");
    }

    #[test]
    fn counts_years() {
        let growth: Vec<_> = (0..25)
            .map(|i| month(&format!("M{}", i), 10.0, Some(1.0), Some(10)))
            .collect();

        let stats = summarize_growth(&growth);

        assert_eq!(stats.months_since_release, 25);
        assert_eq!(stats.years_since_release, 2);
    }

    #[test]
    fn summary_without_chart() {
        let page = game_page(620, "Portal 2");

        let summary = build_summary(&page, None);

        assert_eq!(summary.app_id, 620);
        assert_eq!(summary.name, "Portal2");
        assert_eq!(summary.genres, vec!["ACTION", "PUZZLE"]);
        assert_eq!(summary.social_media, vec!["https://twitter.com/valve"]);
        assert_eq!(summary.reviews_all_count, 300);
        assert_eq!(summary.player_peak_all, None);
        assert_eq!(summary.statistics, SummaryStatistics::default());
    }

    #[test]
    fn summary_with_chart() {
        let page = game_page(620, "Portal 2");
        let chart = ChartPage {
            app_id: 620,
            name: "Portal2".to_string(),
            players_now: Some(1),
            peak_24_hour: Some(2214),
            peak_all_time: Some(82783),
            last_updated: None,
            growth: vec![month("Last 30 Days", 1148.49, Some(49.26), Some(2093))],
            timestamp: Utc::now(),
            url: "https://steamcharts.com/app/620".to_string(),
        };

        let summary = build_summary(&page, Some(&chart));

        assert_eq!(summary.player_peak_24_hour, Some(2214));
        assert_eq!(summary.player_peak_all, Some(82783));
        assert_eq!(summary.statistics.peak_players, 2093);
        assert_eq!(summary.statistics.average_gain, 49);
    }
}
