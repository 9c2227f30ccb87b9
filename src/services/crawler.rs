use crate::config::cli::CrawlArgs;
use crate::domain::storage::{GameKey, Storage};
use crate::domain::{
    ChartPage, CrawlLog, CrawlSummary, GamePage, SearchFilters, SearchQuery,
    SearchResult, SummaryRecord,
};
use crate::error::{Result, SteamerError};
use crate::infrastructure::{SteamChartsClient, SteamStoreClient};
use crate::services::statistics::build_summary;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct CrawlService {
    store: Arc<dyn Storage>,
    steam: SteamStoreClient,
    charts: SteamChartsClient,
}

impl CrawlService {
    pub fn new(store: Arc<dyn Storage>, steam: SteamStoreClient, charts: SteamChartsClient) -> Self {
        info!("Created new Crawl service");
        Self {
            store,
            steam,
            charts,
        }
    }

    pub async fn filters(&self) -> Result<SearchFilters> {
        self.steam.search_filters().await
    }

    pub async fn run(&self, args: &CrawlArgs) -> Result<CrawlLog> {
        validate_range(args.pages_from, args.pages_to)?;
        let concurrency = args.concurrency.max(1);
        info!(
            "Crawling search pages {}..={} ({} in flight)",
            args.pages_from, args.pages_to, concurrency
        );

        let mut log = CrawlLog::new(args.pages_from, args.pages_to, !args.no_terminate_zero);

        let query = self.build_query(&args.filters).await?;
        let results = self
            .search(&query, args.pages_from, args.pages_to, concurrency, &mut log)
            .await;
        info!("Search returned {} games", results.len());

        let targets = select_targets(self.store.as_ref(), &results, args.revisit, &mut log);
        let pages = self.scrape_game_pages(targets, concurrency, &mut log).await?;

        let charts = if args.skip_charts {
            HashMap::new()
        } else {
            self.scrape_charts(&pages, args.revisit, concurrency, &mut log)
                .await
        };

        self.save_summaries(&pages, &charts, &mut log);

        log.finish();
        self.store.save_crawl_log(&log)?;
        info!(
            "Crawl finished: {} games scraped, {} charts, {} skipped, {} failures",
            log.games_scraped, log.charts_scraped, log.games_skipped, log.failures
        );

        Ok(log)
    }

    async fn build_query(&self, filters: &[String]) -> Result<SearchQuery> {
        if filters.is_empty() {
            return Ok(SearchQuery::default());
        }

        let catalogue = self.steam.search_filters().await?;
        if catalogue.is_empty() {
            warn!("The store offered no search filters");
        }
        let (query, unknown) = catalogue.resolve(filters);
        for name in unknown {
            warn!("Unknown search filter {:?}, ignoring it", name);
        }
        info!("Search query: {:?}", query.to_query_string());
        Ok(query)
    }

    /// Fetches search pages in page order. Unless told otherwise, stops at
    /// the first page without any rows.
    async fn search(
        &self,
        query: &SearchQuery,
        pages_from: u32,
        pages_to: u32,
        concurrency: usize,
        log: &mut CrawlLog,
    ) -> Vec<SearchResult> {
        let mut results = Vec::new();
        let mut pages = stream::iter(pages_from..=pages_to)
            .map(|page| async move { (page, self.steam.search_page(query, page).await) })
            .buffered(concurrency);

        while let Some((page, outcome)) = pages.next().await {
            match outcome {
                Ok(search_page) => {
                    log.record_page(page, true);
                    if search_page.is_empty() && log.terminate_zero {
                        info!("Search page {} is empty, stopping", page);
                        break;
                    }
                    debug!(
                        "Search page {}: {} games, {} rejected rows",
                        page,
                        search_page.results.len(),
                        search_page.rejected
                    );
                    for result in search_page.results {
                        if let Err(e) = self.store.save_search_result(&result) {
                            warn!("Could not save search result {}: {}", result.name, e);
                        }
                        results.push(result);
                    }
                }
                Err(e) => {
                    log.record_page(page, false);
                    log.failures += 1;
                    warn!("Search page {} failed: {}", page, e);
                }
            }
        }

        results
    }

    async fn scrape_game_pages(
        &self,
        targets: Vec<String>,
        concurrency: usize,
        log: &mut CrawlLog,
    ) -> Result<Vec<GamePage>> {
        let pb = ProgressBar::new(targets.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .map_err(|e| SteamerError::Other(e.to_string()))?,
        );

        let mut pages = Vec::new();
        let mut fetches = stream::iter(targets)
            .map(|url| async move {
                let page = self.steam.game_page(&url).await;
                (url, page)
            })
            .buffer_unordered(concurrency);

        while let Some((url, outcome)) = fetches.next().await {
            match outcome {
                Ok(page) => {
                    pb.set_message(page.title.clone());
                    if let Err(e) = self.store.save_game_page(&page) {
                        warn!("Could not save game page {}: {}", page.name, e);
                    }
                    log.games_scraped += 1;
                    pages.push(page);
                }
                Err(e) => {
                    log.failures += 1;
                    pb.suspend(|| warn!("Game page {} failed: {}", url, e));
                }
            }
            pb.inc(1);
        }

        pb.finish_with_message("Done scraping game pages");
        Ok(pages)
    }

    async fn scrape_charts(
        &self,
        pages: &[GamePage],
        revisit: bool,
        concurrency: usize,
        log: &mut CrawlLog,
    ) -> HashMap<u64, ChartPage> {
        let mut charts = HashMap::new();

        let mut wanted = Vec::new();
        for page in pages {
            let url = self.charts.chart_url(page.app_id);
            if !revisit && visited_before(self.store.as_ref(), &url, log) {
                debug!("Chart for {} already visited", page.app_id);
                continue;
            }
            wanted.push(page);
        }

        let mut fetches = stream::iter(wanted)
            .map(|page| async move { (page, self.charts.chart(page.app_id).await) })
            .buffer_unordered(concurrency);

        while let Some((page, outcome)) = fetches.next().await {
            match outcome {
                Ok(chart) => {
                    if let Err(e) = self.store.save_chart_page(&GameKey::from(page), &chart) {
                        warn!("Could not save chart for {}: {}", page.name, e);
                    }
                    log.charts_scraped += 1;
                    charts.insert(page.app_id, chart);
                }
                Err(e) => {
                    log.failures += 1;
                    warn!("Chart for {} failed: {}", page.app_id, e);
                }
            }
        }

        charts
    }

    /// Writes the per-game summaries, the summaries CSV of the range and the
    /// crawl summary. Write failures are counted in the log.
    fn save_summaries(
        &self,
        pages: &[GamePage],
        charts: &HashMap<u64, ChartPage>,
        log: &mut CrawlLog,
    ) {
        let mut records = Vec::with_capacity(pages.len());
        for page in pages {
            let summary = build_summary(page, charts.get(&page.app_id));
            if let Err(e) = self.store.save_summary(&summary) {
                log.failures += 1;
                warn!("Could not save summary for {}: {}", summary.name, e);
            }
            records.push(SummaryRecord::from(&summary));
        }

        if records.is_empty() {
            info!("No games scraped, skipping summaries CSV");
        } else if let Err(e) = self
            .store
            .save_summary_records(log.pages_from, log.pages_to, &records)
        {
            log.failures += 1;
            warn!("Could not save summaries CSV: {}", e);
        }

        let crawl_summary = CrawlSummary::from_pages(log.pages_from, log.pages_to, pages);
        if let Err(e) = self.store.save_crawl_summary(&crawl_summary) {
            log.failures += 1;
            warn!("Could not save crawl summary: {}", e);
        }
    }
}

pub fn validate_range(pages_from: u32, pages_to: u32) -> Result<()> {
    if pages_from == 0 || pages_from > pages_to {
        return Err(SteamerError::Other(format!(
            "invalid page range {}..={}",
            pages_from, pages_to
        )));
    }
    Ok(())
}

/// Search result links carry a tracking query that changes with the result
/// position, so it is dropped to keep one URL per game.
pub fn game_url(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    }
}

/// Distinct game URLs to fetch, without the ones a previous crawl already
/// fetched successfully unless `revisit` is set.
pub fn select_targets(
    store: &dyn Storage,
    results: &[SearchResult],
    revisit: bool,
    log: &mut CrawlLog,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut targets = Vec::new();

    for result in results {
        let url = game_url(&result.url);
        if !seen.insert(url.clone()) {
            continue;
        }
        log.games_found += 1;

        if !revisit && visited_before(store, &url, log) {
            log.games_skipped += 1;
            continue;
        }
        targets.push(url);
    }

    targets
}

/// An unreadable snapshot counts as a failure and the URL as not visited,
/// so it is fetched again and the snapshot rewritten.
fn visited_before(store: &dyn Storage, url: &str, log: &mut CrawlLog) -> bool {
    match store.has_visited(url) {
        Ok(visited) => visited,
        Err(e) => {
            log.failures += 1;
            warn!("Unreadable snapshot for {}, fetching again: {}", url, e);
            false
        }
    }
}

/// Human readable listing of the filter catalogue, grouped by parameter.
pub fn render_filters(filters: &SearchFilters) -> String {
    let mut out = String::new();
    for (param, options) in filters.categories() {
        out.push_str(&format!("{}:\n", param));
        for (key, value) in options {
            out.push_str(&format!("  {:<40} {}\n", key, value));
        }
    }
    out
}
