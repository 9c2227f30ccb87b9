use crate::config::cli::{Command, CrawlArgs};
use crate::config::Config;
use crate::domain::storage::Storage;
use crate::error::{Result, SteamerError};
use crate::infrastructure::{FileSystemStore, PageFetcher, SteamChartsClient, SteamStoreClient};
use crate::services::crawler::{render_filters, CrawlService};
use crate::services::farm::FarmService;
use std::sync::Arc;
use tracing::{info, Level};

mod config;
mod domain;
mod error;
mod infrastructure;
mod services;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::new()?;

    let level: Level = config
        .args
        .log_level
        .parse()
        .map_err(|_| SteamerError::Other(format!("invalid log level {:?}", config.args.log_level)))?;
    tracing_subscriber::fmt().with_max_level(level).init();

    config.ensure_directories()?;
    let store: Arc<dyn Storage> = Arc::new(FileSystemStore::new(&config.args.data_dir));

    match config.args.command.clone() {
        Some(Command::Farm(farm)) => {
            FarmService::new(&config.args, store).run(&farm).await?;
        }
        Some(Command::Filters) => {
            let crawler = crawl_service(&config, store)?;
            let filters = crawler.filters().await?;
            print!("{}", render_filters(&filters));
        }
        Some(Command::Crawl(crawl)) => {
            crawl_service(&config, store)?.run(&crawl).await?;
        }
        None => {
            crawl_service(&config, store)?
                .run(&CrawlArgs::default())
                .await?;
        }
    }

    info!("Done");
    Ok(())
}

fn crawl_service(config: &Config, store: Arc<dyn Storage>) -> Result<CrawlService> {
    let fetcher = PageFetcher::new(config.http_client.clone(), store.clone());
    let steam = SteamStoreClient::new(fetcher.clone())?;
    let charts = SteamChartsClient::new(fetcher)?;
    Ok(CrawlService::new(store, steam, charts))
}
