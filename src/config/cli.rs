use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Directory to store scraped pages, snapshots and reports
    #[arg(long, env = "STEAMER_DATA_DIR", default_value = "steambot", global = true)]
    pub data_dir: PathBuf,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 10, global = true)]
    pub timeout_secs: u64,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Crawl search pages, game pages and player charts
    Crawl(CrawlArgs),
    /// Print the search filters offered by the store
    Filters,
    /// Split a page range across several crawler processes
    Farm(FarmArgs),
}

#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
pub struct CrawlArgs {
    /// First search page to crawl
    #[arg(long, default_value_t = 1)]
    pub pages_from: u32,

    /// Last search page to crawl (inclusive)
    #[arg(long, default_value_t = 1)]
    pub pages_to: u32,

    /// Search filter by name, e.g. `--filter action --filter "free to play"`
    #[arg(long = "filter")]
    pub filters: Vec<String>,

    /// Fetch pages even if they were visited by a previous crawl
    #[arg(long)]
    pub revisit: bool,

    /// Do not fetch player-count charts
    #[arg(long)]
    pub skip_charts: bool,

    /// Maximum number of requests in flight
    #[arg(long, default_value_t = 8)]
    pub concurrency: usize,

    /// Keep paginating after a search page returns no results
    #[arg(long)]
    pub no_terminate_zero: bool,
}

impl Default for CrawlArgs {
    fn default() -> Self {
        Self {
            pages_from: 1,
            pages_to: 1,
            filters: Vec::new(),
            revisit: false,
            skip_charts: false,
            concurrency: 8,
            no_terminate_zero: false,
        }
    }
}

impl CrawlArgs {
    /// Renders these options back into `crawl` command-line arguments.
    pub fn to_cli_args(&self) -> Vec<String> {
        let mut args = vec![
            "--pages-from".to_string(),
            self.pages_from.to_string(),
            "--pages-to".to_string(),
            self.pages_to.to_string(),
            "--concurrency".to_string(),
            self.concurrency.to_string(),
        ];
        for filter in &self.filters {
            args.push("--filter".to_string());
            args.push(filter.clone());
        }
        if self.revisit {
            args.push("--revisit".to_string());
        }
        if self.skip_charts {
            args.push("--skip-charts".to_string());
        }
        if self.no_terminate_zero {
            args.push("--no-terminate-zero".to_string());
        }
        args
    }
}

#[derive(clap::Args, Debug, Clone)]
pub struct FarmArgs {
    /// Number of crawler processes to spawn
    #[arg(long, default_value_t = 4)]
    pub workers: u32,

    #[command(flatten)]
    pub crawl: CrawlArgs,
}
