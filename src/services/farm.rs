use crate::config::cli::{Args, CrawlArgs, FarmArgs};
use crate::domain::storage::Storage;
use crate::error::{Result, SteamerError};
use crate::services::crawler::validate_range;
use futures::future::join_all;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{error, info, warn};

/// Splits `from..=to` into at most `workers` contiguous, disjoint ranges
/// covering every page. Earlier shards take the remainder pages.
pub fn shard_ranges(pages_from: u32, pages_to: u32, workers: u32) -> Vec<(u32, u32)> {
    if pages_from == 0 || pages_from > pages_to {
        return Vec::new();
    }

    let total = pages_to - pages_from + 1;
    let shards = workers.clamp(1, total);
    let base = total / shards;
    let remainder = total % shards;

    let mut ranges = Vec::with_capacity(shards as usize);
    let mut start = pages_from;
    for shard in 0..shards {
        let size = base + u32::from(shard < remainder);
        let end = start + (size - 1);
        ranges.push((start, end));
        if shard + 1 < shards {
            start = end + 1;
        }
    }
    ranges
}

pub struct FarmService {
    store: Arc<dyn Storage>,
    data_dir: PathBuf,
    timeout_secs: u64,
    log_level: String,
    program: Option<PathBuf>,
}

impl FarmService {
    pub fn new(args: &Args, store: Arc<dyn Storage>) -> Self {
        Self {
            store,
            data_dir: args.data_dir.clone(),
            timeout_secs: args.timeout_secs,
            log_level: args.log_level.clone(),
            program: None,
        }
    }

    /// Runs shards with `program` instead of the current executable.
    #[cfg(test)]
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = Some(program.into());
        self
    }

    /// Command line of the child crawler for one shard. Global options come
    /// first, then the `crawl` subcommand with the shard's page range.
    pub fn child_args(&self, shard: &CrawlArgs) -> Vec<String> {
        let mut args = vec![
            "--data-dir".to_string(),
            self.data_dir.to_string_lossy().into_owned(),
            "--timeout-secs".to_string(),
            self.timeout_secs.to_string(),
            "--log-level".to_string(),
            self.log_level.clone(),
            "crawl".to_string(),
        ];
        args.extend(shard.to_cli_args());
        args
    }

    pub async fn run(&self, farm: &FarmArgs) -> Result<()> {
        validate_range(farm.crawl.pages_from, farm.crawl.pages_to)?;
        let exe = match &self.program {
            Some(program) => program.clone(),
            None => std::env::current_exe()?,
        };

        let ranges = shard_ranges(farm.crawl.pages_from, farm.crawl.pages_to, farm.workers);
        let shards: Vec<CrawlArgs> = ranges
            .into_iter()
            .map(|(pages_from, pages_to)| CrawlArgs {
                pages_from,
                pages_to,
                ..farm.crawl.clone()
            })
            .collect();
        info!("Farming {} shards with {:?}", shards.len(), exe);

        // Children already started are killed when a later spawn fails.
        let mut children = Vec::with_capacity(shards.len());
        for shard in &shards {
            let child = Command::new(&exe)
                .args(self.child_args(shard))
                .kill_on_drop(true)
                .spawn()?;
            info!(
                "Spawned worker {:?} for pages {}..={}",
                child.id(),
                shard.pages_from,
                shard.pages_to
            );
            children.push(child);
        }

        let statuses: Vec<std::io::Result<ExitStatus>> =
            join_all(children.iter_mut().map(|child| child.wait())).await;

        let mut failed = 0;
        for (shard, status) in shards.iter().zip(statuses) {
            match status {
                Ok(status) if status.success() => {}
                Ok(status) => {
                    failed += 1;
                    error!(
                        "Worker for pages {}..={} exited with {}",
                        shard.pages_from, shard.pages_to, status
                    );
                }
                Err(e) => {
                    failed += 1;
                    error!(
                        "Worker for pages {}..={} could not be awaited: {}",
                        shard.pages_from, shard.pages_to, e
                    );
                }
            }
        }

        self.report(&shards)?;

        if failed > 0 {
            return Err(SteamerError::Other(format!(
                "{} of {} workers failed",
                failed,
                shards.len()
            )));
        }
        Ok(())
    }

    fn report(&self, shards: &[CrawlArgs]) -> Result<()> {
        let (mut scraped, mut charts, mut failures) = (0, 0, 0);
        for shard in shards {
            match self.store.load_crawl_log(shard.pages_from, shard.pages_to)? {
                Some(log) => {
                    scraped += log.games_scraped;
                    charts += log.charts_scraped;
                    failures += log.failures;
                }
                None => warn!(
                    "No crawl log for pages {}..={}",
                    shard.pages_from, shard.pages_to
                ),
            }
        }
        info!(
            "Farm finished: {} games scraped, {} charts, {} failures",
            scraped, charts, failures
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::FileSystemStore;
    use clap::Parser;

    #[test]
    fn shards_cover_range_without_overlap() {
        assert_eq!(shard_ranges(1, 10, 3), vec![(1, 4), (5, 7), (8, 10)]);
        assert_eq!(shard_ranges(5, 8, 2), vec![(5, 6), (7, 8)]);
    }

    #[test]
    fn no_more_shards_than_pages() {
        assert_eq!(shard_ranges(3, 4, 8), vec![(3, 3), (4, 4)]);
        assert_eq!(shard_ranges(7, 7, 4), vec![(7, 7)]);
    }

    #[test]
    fn zero_workers_means_one_shard() {
        assert_eq!(shard_ranges(1, 5, 0), vec![(1, 5)]);
    }

    #[test]
    fn shards_reach_the_last_page_number() {
        assert_eq!(
            shard_ranges(u32::MAX - 1, u32::MAX, 2),
            vec![(u32::MAX - 1, u32::MAX - 1), (u32::MAX, u32::MAX)]
        );
        assert_eq!(shard_ranges(1, u32::MAX, 1), vec![(1, u32::MAX)]);
        assert_eq!(shard_ranges(u32::MAX, u32::MAX, 3), vec![(u32::MAX, u32::MAX)]);
    }

    #[test]
    fn empty_for_invalid_range() {
        assert!(shard_ranges(4, 3, 2).is_empty());
        assert!(shard_ranges(0, 3, 2).is_empty());
    }

    #[test]
    fn child_args_forward_global_options() {
        let args = Args::try_parse_from([
            "steamer",
            "--data-dir",
            "out",
            "--log-level",
            "debug",
            "farm",
        ])
        .unwrap();
        let farm = FarmService::new(&args, Arc::new(FileSystemStore::new("out")));
        let shard = CrawlArgs {
            pages_from: 3,
            pages_to: 4,
            skip_charts: true,
            ..CrawlArgs::default()
        };

        let child = farm.child_args(&shard);

        assert_eq!(
            &child[..7],
            &["--data-dir", "out", "--timeout-secs", "10", "--log-level", "debug", "crawl"]
        );
        let reparsed = Args::try_parse_from(
            std::iter::once("steamer".to_string()).chain(child.iter().cloned()),
        )
        .unwrap();
        match reparsed.command {
            Some(crate::config::cli::Command::Crawl(crawl)) => assert_eq!(crawl, shard),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    fn farm_args(workers: u32, pages_to: u32) -> FarmArgs {
        FarmArgs {
            workers,
            crawl: CrawlArgs {
                pages_from: 1,
                pages_to,
                ..CrawlArgs::default()
            },
        }
    }

    fn farm(data_dir: &std::path::Path, program: &str) -> FarmService {
        let args = Args::try_parse_from(["steamer", "farm"]).unwrap();
        FarmService::new(&args, Arc::new(FileSystemStore::new(data_dir))).with_program(program)
    }

    #[tokio::test]
    async fn farm_fails_when_a_worker_fails() {
        let tmp = tempfile::tempdir().unwrap();

        let err = farm(tmp.path(), "false")
            .run(&farm_args(2, 4))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("2 of 2 workers failed"));
    }

    #[tokio::test]
    async fn farm_succeeds_when_every_worker_succeeds() {
        let tmp = tempfile::tempdir().unwrap();

        assert!(farm(tmp.path(), "true").run(&farm_args(3, 6)).await.is_ok());
    }

    #[tokio::test]
    async fn farm_fails_when_a_worker_cannot_start() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("no-such-crawler");

        let result = farm(tmp.path(), missing.to_str().unwrap())
            .run(&farm_args(2, 2))
            .await;

        assert!(matches!(result, Err(SteamerError::Io(_))));
    }
}
