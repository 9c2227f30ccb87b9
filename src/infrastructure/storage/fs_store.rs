use crate::domain::storage::{GameKey, Storage, StorageKeys};
use crate::domain::{
    snapshot_file_name, url_host, ChartPage, CrawlLog, CrawlSummary, GamePage, GameSummary,
    SearchResult, Snapshot, SummaryRecord,
};
use crate::error::{Result, SteamerError};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone)]
pub struct FileSystemStore {
    data_dir: PathBuf,
}

impl FileSystemStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn game_dir(&self, game: &GameKey) -> PathBuf {
        self.data_dir
            .join(StorageKeys::GAMES_DIR)
            .join(game.dir_name())
    }

    fn snapshot_path(&self, url: &str) -> PathBuf {
        self.data_dir
            .join(url_host(url))
            .join(snapshot_file_name(url))
    }

    fn range_file(&self, pages_from: u32, pages_to: u32, suffix: &str, ext: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}-{}-{}.{}", pages_from, pages_to, suffix, ext))
    }

    fn ensure_dir(&self, dir: &Path) -> Result<()> {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    fn write_json_file<T: serde::Serialize + ?Sized>(&self, path: &Path, data: &T) -> Result<()> {
        if let Some(dir) = path.parent() {
            self.ensure_dir(dir)?;
        }
        let content = serde_json::to_string_pretty(data)?;
        // Written next to the target then renamed, so readers never see a
        // half written file.
        let partial = path.with_extension("json.part");
        fs::write(&partial, content)?;
        fs::rename(&partial, path)?;
        Ok(())
    }

    fn read_json_file<T: serde::de::DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            Ok(Some(serde_json::from_str(&content)?))
        } else {
            Ok(None)
        }
    }

    fn write_summary_csv(&self, dir: &Path, summary: &GameSummary) -> Result<()> {
        self.ensure_dir(dir)?;
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(dir.join(StorageKeys::SUMMARY_CSV))?;
        for row in summary.to_csv_rows() {
            writer.write_record(&row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl Storage for FileSystemStore {
    fn save_search_result(&self, result: &SearchResult) -> Result<()> {
        let path = self.game_dir(&GameKey::from(result)).join(format!(
            "{}-{}.json",
            StorageKeys::SEARCH_RESULT_PREFIX,
            result.name
        ));
        self.write_json_file(&path, result)
    }

    fn save_game_page(&self, page: &GamePage) -> Result<()> {
        let path = self.game_dir(&GameKey::from(page)).join(format!(
            "{}-{}.json",
            StorageKeys::PAGE_RESULT_PREFIX,
            page.name
        ));
        self.write_json_file(&path, page)
    }

    fn save_chart_page(&self, game: &GameKey, chart: &ChartPage) -> Result<()> {
        let path = self.game_dir(game).join(format!(
            "{}-{}.json",
            StorageKeys::CHART_RESULT_PREFIX,
            game.name
        ));
        self.write_json_file(&path, chart)
    }

    fn save_summary(&self, summary: &GameSummary) -> Result<()> {
        let dir = self.game_dir(&GameKey::new(summary.app_id, summary.name.clone()));
        let path = dir.join(format!(
            "{}-{}.json",
            StorageKeys::SUMMARY_PREFIX,
            summary.name.to_lowercase()
        ));
        self.write_json_file(&path, summary)?;
        self.write_summary_csv(&dir, summary)
    }

    fn save_summary_records(
        &self,
        pages_from: u32,
        pages_to: u32,
        records: &[SummaryRecord],
    ) -> Result<()> {
        if records.is_empty() {
            return Err(SteamerError::Other(
                "no summaries to write to CSV".to_string(),
            ));
        }

        self.ensure_dir(&self.data_dir)?;
        let path = self.range_file(pages_from, pages_to, StorageKeys::SUMMARIES_CSV_SUFFIX, "csv");
        let mut writer = csv::WriterBuilder::new()
            .has_headers(true)
            .from_path(path)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn save_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        self.write_json_file(&self.snapshot_path(&snapshot.url), snapshot)
    }

    fn has_visited(&self, url: &str) -> Result<bool> {
        let snapshot: Option<Snapshot> = self.read_json_file(&self.snapshot_path(url))?;
        Ok(snapshot.map(|s| s.status_code == 200).unwrap_or(false))
    }

    fn save_crawl_log(&self, log: &CrawlLog) -> Result<()> {
        let path = self.range_file(
            log.pages_from,
            log.pages_to,
            StorageKeys::CRAWL_LOG_SUFFIX,
            "json",
        );
        self.write_json_file(&path, log)
    }

    fn load_crawl_log(&self, pages_from: u32, pages_to: u32) -> Result<Option<CrawlLog>> {
        let path = self.range_file(pages_from, pages_to, StorageKeys::CRAWL_LOG_SUFFIX, "json");
        self.read_json_file(&path)
    }

    fn save_crawl_summary(&self, summary: &CrawlSummary) -> Result<()> {
        let path = self.range_file(
            summary.pages_from,
            summary.pages_to,
            StorageKeys::CRAWL_SUMMARY_SUFFIX,
            "json",
        );
        self.write_json_file(&path, summary)
    }
}
