mod clients;
mod scrapers;
mod storage;

pub use clients::{
    steam_charts::SteamChartsClient, steam_store::SteamStoreClient, PageFetcher,
};
pub use storage::fs_store::FileSystemStore;

#[cfg(test)]
pub(crate) use clients::testing;
