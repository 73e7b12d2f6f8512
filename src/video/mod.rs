use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::errors::AppResult;

pub mod youtube;

pub use youtube::YtDlp;

/// One search hit, identified by its YouTube video id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoCandidate {
    pub id: String,
    pub title: Option<String>,
}

impl VideoCandidate {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
        }
    }
}

/// Keyword search. Results come back in relevance order, at most `limit` of them.
#[async_trait]
pub trait VideoSearch: Send + Sync {
    async fn search(&self, keyword: &str, limit: u32) -> AppResult<Vec<VideoCandidate>>;
}

#[async_trait]
pub trait Downloader: Send + Sync {
    /// Path the downloader would write `url` to inside `dir`. No transfer happens.
    async fn predict_filename(&self, url: &str, dir: &Path) -> AppResult<PathBuf>;

    /// Download `url` to `target` and return the path the file actually ended up at.
    async fn download(&self, url: &str, dir: &Path, target: &Path) -> AppResult<PathBuf>;
}
