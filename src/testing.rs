//! In-process stand-ins for yt-dlp used by unit tests.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use filetime::FileTime;
use tokio::sync::Semaphore;

use crate::errors::{AppError, AppResult};
use crate::video::{Downloader, VideoCandidate, VideoSearch};

/// 2001-01-01, the "upload date" the fake stamps on every file
pub const OLD_TIMESTAMP: i64 = 978_307_200;

pub enum FakeSearch {
    Hits(Vec<String>),
    Fails(String),
}

#[async_trait]
impl VideoSearch for FakeSearch {
    async fn search(&self, _keyword: &str, limit: u32) -> AppResult<Vec<VideoCandidate>> {
        match self {
            FakeSearch::Hits(ids) => Ok(ids
                .iter()
                .take(limit as usize)
                .map(VideoCandidate::new)
                .collect()),
            FakeSearch::Fails(msg) => Err(AppError::search(msg.clone())),
        }
    }
}

#[derive(Default)]
pub struct FakeDownloader {
    pub fail_predict: HashSet<String>,
    pub fail_download: HashSet<String>,
    /// Every predicted path is replaced by this one
    pub predicted_override: Option<PathBuf>,
    pub downloaded: Mutex<Vec<String>>,
    /// Each download takes one permit before writing
    pub gate: Option<Arc<Semaphore>>,
}

impl FakeDownloader {
    pub fn failing_download(ids: &[&str]) -> Self {
        Self {
            fail_download: ids.iter().map(|id| id.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn title_for(id: &str) -> String {
        format!("Video {} (Official)!.mp4", id)
    }

    pub fn downloaded(&self) -> Vec<String> {
        self.downloaded.lock().unwrap().clone()
    }
}

fn video_id(url: &str) -> String {
    url.rsplit("v=").next().unwrap_or_default().to_string()
}

#[async_trait]
impl Downloader for FakeDownloader {
    async fn predict_filename(&self, url: &str, dir: &Path) -> AppResult<PathBuf> {
        let id = video_id(url);
        if self.fail_predict.contains(&id) {
            return Err(AppError::fetch(
                "Failed to get filename",
                format!("ERROR: [youtube] {}: Private video", id),
            ));
        }
        if let Some(path) = &self.predicted_override {
            return Ok(path.clone());
        }
        Ok(dir.join(Self::title_for(&id)))
    }

    async fn download(&self, url: &str, _dir: &Path, target: &Path) -> AppResult<PathBuf> {
        let id = video_id(url);
        if self.fail_download.contains(&id) {
            return Err(AppError::fetch(
                "Download error",
                format!("ERROR: [youtube] {}: Video unavailable", id),
            ));
        }

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| AppError::fetch("Download error", e.to_string()))?
                .forget();
        }

        tokio::fs::write(target, format!("video bytes {}", id)).await?;
        let old = FileTime::from_unix_time(OLD_TIMESTAMP, 0);
        filetime::set_file_times(target, old, old)?;
        self.downloaded.lock().unwrap().push(id);
        Ok(target.to_path_buf())
    }
}
