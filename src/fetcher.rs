use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};
use filetime::FileTime;
use log::{info, warn};
use tokio::fs;

use crate::errors::{AppError, AppResult};
use crate::utils::{FilenamePolicy, replace_file_name_inplace, watch_url};
use crate::video::{Downloader, VideoCandidate};

/// A file that landed in the download directory
#[derive(Debug, Clone)]
pub struct DownloadResult {
    pub source_url: String,
    pub saved_path: PathBuf,
    /// 1-based position in the search results
    pub index: usize,
    pub completed_at: DateTime<Local>,
}

/// Runs predict -> download -> rename -> touch for one candidate at a time
pub struct Fetcher {
    downloader: Arc<dyn Downloader>,
    download_dir: PathBuf,
    policy: FilenamePolicy,
}

impl Fetcher {
    pub fn new(
        downloader: Arc<dyn Downloader>,
        download_dir: impl Into<PathBuf>,
        policy: FilenamePolicy,
    ) -> Self {
        Self {
            downloader,
            download_dir: download_dir.into(),
            policy,
        }
    }

    pub async fn fetch(&self, candidate: &VideoCandidate, index: usize) -> AppResult<DownloadResult> {
        let source_url = watch_url(&candidate.id);
        info!(
            "[{}] fetching {} ({})",
            index,
            source_url,
            candidate.title.as_deref().unwrap_or("untitled")
        );

        let predicted = self
            .downloader
            .predict_filename(&source_url, &self.download_dir)
            .await?;
        let predicted = self.contain(predicted)?;

        let saved = self
            .downloader
            .download(&source_url, &self.download_dir, &predicted)
            .await?;
        let saved = self.contain(saved)?;

        let final_path = self.rename(&saved).await?;
        touch(&final_path)?;

        info!("[{}] saved {}", index, final_path.display());

        Ok(DownloadResult {
            source_url,
            saved_path: final_path,
            index,
            completed_at: Local::now(),
        })
    }

    /// Resolve relative paths against the download directory and refuse anything outside it.
    fn contain(&self, path: PathBuf) -> AppResult<PathBuf> {
        let path = if path.is_relative() {
            self.download_dir.join(path)
        } else {
            path
        };

        let escapes = path
            .components()
            .any(|component| matches!(component, Component::ParentDir));
        if escapes || !path.starts_with(&self.download_dir) || path == self.download_dir {
            return Err(AppError::fetch(
                "Unexpected output path",
                format!(
                    "{} is not inside {}",
                    path.display(),
                    self.download_dir.display()
                ),
            ));
        }

        Ok(path)
    }

    async fn rename(&self, saved: &Path) -> AppResult<PathBuf> {
        let original_name = saved
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| AppError::fetch("Unexpected output path", saved.display().to_string()))?;

        let new_name = self.policy.apply(&original_name);
        if new_name == original_name {
            return Ok(saved.to_path_buf());
        }

        let new_path = replace_file_name_inplace(saved, &new_name);
        if fs::try_exists(&new_path).await? {
            warn!(
                "{} already exists, keeping {}",
                new_path.display(),
                saved.display()
            );
            return Ok(saved.to_path_buf());
        }

        info!("Renaming {} -> {}", saved.display(), new_path.display());
        fs::rename(saved, &new_path).await?;
        Ok(new_path)
    }
}

/// Stamp access and modification time with "now" so listings sort by download time.
fn touch(path: &Path) -> AppResult<()> {
    let now = FileTime::now();
    filetime::set_file_times(path, now, now)?;
    Ok(())
}
