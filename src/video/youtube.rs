use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use log::info;
use serde::Deserialize;
use tokio::process;

use crate::errors::{AppError, AppResult};
use crate::video::{Downloader, VideoCandidate, VideoSearch};

/// Output naming template: title plus original extension
pub const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

#[derive(Debug, Deserialize)]
struct YtDlpEntry {
    id: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YtDlpPlaylist {
    #[serde(default)]
    entries: Vec<YtDlpEntry>,
}

/// Thin wrapper around the yt-dlp executable
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: PathBuf,
}

impl YtDlp {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self) -> process::Command {
        process::Command::new(&self.program)
    }

    fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Search and download the top `count` results in a single invocation.
    /// yt-dlp inherits the terminal and prints its own progress.
    pub async fn download_search(&self, keyword: &str, count: u32, dir: &Path) -> AppResult<()> {
        let template = dir.join(OUTPUT_TEMPLATE);

        let mut cmd = self.command();
        cmd.arg("-o")
            .arg(&template)
            .arg(search_target(keyword, count))
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        info!("Starting batch download: {:?} x{} -> {}", keyword, count, dir.display());

        let status = cmd
            .status()
            .await
            .map_err(|e| AppError::external_command_error(self.program_name(), e.to_string()))?;

        info!("yt-dlp exit code: {:?}", status.code());

        if status.success() {
            Ok(())
        } else {
            Err(AppError::fetch(
                "Download error",
                format!("yt-dlp exited with {}", status),
            ))
        }
    }
}

fn search_target(keyword: &str, count: u32) -> String {
    format!("ytsearch{}:{}", count, keyword)
}

/// Last non-empty stdout line; yt-dlp prints exactly one per `--print`.
fn last_line(stdout: &[u8]) -> Option<String> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .map(str::to_string)
}

fn parse_search_output(stdout: &[u8], limit: u32) -> AppResult<Vec<VideoCandidate>> {
    let playlist: YtDlpPlaylist = serde_json::from_slice(stdout)?;

    Ok(playlist
        .entries
        .into_iter()
        .filter_map(|entry| {
            let id = entry.id?;
            Some(VideoCandidate {
                id,
                title: entry.title,
            })
        })
        .take(limit as usize)
        .collect())
}

#[async_trait]
impl VideoSearch for YtDlp {
    async fn search(&self, keyword: &str, limit: u32) -> AppResult<Vec<VideoCandidate>> {
        let output = self
            .command()
            .arg("--flat-playlist")
            .arg("-J")
            .arg(search_target(keyword, limit))
            .output()
            .await
            .map_err(|e| AppError::external_command_error(self.program_name(), e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            log::error!("yt-dlp search failed: {}", stderr);
            return Err(AppError::search(stderr));
        }

        let candidates = parse_search_output(&output.stdout, limit)
            .map_err(|e| AppError::search(e.to_string()))?;
        info!("Search {:?} returned {} results", keyword, candidates.len());
        Ok(candidates)
    }
}

#[async_trait]
impl Downloader for YtDlp {
    async fn predict_filename(&self, url: &str, dir: &Path) -> AppResult<PathBuf> {
        let output = self
            .command()
            .arg("--no-playlist")
            .arg("--paths")
            .arg(dir)
            .args(["--print", "filename"])
            .args(["-o", OUTPUT_TEMPLATE])
            .arg(url)
            .output()
            .await
            .map_err(|e| AppError::external_command_error(self.program_name(), e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            log::error!("yt-dlp filename lookup failed: {}", stderr);
            return Err(AppError::fetch("Failed to get filename", stderr));
        }

        let filename = last_line(&output.stdout)
            .ok_or_else(|| AppError::fetch("Failed to get filename", "yt-dlp printed nothing"))?;
        info!("Predicted filename for {}: {}", url, filename);
        Ok(PathBuf::from(filename))
    }

    async fn download(&self, url: &str, dir: &Path, target: &Path) -> AppResult<PathBuf> {
        let mut cmd = self.command();
        cmd.arg("--no-playlist")
            .arg("--paths")
            .arg(dir)
            .arg("-o")
            .arg(target)
            .arg("--no-simulate")
            .args(["--print", "after_move:filepath"])
            .arg(url);

        info!("Starting download: {} -> {}", url, target.display());

        let output = cmd
            .output()
            .await
            .map_err(|e| AppError::external_command_error(self.program_name(), e.to_string()))?;

        info!("yt-dlp exit code: {:?}", output.status.code());

        if output.status.success() {
            let file_path = last_line(&output.stdout)
                .map(PathBuf::from)
                .unwrap_or_else(|| target.to_path_buf());
            info!("Download successful: {}", file_path.display());
            Ok(file_path)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            log::error!("yt-dlp failed: {}", stderr);
            Err(AppError::fetch("Download error", stderr))
        }
    }
}
