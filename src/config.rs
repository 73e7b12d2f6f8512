use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::errors::{AppError, AppResult};
use crate::utils::FilenamePolicy;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_YTDLP_PATH: &str = "yt-dlp";
pub const DEFAULT_MAX_COUNT: u32 = 50;

/// The two settings the interactive CLI needs. Web-only keys are never read.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub download_dir: PathBuf,
    pub ytdlp_path: PathBuf,
}

impl CliConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            download_dir: get("DOWNLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(default_download_dir),
            ytdlp_path: get("YTDLP_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_YTDLP_PATH)),
        }
    }
}

/// Web server settings
#[derive(Debug, Clone)]
pub struct Config {
    /// Every downloaded and served file lives here
    pub download_dir: PathBuf,
    pub bind_addr: SocketAddr,
    pub ytdlp_path: PathBuf,
    pub filename_policy: FilenamePolicy,
    /// Upper bound for the `count` query parameter
    pub max_count: u32,
}

impl Config {
    /// Read the process environment. Binaries load `.env` with dotenvy first.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let CliConfig {
            download_dir,
            ytdlp_path,
        } = CliConfig::from_lookup(&get);

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| AppError::config(format!("BIND_ADDR: {}", e)))?;

        let filename_policy = match get("FILENAME_POLICY") {
            Some(value) => FilenamePolicy::from_str(value.trim())
                .map_err(|_| AppError::config(format!("FILENAME_POLICY: unknown value {}", value)))?,
            None => FilenamePolicy::default(),
        };

        let max_count = match get("MAX_COUNT") {
            Some(value) => match value.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(AppError::config(format!(
                        "MAX_COUNT: expected a positive integer, got {}",
                        value
                    )));
                }
            },
            None => DEFAULT_MAX_COUNT,
        };

        Ok(Self {
            download_dir,
            bind_addr,
            ytdlp_path,
            filename_policy,
            max_count,
        })
    }
}

fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("downloads"))
}
