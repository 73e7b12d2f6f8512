use std::sync::Arc;

use crate::{
    config::Config,
    fetcher::Fetcher,
    files::FileServer,
    video::{VideoSearch, YtDlp},
};

mod download;
mod download_file;
mod index;

pub use download::download;
pub use download_file::download_file;
pub use index::index;

/// Shared by every request; built once from the config
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<dyn VideoSearch>,
    pub fetcher: Arc<Fetcher>,
    pub files: Arc<FileServer>,
    pub max_count: u32,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        let ytdlp = Arc::new(YtDlp::new(&config.ytdlp_path));
        Self {
            search: ytdlp.clone(),
            fetcher: Arc::new(Fetcher::new(
                ytdlp,
                &config.download_dir,
                config.filename_policy,
            )),
            files: Arc::new(FileServer::new(&config.download_dir)),
            max_count: config.max_count,
        }
    }
}
