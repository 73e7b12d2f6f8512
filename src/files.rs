use std::path::{Component, Path, PathBuf};

use tokio::fs;

use crate::errors::{AppError, AppResult};

/// Hands out files that live directly inside the download directory
#[derive(Debug, Clone)]
pub struct FileServer {
    root: PathBuf,
}

impl FileServer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map a requested file name to a path inside the root.
    ///
    /// Empty names, anything with more than one path component, and names whose
    /// canonical path leaves the root (symlinks) are invalid requests.
    pub async fn resolve(&self, filename: &str) -> AppResult<PathBuf> {
        if filename.is_empty() {
            return Err(AppError::invalid_request("filename is empty"));
        }

        let mut components = Path::new(filename).components();
        let single_name = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !single_name {
            return Err(AppError::invalid_request(filename));
        }

        let path = self.root.join(filename);
        let is_file = fs::metadata(&path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if !is_file {
            return Err(AppError::file_not_found(filename));
        }

        let canonical = fs::canonicalize(&path).await?;
        let canonical_root = fs::canonicalize(&self.root).await?;
        if !canonical.starts_with(&canonical_root) {
            log::warn!("Refusing {}: resolves outside {}", filename, canonical_root.display());
            return Err(AppError::invalid_request(filename));
        }

        Ok(canonical)
    }
}

/// `Content-Disposition` value forcing a download under the original name
pub fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}
