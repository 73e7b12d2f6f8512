use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Centralized error type for the downloader
#[derive(Debug)]
pub enum AppError {
    /// Bad user input (empty keyword, bad count)
    Validation(String),
    /// The search capability failed or returned garbage
    Search(String),
    /// The downloader exited with a non-zero status
    Fetch { step: String, stderr: String },
    /// An external command could not be started at all
    ExternalCommandError { command: String, stderr: String },
    /// Requested file does not exist
    FileNotFound(String),
    /// Request that can never succeed (empty name, traversal)
    InvalidRequest(String),
    /// Filesystem errors
    FileSystemError(std::io::Error),
    /// Parsing errors
    ParseError(String),
    /// Bad configuration value
    Config(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "Invalid input: {}", msg),
            AppError::Search(msg) => write!(f, "Search failed: {}", msg),
            AppError::Fetch { step, stderr } => write!(f, "{}: {}", step, stderr),
            AppError::ExternalCommandError { command, stderr } => {
                write!(f, "Failed to run {}: {}", command, stderr)
            }
            AppError::FileNotFound(path) => write!(f, "파일이 존재하지 않습니다: {}", path),
            AppError::InvalidRequest(msg) => write!(f, "Invalid filename: {}", msg),
            AppError::FileSystemError(e) => write!(f, "Filesystem error: {}", e),
            AppError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::FileSystemError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::FileSystemError(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::ParseError(format!("JSON parsing error: {}", err))
    }
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn search(msg: impl Into<String>) -> Self {
        Self::Search(msg.into())
    }

    pub fn fetch(step: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::Fetch {
            step: step.into(),
            stderr: stderr.into(),
        }
    }

    pub fn external_command_error(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::ExternalCommandError {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound(path.into())
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::FileNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        }
        (status, self.to_string()).into_response()
    }
}

/// Result of downloader operations
pub type AppResult<T> = Result<T, AppError>;
