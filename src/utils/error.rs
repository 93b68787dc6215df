//! Error handling for ytfetch

use thiserror::Error;

/// Main error type for ytfetch
#[derive(Debug, Error)]
pub enum YtfetchError {
    #[error("yt-dlp not found. Please install yt-dlp")]
    YtDlpNotFound,

    #[error("yt-dlp at {0} is not executable")]
    YtDlpNotExecutable(String),

    #[error("{reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Settings error: {0}")]
    SettingsError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
