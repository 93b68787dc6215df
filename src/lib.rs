//! ytfetch library

pub mod cli;
pub mod downloader;
pub mod extractor;
pub mod utils;

// Re-export main types for easier use
pub use cli::{Args, RunConfig};
pub use downloader::{download_videos, DownloadOptions, DownloadReport, ProgressHook};
pub use extractor::{MediaBackend, YtDlp};
pub use utils::{LogLevel, Settings, YtfetchError};
