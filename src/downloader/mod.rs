//! Download pipeline: options map, progress reporting and the download loop

pub mod engine;
pub mod options;
pub mod progress;

// Re-export for convenience
pub use engine::{download_videos, DownloadReport, FailedDownload};
pub use options::{build_ytdl_opts, DownloadOptions, OptionsInput, Postprocessor};
pub use progress::{ConsoleProgress, ProgressEvent, ProgressHook, ProgressStatus};
