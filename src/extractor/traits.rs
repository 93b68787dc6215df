use crate::downloader::options::DownloadOptions;
use crate::downloader::progress::ProgressHook;
use anyhow::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// Core trait for whatever actually fetches media
///
/// The download loop only talks to this trait, so it is oblivious to how the
/// downloader is driven (child process, test double, ...).
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Returns a unique identifier for this backend (e.g. "yt-dlp")
    fn id(&self) -> &'static str;

    /// Download everything behind `url` (a video or a whole playlist).
    ///
    /// Progress events are forwarded to `hook` as they happen. Returns the
    /// final paths of the files written, in the order they completed.
    async fn fetch(
        &self,
        url: &str,
        options: &DownloadOptions,
        hook: &mut dyn ProgressHook,
    ) -> Result<Vec<PathBuf>>;
}
