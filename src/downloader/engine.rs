//! Sequential download loop
//!
//! URLs are handed to the backend one after another. A failing URL is logged
//! and remembered; it never stops the loop.

use crate::downloader::options::DownloadOptions;
use crate::downloader::progress::ProgressHook;
use crate::extractor::traits::MediaBackend;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// A URL that could not be downloaded
#[derive(Debug, Clone, PartialEq)]
pub struct FailedDownload {
    pub url: String,
    pub reason: String,
}

/// Outcome of a whole run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DownloadReport {
    /// Final paths of everything written, in completion order
    pub downloaded: Vec<PathBuf>,
    /// Failed URLs, in input order
    pub failed: Vec<FailedDownload>,
}

impl DownloadReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_urls(&self) -> Vec<&str> {
        self.failed.iter().map(|f| f.url.as_str()).collect()
    }
}

/// Download a list of video or playlist URLs
pub async fn download_videos(
    backend: &dyn MediaBackend,
    urls: &[String],
    options: &DownloadOptions,
    hook: &mut dyn ProgressHook,
) -> DownloadReport {
    debug!("ydl_opts: {}", options.summary());
    debug!("Downloading {} URL(s) via {}", urls.len(), backend.id());

    let mut report = DownloadReport::default();

    for url in urls {
        let result = backend.fetch(url, options, hook).await;
        hook.finish();

        match result {
            Ok(paths) => {
                if paths.is_empty() {
                    info!("Downloaded: {}", url);
                }
                for path in paths {
                    info!("Downloaded: {}", path.display());
                    report.downloaded.push(path);
                }
            }
            Err(e) => {
                error!("Download failed: {:#} | URL: {}", e, url);
                report.failed.push(FailedDownload {
                    url: url.clone(),
                    reason: format!("{:#}", e),
                });
            }
        }
    }

    if !report.failed.is_empty() {
        warn!(
            "The following {} URLs failed to download:\n{}",
            report.failed.len(),
            report.failed_urls().join("\n")
        );
    }

    report
}
