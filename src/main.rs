//! ytfetch - yt-dlp convenience wrapper
//!
//! Downloads videos, subtitles and thumbnails with sensible defaults and
//! post-processing (remux to mp4, embedded subtitles/thumbnail/metadata).
//! FFmpeg must be on PATH or passed with `--ffmpeg` for the post-processing
//! steps to run.

use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;
use tracing::{debug, info};
use ytfetch::downloader::{download_videos, ConsoleProgress, DownloadOptions, ProgressHook};
use ytfetch::extractor::YtDlp;
use ytfetch::utils::Settings;
use ytfetch::Args;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let settings = Settings::load(args.config.as_deref());
    let level = match &settings {
        Ok(settings) => args.requested_log_level(settings),
        Err(_) => args.log_level.unwrap_or_default(),
    };

    // Initialize logging; stdout is reserved for the progress line
    tracing_subscriber::fmt()
        .with_max_level(level.as_tracing())
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .init();

    let config = args.into_config(settings?);
    debug!("Run configuration: {:?}", config);

    let backend = YtDlp::new(config.ytdlp.as_deref())?;
    match backend.version().await {
        Ok(version) => debug!("yt-dlp version: {}", version),
        Err(e) => debug!("Could not query yt-dlp version: {}", e),
    }

    let options = DownloadOptions::from_config(&config);
    let mut hook = ConsoleProgress::stdout();

    let report = tokio::select! {
        report = download_videos(&backend, &config.urls, &options, &mut hook) => Some(report),
        _ = tokio::signal::ctrl_c() => None,
    };
    hook.finish();

    match report {
        Some(report) => debug!(
            "Finished: {} file(s) written, {} URL(s) failed",
            report.downloaded.len(),
            report.failed.len()
        ),
        None => info!("Interrupted by user. Exiting."),
    }

    Ok(())
}
