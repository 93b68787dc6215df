use crate::utils::config::{LogLevel, Settings, DEFAULT_LANGS};
use clap::Parser;
use path_absolutize::Absolutize;
use std::path::PathBuf;
use tracing::warn;

/// YouTube downloader (yt-dlp wrapper)
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// One or more video/playlist URLs
    #[arg(required = true, num_args = 1..)]
    pub urls: Vec<String>,

    /// Output directory (defaults to current directory)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Path to cookies file (optional)
    #[arg(short, long)]
    pub cookies: Option<PathBuf>,

    /// Subtitle languages, comma-separated, e.g.: zh-Hans,zh,en
    /// [default: zh-Hans,zh,zh-CN,en]
    #[arg(short, long)]
    pub langs: Option<String>,

    /// Directory containing FFmpeg executables (optional)
    #[arg(long)]
    pub ffmpeg: Option<PathBuf>,

    /// Quiet mode; reduce output
    #[arg(short, long)]
    pub quiet: bool,

    /// Log level [default: INFO]
    #[arg(long, value_enum, ignore_case = true)]
    pub log_level: Option<LogLevel>,

    /// Enable automatic captions when no manual subtitles are available
    #[arg(long)]
    pub auto_sub: bool,

    /// Download single video only; ignore playlists
    #[arg(long)]
    pub no_playlist: bool,

    /// Select playlist items, e.g.: 1-5,7,10-
    #[arg(long)]
    pub playlist_items: Option<String>,

    /// Write info.json for each entry
    #[arg(long)]
    pub write_infojson: bool,

    /// Clean redundant fields in info.json (with --write-infojson)
    #[arg(long)]
    pub clean_infojson: bool,

    /// Path to the yt-dlp executable (skips discovery)
    #[arg(long = "yt-dlp", env = "YTFETCH_YTDLP")]
    pub ytdlp: Option<PathBuf>,

    /// Settings file [default: <config dir>/ytfetch/config.json]
    #[arg(long, env = "YTFETCH_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Fully resolved run configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub urls: Vec<String>,
    pub output_dir: Option<PathBuf>,
    /// Only set when it pointed at an existing file during resolution
    pub cookies: Option<PathBuf>,
    pub langs: Vec<String>,
    pub ffmpeg: Option<PathBuf>,
    pub quiet: bool,
    pub log_level: LogLevel,
    pub auto_sub: bool,
    pub no_playlist: bool,
    pub playlist_items: Option<String>,
    pub write_infojson: bool,
    pub clean_infojson: bool,
    pub ytdlp: Option<PathBuf>,
}

impl Args {
    /// Log level the subscriber should start with, before settings are read
    pub fn requested_log_level(&self, settings: &Settings) -> LogLevel {
        self.log_level.or(settings.log_level).unwrap_or_default()
    }

    /// Merge flags over settings and normalise the result
    pub fn into_config(self, settings: Settings) -> RunConfig {
        let log_level = self.requested_log_level(&settings);

        let langs = match (&self.langs, &settings.langs) {
            (Some(raw), _) => parse_langs(raw),
            (None, Some(list)) => list
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            (None, None) => parse_langs(DEFAULT_LANGS),
        };

        let output_dir = non_empty(self.output_dir.or(settings.output_dir)).map(|dir| {
            dir.absolutize()
                .map(|abs| abs.into_owned())
                .unwrap_or(dir)
        });

        let cookies = non_empty(self.cookies.or(settings.cookies)).and_then(|path| {
            if path.is_file() {
                Some(path)
            } else {
                warn!(
                    "The specified cookies file does not exist and will be ignored: {}",
                    path.display()
                );
                None
            }
        });

        RunConfig {
            urls: self.urls,
            output_dir,
            cookies,
            langs,
            ffmpeg: non_empty(self.ffmpeg.or(settings.ffmpeg)),
            quiet: self.quiet,
            log_level,
            auto_sub: self.auto_sub,
            no_playlist: self.no_playlist,
            playlist_items: self.playlist_items,
            write_infojson: self.write_infojson,
            clean_infojson: self.clean_infojson,
            ytdlp: non_empty(self.ytdlp.or(settings.ytdlp_path)),
        }
    }
}

/// An empty path (e.g. `"ffmpeg": ""` in settings) counts as unset
fn non_empty(path: Option<PathBuf>) -> Option<PathBuf> {
    path.filter(|p| !p.as_os_str().is_empty())
}

/// Split a comma-separated language list, trimming and dropping empty entries
pub fn parse_langs(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
