//! yt-dlp options map
//!
//! `DownloadOptions` mirrors the option dictionary of the yt-dlp Python API
//! (field names serialize to the same keys) and renders itself into the
//! equivalent command-line flags for the executable.

use crate::cli::RunConfig;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Marker prefix of machine-readable download progress lines
pub const DOWNLOAD_MARKER: &str = "[ytfetch:download]";
/// Marker prefix of machine-readable postprocessor progress lines
pub const POSTPROCESS_MARKER: &str = "[ytfetch:postprocess]";
/// Marker prefix of final file path lines
pub const FILEPATH_MARKER: &str = "[ytfetch:filepath]";

/// Separator between postprocessor template fields
pub const FIELD_SEPARATOR: char = '\u{1f}';

const SUMMARY_KEYS: [&str; 10] = [
    "format",
    "merge_output_format",
    "writesubtitles",
    "embedsubtitles",
    "subtitleslangs",
    "writethumbnail",
    "embedthumbnail",
    "retries",
    "continuedl",
    "concurrent_fragment_downloads",
];

/// Output path roots (`paths` option)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputPaths {
    pub home: PathBuf,
}

/// Post-processing steps run by yt-dlp after each download
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "key")]
pub enum Postprocessor {
    FFmpegVideoRemuxer {
        #[serde(rename = "preferedformat")]
        preferred_format: String,
    },
    FFmpegThumbnailsConvertor {
        format: String,
    },
    EmbedThumbnail {
        already_have_thumbnail: bool,
    },
    FFmpegMetadata,
}

impl Postprocessor {
    /// Command-line flags enabling this step
    fn to_args(&self) -> Vec<String> {
        match self {
            Postprocessor::FFmpegVideoRemuxer { preferred_format } => {
                vec!["--remux-video".to_string(), preferred_format.clone()]
            }
            Postprocessor::FFmpegThumbnailsConvertor { format } => {
                vec!["--convert-thumbnails".to_string(), format.clone()]
            }
            // `--write-thumbnail` already keeps the file around for embedding
            Postprocessor::EmbedThumbnail { .. } => vec!["--embed-thumbnail".to_string()],
            Postprocessor::FFmpegMetadata => vec!["--embed-metadata".to_string()],
        }
    }
}

/// Options forwarded to yt-dlp
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadOptions {
    pub outtmpl: String,
    pub windowsfilenames: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<OutputPaths>,
    pub format: String,
    pub merge_output_format: String,
    pub writesubtitles: bool,
    pub embedsubtitles: bool,
    pub subtitleslangs: Vec<String>,
    pub subtitlesformat: String,
    pub writethumbnail: bool,
    pub embedthumbnail: bool,
    pub retries: u32,
    pub fragment_retries: u32,
    pub continuedl: bool,
    pub concurrent_fragment_downloads: u32,
    pub quiet: bool,
    pub no_warnings: bool,
    pub ignoreerrors: bool,
    pub postprocessors: Vec<Postprocessor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookiefile: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ffmpeg_location: Option<PathBuf>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub writeautomaticsub: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub noplaylist: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist_items: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub writeinfojson: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub clean_infojson: bool,
}

/// Inputs of [`build_ytdl_opts`]
#[derive(Debug, Clone, Default)]
pub struct OptionsInput<'a> {
    pub output_dir: Option<&'a PathBuf>,
    pub cookies_file: Option<&'a PathBuf>,
    pub langs: &'a [String],
    pub ffmpeg_location: Option<&'a PathBuf>,
    pub quiet: bool,
    pub auto_sub: bool,
    pub no_playlist: bool,
    pub playlist_items: Option<&'a str>,
    pub write_infojson: bool,
    pub clean_infojson: bool,
}

/// Build the options map with the fixed defaults plus the optional keys
pub fn build_ytdl_opts(input: OptionsInput<'_>) -> DownloadOptions {
    DownloadOptions {
        outtmpl: "%(uploader)s - %(title)s.%(ext)s".to_string(),
        windowsfilenames: true,
        paths: input.output_dir.map(|home| OutputPaths { home: home.clone() }),
        format: "bv*+ba/b".to_string(),
        merge_output_format: "mp4".to_string(),
        writesubtitles: true,
        embedsubtitles: true,
        subtitleslangs: input.langs.to_vec(),
        subtitlesformat: "srt/best".to_string(),
        writethumbnail: true,
        embedthumbnail: true,
        retries: 10,
        fragment_retries: 10,
        continuedl: true,
        concurrent_fragment_downloads: 5,
        quiet: input.quiet,
        no_warnings: false,
        ignoreerrors: false,
        postprocessors: vec![
            Postprocessor::FFmpegVideoRemuxer {
                preferred_format: "mp4".to_string(),
            },
            Postprocessor::FFmpegThumbnailsConvertor {
                format: "jpg".to_string(),
            },
            Postprocessor::EmbedThumbnail {
                already_have_thumbnail: true,
            },
            Postprocessor::FFmpegMetadata,
        ],
        cookiefile: input.cookies_file.cloned(),
        ffmpeg_location: input.ffmpeg_location.cloned(),
        writeautomaticsub: input.auto_sub,
        noplaylist: input.no_playlist,
        playlist_items: input
            .playlist_items
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        writeinfojson: input.write_infojson,
        clean_infojson: input.write_infojson && input.clean_infojson,
    }
}

impl DownloadOptions {
    /// Options for a resolved run configuration
    pub fn from_config(config: &RunConfig) -> Self {
        build_ytdl_opts(OptionsInput {
            output_dir: config.output_dir.as_ref(),
            cookies_file: config.cookies.as_ref(),
            langs: &config.langs,
            ffmpeg_location: config.ffmpeg.as_ref(),
            quiet: config.quiet,
            auto_sub: config.auto_sub,
            no_playlist: config.no_playlist,
            playlist_items: config.playlist_items.as_deref(),
            write_infojson: config.write_infojson,
            clean_infojson: config.clean_infojson,
        })
    }

    /// Full options map as JSON, keyed like the yt-dlp API
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// The subset of options worth a debug line
    pub fn summary(&self) -> Value {
        let full = self.to_json();
        let mut subset = Map::new();
        for key in SUMMARY_KEYS {
            if let Some(value) = full.get(key) {
                subset.insert(key.to_string(), value.clone());
            }
        }
        Value::Object(subset)
    }

    /// Render into yt-dlp flags, plumbing flags included. The URL is not part of it.
    pub fn to_args(&self) -> Vec<String> {
        let mut args: Vec<String> = Vec::new();

        push_opt(&mut args, "-o", &self.outtmpl);
        push_flag(&mut args, "--windows-filenames", self.windowsfilenames);
        if let Some(paths) = &self.paths {
            push_opt(&mut args, "-P", paths.home.to_string_lossy());
        }
        push_opt(&mut args, "-f", &self.format);
        push_opt(&mut args, "--merge-output-format", &self.merge_output_format);

        push_flag(&mut args, "--write-subs", self.writesubtitles);
        push_flag(&mut args, "--write-auto-subs", self.writeautomaticsub);
        push_flag(&mut args, "--embed-subs", self.embedsubtitles);
        if !self.subtitleslangs.is_empty() {
            push_opt(&mut args, "--sub-langs", self.subtitleslangs.join(","));
        }
        push_opt(&mut args, "--sub-format", &self.subtitlesformat);

        push_flag(&mut args, "--write-thumbnail", self.writethumbnail);
        push_flag(&mut args, "--embed-thumbnail", self.embedthumbnail);

        push_opt(&mut args, "--retries", self.retries.to_string());
        push_opt(&mut args, "--fragment-retries", self.fragment_retries.to_string());
        push_flag(&mut args, "--continue", self.continuedl);
        push_flag(&mut args, "--no-continue", !self.continuedl);
        push_opt(
            &mut args,
            "--concurrent-fragments",
            self.concurrent_fragment_downloads.to_string(),
        );

        push_flag(&mut args, "--quiet", self.quiet);
        push_flag(&mut args, "--no-warnings", self.no_warnings);
        push_flag(&mut args, "--ignore-errors", self.ignoreerrors);
        push_flag(&mut args, "--abort-on-error", !self.ignoreerrors);

        if let Some(cookies) = &self.cookiefile {
            push_opt(&mut args, "--cookies", cookies.to_string_lossy());
        }
        if let Some(ffmpeg) = &self.ffmpeg_location {
            push_opt(&mut args, "--ffmpeg-location", ffmpeg.to_string_lossy());
        }

        push_flag(&mut args, "--no-playlist", self.noplaylist);
        push_flag(&mut args, "--yes-playlist", !self.noplaylist);
        if let Some(items) = &self.playlist_items {
            push_opt(&mut args, "--playlist-items", items);
        }

        push_flag(&mut args, "--write-info-json", self.writeinfojson);
        push_flag(
            &mut args,
            "--clean-info-json",
            self.writeinfojson && self.clean_infojson,
        );

        for pp in &self.postprocessors {
            let pp_args = pp.to_args();
            // EmbedThumbnail and `embedthumbnail` share one flag
            if pp_args.first().is_some_and(|flag| args.contains(flag)) {
                continue;
            }
            args.extend(pp_args);
        }

        args.extend(plumbing_args());
        args
    }
}

fn push_flag(args: &mut Vec<String>, flag: &str, enabled: bool) {
    if enabled {
        args.push(flag.to_string());
    }
}

fn push_opt(args: &mut Vec<String>, flag: &str, value: impl Into<String>) {
    args.push(flag.to_string());
    args.push(value.into());
}

/// Flags that make yt-dlp report progress and results in a parseable way
pub fn plumbing_args() -> Vec<String> {
    let sep = FIELD_SEPARATOR;
    vec![
        "--newline".to_string(),
        "--progress".to_string(),
        "--progress-template".to_string(),
        format!("download:{} %(progress)j", DOWNLOAD_MARKER),
        "--progress-template".to_string(),
        format!(
            "postprocess:{} %(progress.status)s{sep}%(progress.postprocessor)s{sep}%(info.filepath)s",
            POSTPROCESS_MARKER
        ),
        "--print".to_string(),
        format!("after_move:{} %(filepath)s", FILEPATH_MARKER),
        "--no-simulate".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn langs() -> Vec<String> {
        vec!["en".to_string(), "ja".to_string()]
    }

    fn base<'a>(langs: &'a [String]) -> OptionsInput<'a> {
        OptionsInput {
            langs,
            ..Default::default()
        }
    }

    fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .map(String::as_str)
    }

    #[test]
    fn test_fixed_defaults() {
        let langs = langs();
        let opts = build_ytdl_opts(base(&langs));

        assert_eq!(opts.outtmpl, "%(uploader)s - %(title)s.%(ext)s");
        assert_eq!(opts.format, "bv*+ba/b");
        assert_eq!(opts.merge_output_format, "mp4");
        assert_eq!(opts.subtitlesformat, "srt/best");
        assert_eq!(opts.retries, 10);
        assert_eq!(opts.fragment_retries, 10);
        assert_eq!(opts.concurrent_fragment_downloads, 5);
        assert!(opts.continuedl);
        assert!(!opts.ignoreerrors);
        assert_eq!(opts.postprocessors.len(), 4);
        assert_eq!(opts.subtitleslangs, langs);
    }

    #[test]
    fn test_optional_keys_absent_by_default() {
        let langs = langs();
        let json = build_ytdl_opts(base(&langs)).to_json();

        for key in [
            "paths",
            "cookiefile",
            "ffmpeg_location",
            "writeautomaticsub",
            "noplaylist",
            "playlist_items",
            "writeinfojson",
            "clean_infojson",
        ] {
            assert!(json.get(key).is_none(), "{} should be absent", key);
        }
    }

    #[test]
    fn test_optional_keys_present_when_set() {
        let langs = langs();
        let out = PathBuf::from("/tmp/videos");
        let cookies = PathBuf::from("/tmp/cookies.txt");
        let ffmpeg = PathBuf::from("/opt/ffmpeg/bin");
        let json = build_ytdl_opts(OptionsInput {
            output_dir: Some(&out),
            cookies_file: Some(&cookies),
            ffmpeg_location: Some(&ffmpeg),
            auto_sub: true,
            no_playlist: true,
            playlist_items: Some("1-5,7"),
            write_infojson: true,
            clean_infojson: true,
            ..base(&langs)
        })
        .to_json();

        assert_eq!(json["paths"]["home"], "/tmp/videos");
        assert_eq!(json["cookiefile"], "/tmp/cookies.txt");
        assert_eq!(json["ffmpeg_location"], "/opt/ffmpeg/bin");
        assert_eq!(json["writeautomaticsub"], true);
        assert_eq!(json["noplaylist"], true);
        assert_eq!(json["playlist_items"], "1-5,7");
        assert_eq!(json["writeinfojson"], true);
        assert_eq!(json["clean_infojson"], true);
    }

    #[test]
    fn test_clean_infojson_requires_write_infojson() {
        let langs = langs();
        let opts = build_ytdl_opts(OptionsInput {
            clean_infojson: true,
            ..base(&langs)
        });
        assert!(!opts.clean_infojson);
        assert!(!opts.to_args().contains(&"--clean-info-json".to_string()));
    }

    #[test]
    fn test_postprocessor_keys() {
        let langs = langs();
        let json = build_ytdl_opts(base(&langs)).to_json();
        let pps = json["postprocessors"].as_array().unwrap();

        assert_eq!(pps[0]["key"], "FFmpegVideoRemuxer");
        assert_eq!(pps[0]["preferedformat"], "mp4");
        assert_eq!(pps[1]["key"], "FFmpegThumbnailsConvertor");
        assert_eq!(pps[1]["format"], "jpg");
        assert_eq!(pps[2]["key"], "EmbedThumbnail");
        assert_eq!(pps[2]["already_have_thumbnail"], true);
        assert_eq!(pps[3]["key"], "FFmpegMetadata");
    }

    #[test]
    fn test_summary_subset() {
        let langs = langs();
        let summary = build_ytdl_opts(base(&langs)).summary();
        let obj = summary.as_object().unwrap();

        assert_eq!(obj.len(), SUMMARY_KEYS.len());
        assert_eq!(obj["format"], "bv*+ba/b");
        assert!(obj.get("outtmpl").is_none());
        assert!(obj.get("postprocessors").is_none());
    }

    #[test]
    fn test_args_rendering() {
        let langs = langs();
        let out = PathBuf::from("/data");
        let args = build_ytdl_opts(OptionsInput {
            output_dir: Some(&out),
            quiet: true,
            ..base(&langs)
        })
        .to_args();

        assert_eq!(flag_value(&args, "-o"), Some("%(uploader)s - %(title)s.%(ext)s"));
        assert_eq!(flag_value(&args, "-P"), Some("/data"));
        assert_eq!(flag_value(&args, "-f"), Some("bv*+ba/b"));
        assert_eq!(flag_value(&args, "--sub-langs"), Some("en,ja"));
        assert_eq!(flag_value(&args, "--remux-video"), Some("mp4"));
        assert_eq!(flag_value(&args, "--convert-thumbnails"), Some("jpg"));
        assert_eq!(flag_value(&args, "--concurrent-fragments"), Some("5"));
        for flag in [
            "--windows-filenames",
            "--write-subs",
            "--embed-subs",
            "--write-thumbnail",
            "--embed-metadata",
            "--continue",
            "--quiet",
            "--abort-on-error",
            "--yes-playlist",
            "--no-simulate",
            "--newline",
        ] {
            assert!(args.contains(&flag.to_string()), "missing {}", flag);
        }
        assert_eq!(
            args.iter().filter(|a| *a == "--embed-thumbnail").count(),
            1,
            "thumbnail embedding requested once"
        );
        assert!(!args.contains(&"--write-auto-subs".to_string()));
        assert!(!args.contains(&"--no-warnings".to_string()));
    }

    #[test]
    fn test_no_playlist_and_items() {
        let langs = langs();
        let args = build_ytdl_opts(OptionsInput {
            no_playlist: true,
            playlist_items: Some("1-5,7,10-"),
            ..base(&langs)
        })
        .to_args();

        assert!(args.contains(&"--no-playlist".to_string()));
        assert!(!args.contains(&"--yes-playlist".to_string()));
        assert_eq!(flag_value(&args, "--playlist-items"), Some("1-5,7,10-"));
    }

    #[test]
    fn test_plumbing_templates_carry_markers() {
        let args = plumbing_args();
        assert!(args.iter().any(|a| a.starts_with("download:") && a.contains(DOWNLOAD_MARKER)));
        assert!(args
            .iter()
            .any(|a| a.starts_with("postprocess:") && a.contains(POSTPROCESS_MARKER)));
        assert!(args.iter().any(|a| a.starts_with("after_move:") && a.contains(FILEPATH_MARKER)));
    }
}
