//! Decoding of the lines yt-dlp writes while downloading

use crate::downloader::options::{
    DOWNLOAD_MARKER, FIELD_SEPARATOR, FILEPATH_MARKER, POSTPROCESS_MARKER,
};
use crate::downloader::progress::{parse_download_line, ProgressEvent, ProgressStatus};
use std::path::PathBuf;

/// Postprocessor that moves finished files to their final location
const MOVE_FILES_PP: &str = "MoveFiles";

/// One classified output line
#[derive(Debug, Clone, PartialEq)]
pub enum OutputLine {
    /// Progress event for the hook
    Progress(ProgressEvent),
    /// Final path of a downloaded entry
    FilePath(PathBuf),
    /// `ERROR:` message
    Error(String),
    /// `WARNING:` message
    Warning(String),
    /// Anything else
    Other(String),
}

impl OutputLine {
    /// Classify a single line of yt-dlp output
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim_end_matches(['\r', '\n']);

        if let Some(rest) = trimmed.strip_prefix(DOWNLOAD_MARKER) {
            return match serde_json::from_str::<ProgressEvent>(rest.trim()) {
                Ok(event) => OutputLine::Progress(event),
                Err(_) => OutputLine::Other(trimmed.to_string()),
            };
        }

        if let Some(rest) = trimmed.strip_prefix(POSTPROCESS_MARKER) {
            return OutputLine::Progress(parse_postprocess(rest.trim_start()));
        }

        if let Some(rest) = trimmed.strip_prefix(FILEPATH_MARKER) {
            let path = rest.trim();
            if !path.is_empty() && path != "NA" {
                return OutputLine::FilePath(PathBuf::from(path));
            }
            return OutputLine::Other(trimmed.to_string());
        }

        if trimmed.starts_with("ERROR:") {
            return OutputLine::Error(trimmed.to_string());
        }
        if let Some(rest) = trimmed.strip_prefix("WARNING:") {
            return OutputLine::Warning(rest.trim().to_string());
        }

        if let Some(event) = parse_download_line(trimmed) {
            return OutputLine::Progress(event);
        }

        OutputLine::Other(trimmed.to_string())
    }
}

/// `status<US>postprocessor<US>filepath`
fn parse_postprocess(fields: &str) -> ProgressEvent {
    let mut parts = fields.splitn(3, FIELD_SEPARATOR);
    let status = parts.next().unwrap_or_default().trim();
    let postprocessor = parts.next().map(|s| s.trim().to_string());
    let filepath = parts
        .next()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && *s != "NA")
        .map(str::to_string);

    let done_moving = status == "finished" && postprocessor.as_deref() == Some(MOVE_FILES_PP);
    ProgressEvent {
        status: if done_moving {
            ProgressStatus::PostProcess
        } else {
            ProgressStatus::Other
        },
        filename: filepath,
        postprocessor,
        ..Default::default()
    }
}
