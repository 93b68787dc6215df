//! Application configuration
//!
//! Settings are read from an optional JSON file and act as defaults; command
//! line flags override them field by field.

use crate::utils::error::YtfetchError;
use crate::utils::platform;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Subtitle languages requested when neither the CLI nor the settings file name any
pub const DEFAULT_LANGS: &str = "zh-Hans,zh,zh-CN,en";

/// Persistent defaults, all optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Download location
    pub output_dir: Option<PathBuf>,

    /// Subtitle language codes
    pub langs: Option<Vec<String>>,

    /// Cookies file handed to yt-dlp
    pub cookies: Option<PathBuf>,

    /// Directory containing ffmpeg/ffprobe
    pub ffmpeg: Option<PathBuf>,

    /// Explicit yt-dlp executable
    pub ytdlp_path: Option<PathBuf>,

    pub log_level: Option<LogLevel>,
}

impl Settings {
    /// Load settings.
    ///
    /// With an explicit path the file must exist. Without one the platform
    /// default is tried and silently skipped when absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self, YtfetchError> {
        let path = match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(YtfetchError::SettingsError(format!(
                        "settings file not found: {}",
                        path.display()
                    )));
                }
                path.to_path_buf()
            }
            None => {
                let path = platform::default_settings_path();
                if !path.is_file() {
                    debug!("No settings file at {}", path.display());
                    return Ok(Self::default());
                }
                path
            }
        };

        Self::from_file(&path)
    }

    /// Parse a settings file
    pub fn from_file(path: &Path) -> Result<Self, YtfetchError> {
        debug!("Loading settings from {}", path.display());
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|e| {
            YtfetchError::SettingsError(format!("{}: {}", path.display(), e))
        })
    }
}

/// Log verbosity accepted by `--log-level` and the settings file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    #[value(name = "DEBUG")]
    Debug,
    #[default]
    #[value(name = "INFO")]
    Info,
    #[value(name = "WARNING", alias = "WARN")]
    #[serde(alias = "WARN")]
    Warning,
    #[value(name = "ERROR")]
    Error,
}

impl LogLevel {
    /// Matching tracing level
    pub fn as_tracing(&self) -> tracing::Level {
        match self {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warning => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings_are_empty() {
        let settings = Settings::default();
        assert!(settings.output_dir.is_none());
        assert!(settings.langs.is_none());
        assert!(settings.log_level.is_none());
    }

    #[test]
    fn test_partial_settings_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"langs": ["en", "de"], "log_level": "DEBUG"}}"#).unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.langs, Some(vec!["en".to_string(), "de".to_string()]));
        assert_eq!(settings.log_level, Some(LogLevel::Debug));
        assert!(settings.cookies.is_none());
    }

    #[test]
    fn test_warn_alias_in_settings() {
        let settings: Settings = serde_json::from_str(r#"{"log_level": "WARN"}"#).unwrap();
        assert_eq!(settings.log_level, Some(LogLevel::Warning));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"segments": 16}}"#).unwrap();

        let err = Settings::from_file(file.path()).unwrap_err();
        assert!(matches!(err, YtfetchError::SettingsError(_)));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        let err = Settings::load(Some(missing.as_path())).unwrap_err();
        assert!(err.to_string().contains("settings file not found"));
    }

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(LogLevel::Warning.as_tracing(), tracing::Level::WARN);
        assert_eq!(LogLevel::default().as_tracing(), tracing::Level::INFO);
    }
}
