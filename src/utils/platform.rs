//! Platform-specific utilities for ytfetch
//!
//! Settings location and executable naming differ per OS; everything that
//! cares goes through here.

use std::path::PathBuf;

/// Returns the configuration directory
/// - macOS: ~/Library/Application Support/ytfetch
/// - Windows: %APPDATA%\ytfetch
/// - Linux: ~/.config/ytfetch
pub fn config_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ytfetch")
    }

    #[cfg(target_os = "windows")]
    {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ytfetch")
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ytfetch")
    }
}

/// Default location of the JSON settings file
pub fn default_settings_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Platform-specific executable extension
pub fn exe_extension() -> &'static str {
    #[cfg(target_os = "windows")]
    {
        ".exe"
    }
    #[cfg(not(target_os = "windows"))]
    {
        ""
    }
}

/// File name of the yt-dlp executable on this platform
pub fn ytdlp_binary_name() -> String {
    format!("yt-dlp{}", exe_extension())
}
