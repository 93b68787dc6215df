//! yt-dlp process backend
//!
//! Locates the yt-dlp executable and runs one child process per URL. The
//! child's stdout and stderr are read line by line; progress lines go to the
//! hook, final file paths are collected and `ERROR:` lines become the failure
//! reason.

use crate::downloader::options::DownloadOptions;
use crate::downloader::progress::ProgressHook;
use crate::extractor::models::OutputLine;
use crate::extractor::traits::MediaBackend;
use crate::utils::error::YtfetchError;
use crate::utils::platform;
use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command as AsyncCommand;
use tracing::{debug, info, warn};

/// Media backend driving the yt-dlp executable
#[derive(Debug, Clone)]
pub struct YtDlp {
    ytdlp_path: PathBuf,
}

impl YtDlp {
    /// Locate yt-dlp, honouring an explicit path first
    pub fn new(explicit: Option<&Path>) -> Result<Self, YtfetchError> {
        let ytdlp_path = match explicit {
            Some(path) => resolve_explicit(path)?,
            None => find_ytdlp().ok_or(YtfetchError::YtDlpNotFound)?,
        };
        info!("Using yt-dlp at: {}", ytdlp_path.display());
        Ok(Self { ytdlp_path })
    }

    /// Version string reported by `yt-dlp --version`
    pub async fn version(&self) -> Result<String, YtfetchError> {
        let output = AsyncCommand::new(&self.ytdlp_path)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn command(&self, url: &str, options: &DownloadOptions) -> AsyncCommand {
        let mut cmd = AsyncCommand::new(&self.ytdlp_path);
        cmd.args(options.to_args())
            .arg("--")
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

/// Line-handling state for one child process
#[derive(Default)]
struct RunState {
    files: Vec<PathBuf>,
    last_error: Option<String>,
}

impl RunState {
    fn handle_line(&mut self, raw: &[u8], hook: &mut dyn ProgressHook) {
        let line = String::from_utf8_lossy(raw);
        match OutputLine::parse(&line) {
            OutputLine::Progress(event) => hook.on_progress(&event),
            OutputLine::FilePath(path) => self.files.push(path),
            OutputLine::Error(message) => {
                debug!("yt-dlp: {}", message);
                self.last_error = Some(message);
            }
            OutputLine::Warning(message) => {
                hook.finish();
                warn!("{}", message);
            }
            OutputLine::Other(text) => {
                if !text.trim().is_empty() {
                    debug!("yt-dlp: {}", text);
                }
            }
        }
    }
}

#[async_trait]
impl MediaBackend for YtDlp {
    fn id(&self) -> &'static str {
        "yt-dlp"
    }

    async fn fetch(
        &self,
        url: &str,
        options: &DownloadOptions,
        hook: &mut dyn ProgressHook,
    ) -> Result<Vec<PathBuf>> {
        debug!("Spawning yt-dlp for {}", url);
        let mut child = self.command(url, options).spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow::anyhow!("yt-dlp stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow::anyhow!("yt-dlp stderr was not captured"))?;

        let mut out_lines = BufReader::new(stdout).split(b'\n');
        let mut err_lines = BufReader::new(stderr).split(b'\n');
        let mut out_open = true;
        let mut err_open = true;
        let mut state = RunState::default();

        while out_open || err_open {
            tokio::select! {
                segment = out_lines.next_segment(), if out_open => match segment {
                    Ok(Some(line)) => state.handle_line(&line, hook),
                    Ok(None) => out_open = false,
                    Err(e) => {
                        warn!("Failed to read yt-dlp stdout: {}", e);
                        out_open = false;
                    }
                },
                segment = err_lines.next_segment(), if err_open => match segment {
                    Ok(Some(line)) => state.handle_line(&line, hook),
                    Ok(None) => err_open = false,
                    Err(e) => {
                        warn!("Failed to read yt-dlp stderr: {}", e);
                        err_open = false;
                    }
                },
            }
        }

        let status = child.wait().await?;
        debug!("yt-dlp exited with {:?} for {}", status.code(), url);

        if status.success() {
            Ok(state.files)
        } else {
            let reason = state
                .last_error
                .unwrap_or_else(|| format!("yt-dlp exited with {}", status));
            Err(YtfetchError::DownloadFailed {
                url: url.to_string(),
                reason,
            }
            .into())
        }
    }
}

// ============================================================
// yt-dlp Detection Functions
// ============================================================

/// Validate a user-supplied yt-dlp path
fn resolve_explicit(path: &Path) -> Result<PathBuf, YtfetchError> {
    if !path.is_file() {
        // A bare name such as "yt-dlp2" is looked up on PATH
        if path.components().count() == 1 {
            if let Ok(found) = which::which(path) {
                return Ok(found);
            }
        }
        return Err(YtfetchError::InvalidArgument(format!(
            "yt-dlp not found at {}",
            path.display()
        )));
    }
    if !is_executable(path) {
        return Err(YtfetchError::YtDlpNotExecutable(path.display().to_string()));
    }
    Ok(path.to_path_buf())
}

/// Find yt-dlp binary with priority:
/// 1. Next to the running executable
/// 2. System PATH
/// 3. Common installation paths
pub fn find_ytdlp() -> Option<PathBuf> {
    if let Some(bundled) = find_adjacent() {
        debug!("Using bundled yt-dlp: {}", bundled.display());
        return Some(bundled);
    }

    if let Some(system) = find_in_path() {
        debug!("Using system yt-dlp: {}", system.display());
        return Some(system);
    }

    if let Some(common) = find_in_common_paths() {
        debug!("Using yt-dlp from common path: {}", common.display());
        return Some(common);
    }

    warn!("yt-dlp not found anywhere!");
    None
}

/// yt-dlp shipped in the same directory as this binary
fn find_adjacent() -> Option<PathBuf> {
    let exe_path = std::env::current_exe().ok()?;
    let exe_dir = exe_path.parent()?;
    let candidate = exe_dir.join(platform::ytdlp_binary_name());
    (candidate.is_file() && is_executable(&candidate)).then_some(candidate)
}

/// Find yt-dlp in system PATH using `which`
fn find_in_path() -> Option<PathBuf> {
    which::which("yt-dlp").ok().filter(|p| p.exists())
}

/// Find yt-dlp in common installation paths
fn find_in_common_paths() -> Option<PathBuf> {
    let common_paths = [
        // macOS Homebrew (Apple Silicon)
        "/opt/homebrew/bin/yt-dlp",
        // Homebrew (Intel) / manual installs
        "/usr/local/bin/yt-dlp",
        // System
        "/usr/bin/yt-dlp",
        // pipx / pip --user
        "~/.local/bin/yt-dlp",
    ];

    common_paths
        .iter()
        .map(|path_str| expand_home(path_str))
        .find(|path| path.is_file() && is_executable(path))
}

/// Expand a leading `~/` to the home directory
fn expand_home(path_str: &str) -> PathBuf {
    match path_str.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path_str)),
        None => PathBuf::from(path_str),
    }
}

/// Check if a file is executable
fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        std::fs::metadata(path)
            .map(|metadata| metadata.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    {
        // On Windows, just check if file exists
        path.exists()
    }
}

// ============================================================
// Tests
// ============================================================
