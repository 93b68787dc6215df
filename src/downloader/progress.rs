//! Progress reporting for downloads
//!
//! yt-dlp reports each state transition as a progress event. Events are fed
//! to a [`ProgressHook`]; the console hook turns them into a single
//! self-overwriting percentage line on stdout.

use serde::Deserialize;
use std::io::Write;
use tracing::{debug, info};

/// Download state carried by a progress event
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    #[default]
    Downloading,
    Finished,
    Error,
    PostProcess,
    #[serde(other)]
    Other,
}

/// One progress event, shaped like the dictionary yt-dlp hands its hooks
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ProgressEvent {
    #[serde(default)]
    pub status: ProgressStatus,
    #[serde(default)]
    pub downloaded_bytes: Option<u64>,
    #[serde(default)]
    pub total_bytes: Option<u64>,
    /// yt-dlp reports the estimate as a float
    #[serde(default)]
    pub total_bytes_estimate: Option<f64>,
    /// bytes per second
    #[serde(default)]
    pub speed: Option<f64>,
    /// seconds
    #[serde(default)]
    pub eta: Option<f64>,
    #[serde(default)]
    pub filename: Option<String>,
    /// Set for postprocessor events only
    #[serde(default)]
    pub postprocessor: Option<String>,
}

impl ProgressEvent {
    /// Total size: exact when known, else the estimate
    pub fn total(&self) -> Option<f64> {
        match self.total_bytes {
            Some(total) if total > 0 => Some(total as f64),
            _ => self.total_bytes_estimate.filter(|t| *t > 0.0),
        }
    }

    /// Get progress percentage (0.0 to 100.0), `None` while the size is unknown
    pub fn percentage(&self) -> Option<f64> {
        let total = self.total()?;
        let downloaded = self.downloaded_bytes.unwrap_or(0) as f64;
        Some(downloaded / total * 100.0)
    }
}

/// Render the progress line for a `downloading` event
///
/// Returns `None` for other statuses and while the total size is unknown.
pub fn progress_line(event: &ProgressEvent) -> Option<String> {
    if event.status != ProgressStatus::Downloading {
        return None;
    }
    let pct = event.percentage()?;
    let speed = event.speed.unwrap_or(0.0);
    let eta = event.eta.unwrap_or(0.0);
    Some(format!(
        "\rProgress {:5.1}%  Speed {:.0}B/s  ETA {:.0}s",
        pct, speed, eta
    ))
}

/// Callback invoked on every download state transition
pub trait ProgressHook: Send {
    fn on_progress(&mut self, event: &ProgressEvent);

    /// Called once a URL is done, successfully or not
    fn finish(&mut self) {}
}

impl<F> ProgressHook for F
where
    F: FnMut(&ProgressEvent) + Send,
{
    fn on_progress(&mut self, event: &ProgressEvent) {
        self(event)
    }
}

/// Hook that prints the percentage line and logs finished files
pub struct ConsoleProgress<W: Write + Send> {
    out: W,
    line_open: bool,
}

impl ConsoleProgress<std::io::Stdout> {
    /// Console hook writing to stdout
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleProgress<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            line_open: false,
        }
    }

    /// Terminate a pending progress line so log output starts on a fresh one
    pub fn end_line(&mut self) {
        if self.line_open {
            let _ = writeln!(self.out);
            let _ = self.out.flush();
            self.line_open = false;
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> ProgressHook for ConsoleProgress<W> {
    fn on_progress(&mut self, event: &ProgressEvent) {
        match event.status {
            ProgressStatus::Downloading => {
                if let Some(line) = progress_line(event) {
                    // A closed stdout is not worth failing a download over
                    let _ = self.out.write_all(line.as_bytes());
                    let _ = self.out.flush();
                    self.line_open = true;
                }
            }
            ProgressStatus::Finished | ProgressStatus::PostProcess => {
                if let Some(filename) = event.filename.as_deref().filter(|f| !f.is_empty()) {
                    self.end_line();
                    info!("Processed: {}", filename);
                }
            }
            ProgressStatus::Error | ProgressStatus::Other => {
                debug!("Progress event ignored: {:?}", event.status);
            }
        }
    }

    fn finish(&mut self) {
        self.end_line();
    }
}

/// Parse a plain `[download]` line from yt-dlp builds that ignore
/// `--progress-template`.
///
/// Expected format: `[download]  42.5% of ~ 150.00MiB at  5.20MiB/s ETA 00:15`
pub fn parse_download_line(line: &str) -> Option<ProgressEvent> {
    let rest = line.trim_start().strip_prefix("[download]")?.trim_start();

    // 1. Percentage
    let pct_pos = rest.find('%')?;
    let pct: f64 = rest[..pct_pos].trim().parse().ok()?;

    // 2. Total size, possibly approximate ("of ~ 10.00MiB")
    let total = rest.find(" of ").and_then(|of_idx| {
        let after = rest[of_idx + 4..].trim_start();
        let after = after.strip_prefix('~').unwrap_or(after).trim_start();
        let token = after.split_whitespace().next()?;
        parse_size(token)
    });

    // 3. Speed
    let speed = rest.find(" at ").and_then(|at_idx| {
        let token = rest[at_idx + 4..].split_whitespace().next()?;
        parse_size(token.strip_suffix("/s")?)
    });

    // 4. ETA as [HH:]MM:SS
    let eta = rest.find("ETA ").and_then(|eta_idx| {
        let token = rest[eta_idx + 4..].split_whitespace().next()?;
        parse_clock(token)
    });

    let total = total?;
    Some(ProgressEvent {
        status: ProgressStatus::Downloading,
        downloaded_bytes: Some((pct / 100.0 * total) as u64),
        total_bytes: None,
        total_bytes_estimate: Some(total),
        speed,
        eta,
        filename: None,
        postprocessor: None,
    })
}

/// `10.50MiB` → bytes
fn parse_size(token: &str) -> Option<f64> {
    let split = token
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(token.len());
    if split == 0 {
        return None;
    }
    let num: f64 = token[..split].parse().ok()?;
    let factor = match &token[split..] {
        "" | "B" => 1.0,
        "KiB" => 1024.0,
        "MiB" => 1024.0 * 1024.0,
        "GiB" => 1024.0 * 1024.0 * 1024.0,
        "TiB" => 1024.0 * 1024.0 * 1024.0 * 1024.0,
        "KB" | "kB" => 1000.0,
        "MB" => 1000.0 * 1000.0,
        "GB" => 1000.0 * 1000.0 * 1000.0,
        _ => return None,
    };
    Some(num * factor)
}

/// `01:02:03` / `02:03` → seconds
fn parse_clock(token: &str) -> Option<f64> {
    token.split(':').try_fold(0.0, |acc, part| {
        part.parse::<u64>().ok().map(|v| acc * 60.0 + v as f64)
    })
}
