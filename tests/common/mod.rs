//! Fake yt-dlp used by the process-level tests.
//!
//! The script speaks the same line protocol ytfetch asks the real yt-dlp
//! for. URLs containing `fail` end with an `ERROR:` line and exit 1, URLs
//! containing `crash` exit 3 silently, URLs containing `slow` touch a marker
//! file and then hang; everything else "downloads" one file.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tempfile::TempDir;

pub const FAKE_VERSION: &str = "2024.08.06";

static FAKE: OnceLock<TempDir> = OnceLock::new();

/// Directory holding the fake yt-dlp (created once per test binary)
pub fn fake_dir() -> &'static Path {
    FAKE.get_or_init(|| {
        let dir = TempDir::new().expect("temp dir");
        write_script(dir.path());
        dir
    })
    .path()
}

/// Path of the fake yt-dlp executable
pub fn fake_ytdlp() -> PathBuf {
    fake_dir().join("yt-dlp")
}

/// Arguments of the last invocation whose URL contained `args-check`
pub fn recorded_args() -> Vec<String> {
    std::fs::read_to_string(fake_dir().join("last-args.txt"))
        .expect("args recorded")
        .lines()
        .map(str::to_string)
        .collect()
}

/// Marker written once a `slow` URL has started downloading
pub fn slow_marker() -> PathBuf {
    fake_dir().join("slow-started")
}

fn write_script(dir: &Path) {
    use std::os::unix::fs::PermissionsExt;

    let script = format!(
        r#"#!/bin/sh
if [ "$1" = "--version" ]; then
  echo "{version}"
  exit 0
fi
for last; do :; done
case "$last" in
  *args-check*) printf '%s\n' "$@" > "{dir}/last-args.txt" ;;
esac
case "$last" in
  *fail*)
    echo "[generic] Extracting URL: $last"
    echo "ERROR: [generic] Unsupported URL: $last" >&2
    exit 1
    ;;
  *crash*)
    exit 3
    ;;
  *slow*)
    touch "{dir}/slow-started"
    exec sleep 5
    ;;
esac
echo "[youtube] abc: Downloading webpage"
echo "WARNING: [youtube] nsig extraction slow" >&2
echo '[ytfetch:download] {{"status": "downloading", "downloaded_bytes": 512, "total_bytes": 1024, "speed": 256.0, "eta": 2}}'
echo '[ytfetch:download] {{"status": "downloading", "downloaded_bytes": 100, "total_bytes": null, "total_bytes_estimate": null}}'
echo '[ytfetch:download] {{"status": "finished", "downloaded_bytes": 1024, "total_bytes": 1024, "filename": "/out/clip.f137.mp4"}}'
printf '[ytfetch:postprocess] started\037MoveFiles\037/out/clip.mp4\n'
printf '[ytfetch:postprocess] finished\037MoveFiles\037/out/clip.mp4\n'
echo "[ytfetch:filepath] /out/clip.mp4"
exit 0
"#,
        version = FAKE_VERSION,
        dir = dir.display()
    );

    let path = dir.join("yt-dlp");
    std::fs::write(&path, script).expect("write fake yt-dlp");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod");
}
