//! Read-only ffprobe-based media probing.
//!
//! These probes inspect metadata without transforming anything. Callers in
//! the mix operation treat probe failures as degradations, not fatal errors:
//! a failed duration probe drops the fade-out, a failed audio-presence probe
//! assumes the video carries no audio.

use crate::{Error, Result};
use std::path::Path;
use tokio::process::Command;

/// Probe the container duration of a media file, in seconds.
pub async fn probe_duration(path: &Path) -> Result<f64> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::tool_not_found("ffprobe")
            } else {
                Error::Io(e)
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::tool_failed("ffprobe", stderr.to_string()));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .trim()
        .parse::<f64>()
        .map_err(|e| Error::parse_error("ffprobe", format!("bad duration {:?}: {}", stdout, e)))
}

/// Check whether a media file carries at least one audio stream.
pub async fn has_audio_stream(path: &Path) -> Result<bool> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "a",
            "-show_entries",
            "stream=index",
            "-of",
            "csv=p=0",
        ])
        .arg(path)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::tool_not_found("ffprobe")
            } else {
                Error::Io(e)
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::tool_failed("ffprobe", stderr.to_string()));
    }

    Ok(!String::from_utf8_lossy(&output.stdout).trim().is_empty())
}
