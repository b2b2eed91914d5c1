//! Media transformation actions.
//!
//! This module provides the pipeline's transforming operations:
//! - Text overlay burn-in (drawtext)
//! - Background music mixing with fades
//! - Video concatenation with re-encode fallback

mod concat;
mod mix;
mod overlay;

pub use concat::concat_videos;
pub use mix::{mix_audio, MixParams};
pub use overlay::{add_text_overlay, wrap_text, OverlayParams, TextAnchor};

use crate::{Error, Result};
use std::ffi::OsStr;
use tokio::process::Command;

/// Run ffmpeg with the given arguments, mapping failures to av errors.
///
/// The child is spawned with `kill_on_drop`, so cancelling the returned
/// future (e.g. a runner-imposed step timeout) also terminates ffmpeg.
pub(crate) async fn run_ffmpeg<I, S>(args: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = Command::new("ffmpeg")
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::tool_not_found("ffmpeg")
            } else {
                Error::Io(e)
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        // ffmpeg's useful diagnostics are on the last few stderr lines
        let tail: Vec<&str> = stderr.lines().rev().take(4).collect();
        let message: Vec<&str> = tail.into_iter().rev().collect();
        return Err(Error::tool_failed("ffmpeg", message.join(" | ")));
    }

    Ok(())
}
