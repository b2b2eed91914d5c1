//! # clipforge-av
//!
//! FFmpeg-backed media operations for clipforge pipelines.
//!
//! This crate provides the stateless building blocks the pipeline runner
//! composes:
//! - Burning a text overlay onto a video (drawtext, with manual word wrap)
//! - Mixing a background music track into a video with fades
//! - Concatenating videos (stream-copy first, re-encode fallback)
//! - Read-only probing (duration, audio-stream presence)
//! - Per-run temporary workspace management
//!
//! All transforming operations shell out to the `ffmpeg` CLI via
//! `tokio::process` with `kill_on_drop`, so a caller-imposed timeout that
//! drops the in-flight future also terminates the transcoder.
//!
//! ## Example
//!
//! ```no_run
//! use clipforge_av::{add_text_overlay, OverlayParams, TextAnchor};
//!
//! # async fn example() -> clipforge_av::Result<()> {
//! let params = OverlayParams::new("Hello", 48, "#FFFFFF", TextAnchor::Bottom);
//! add_text_overlay("in.mp4".as_ref(), "out.mp4".as_ref(), &params).await?;
//! # Ok(())
//! # }
//! ```

mod error;

pub mod actions;
pub mod probe;
pub mod tools;
pub mod workspace;

// Re-exports
pub use actions::{
    add_text_overlay, concat_videos, mix_audio, wrap_text, MixParams, OverlayParams, TextAnchor,
};
pub use error::{Error, Result};
pub use probe::{has_audio_stream, probe_duration};
pub use tools::{check_tool, check_tools, ToolInfo};
pub use workspace::Workspace;
