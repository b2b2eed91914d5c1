//! Background music mixing.

use super::run_ffmpeg;
use crate::probe::{has_audio_stream, probe_duration};
use crate::Result;
use std::path::Path;

/// Parameters for mixing a music track under a video.
#[derive(Debug, Clone)]
pub struct MixParams {
    /// Music volume as a percentage, 100 = unchanged.
    pub volume_pct: u32,
    /// Fade-in length in seconds, 0 disables.
    pub fade_in: f64,
    /// Fade-out length in seconds, 0 disables. Requires a known video
    /// duration to place the fade start.
    pub fade_out: f64,
}

impl MixParams {
    pub fn new(volume_pct: u32) -> Self {
        Self {
            volume_pct,
            fade_in: 0.0,
            fade_out: 0.0,
        }
    }
}

/// Build the music filter chain: volume scaling plus optional fades.
///
/// `video_duration` of `None` means the duration probe failed; the fade-out
/// is skipped in that case since its start time cannot be placed.
fn build_music_filter(params: &MixParams, video_duration: Option<f64>) -> String {
    let mut chain = format!("[1:a]volume={}", params.volume_pct as f64 / 100.0);

    if params.fade_in > 0.0 {
        chain.push_str(&format!(",afade=t=in:d={}", params.fade_in));
    }
    if params.fade_out > 0.0 {
        if let Some(duration) = video_duration {
            let start = (duration - params.fade_out).max(0.0);
            chain.push_str(&format!(",afade=t=out:st={}:d={}", start, params.fade_out));
        }
    }

    chain.push_str("[a1]");
    chain
}

/// Mix a music track under a video, trimmed to the video's length.
///
/// The video stream is always stream-copied. When the video already has an
/// audio stream the music is blended into it with `amix`; when it has none
/// the music becomes the sole audio track. Probe failures degrade rather
/// than fail: an unknown duration drops the fade-out, and an unknown audio
/// layout assumes no existing audio.
pub async fn mix_audio(
    video: &Path,
    music: &Path,
    output: &Path,
    params: &MixParams,
) -> Result<()> {
    let duration = match probe_duration(video).await {
        Ok(d) => Some(d),
        Err(err) => {
            tracing::warn!(error = %err, "Duration probe failed, skipping fade-out");
            None
        }
    };
    let video_has_audio = match has_audio_stream(video).await {
        Ok(v) => v,
        Err(err) => {
            tracing::warn!(error = %err, "Audio probe failed, assuming no audio stream");
            false
        }
    };

    let music_filter = build_music_filter(params, duration);
    tracing::debug!(
        filter = %music_filter,
        video_has_audio,
        "Mixing background music"
    );

    if video_has_audio {
        let filter_complex = format!(
            "{};[0:a][a1]amix=inputs=2:duration=first",
            music_filter
        );
        run_ffmpeg([
            "-y".as_ref(),
            "-i".as_ref(),
            video.as_os_str(),
            "-i".as_ref(),
            music.as_os_str(),
            "-filter_complex".as_ref(),
            filter_complex.as_ref(),
            "-c:v".as_ref(),
            "copy".as_ref(),
            output.as_os_str(),
        ])
        .await
    } else {
        run_ffmpeg([
            "-y".as_ref(),
            "-i".as_ref(),
            video.as_os_str(),
            "-i".as_ref(),
            music.as_os_str(),
            "-filter_complex".as_ref(),
            music_filter.as_ref(),
            "-map".as_ref(),
            "0:v".as_ref(),
            "-map".as_ref(),
            "[a1]".as_ref(),
            "-c:v".as_ref(),
            "copy".as_ref(),
            "-shortest".as_ref(),
            output.as_os_str(),
        ])
        .await
    }
}
