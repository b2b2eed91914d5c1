//! The ffmpeg-backed media engine.

use crate::services::MediaEngine;
use clipforge_av::{add_text_overlay, concat_videos, mix_audio, MixParams, OverlayParams};
use clipforge_common::{Error, Result};
use std::path::Path;

/// Applies media operations by shelling out to ffmpeg.
pub struct FfmpegEngine;

#[async_trait::async_trait]
impl MediaEngine for FfmpegEngine {
    async fn overlay(&self, input: &Path, output: &Path, params: &OverlayParams) -> Result<()> {
        add_text_overlay(input, output, params)
            .await
            .map_err(|e| Error::step_failed(e.to_string()))
    }

    async fn mix(
        &self,
        input: &Path,
        music: &Path,
        output: &Path,
        params: &MixParams,
    ) -> Result<()> {
        mix_audio(input, music, output, params)
            .await
            .map_err(|e| Error::step_failed(e.to_string()))
    }

    async fn concat(&self, inputs: &[&Path], output: &Path, work_dir: &Path) -> Result<()> {
        concat_videos(inputs, output, work_dir)
            .await
            .map_err(|e| Error::step_failed(e.to_string()))
    }
}
