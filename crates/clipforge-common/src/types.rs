//! The pipeline data model.
//!
//! A pipeline is an ordered list of [`PipelineStep`]s, each carrying one
//! variant of the tagged [`StepConfig`] union. The wire format matches the
//! authoring collaborator's JSON: a `type` discriminant in kebab-case and a
//! camelCase `config` object. Field names are stable contract; do not
//! rename without migrating stored pipelines.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepKind {
    /// Generate a video from a still image via the external generation service.
    VideoGeneration,
    /// Burn text onto the video.
    TextOverlay,
    /// Mix a background music track into the video.
    BgMusic,
    /// Splice another clip before or after the running output.
    AttachVideo,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VideoGeneration => write!(f, "video-generation"),
            Self::TextOverlay => write!(f, "text-overlay"),
            Self::BgMusic => write!(f, "bg-music"),
            Self::AttachVideo => write!(f, "attach-video"),
        }
    }
}

impl std::str::FromStr for StepKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "video-generation" => Ok(Self::VideoGeneration),
            "text-overlay" => Ok(Self::TextOverlay),
            "bg-music" => Ok(Self::BgMusic),
            "attach-video" => Ok(Self::AttachVideo),
            _ => Err(format!("Invalid step kind: {}", s)),
        }
    }
}

/// Generation mode for the video-generation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VideoGenMode {
    /// Prompt-driven camera/subject motion.
    MotionControl,
    /// Gentle ambient animation of the source image.
    SubtleAnimation,
}

impl VideoGenMode {
    /// Allowed clip duration range in seconds for this mode.
    pub fn duration_bounds(&self) -> (u32, u32) {
        match self {
            Self::MotionControl => (5, 30),
            Self::SubtleAnimation => (2, 10),
        }
    }

    /// Default clip duration in seconds for this mode.
    pub fn default_seconds(&self) -> u32 {
        match self {
            Self::MotionControl => 10,
            Self::SubtleAnimation => 5,
        }
    }
}

/// Vertical anchor for the text overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayPosition {
    Top,
    Center,
    Bottom,
    /// Percentage-based placement using `custom_x`/`custom_y`.
    Custom,
}

/// Whether an attached clip goes before or after the running output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachPosition {
    Before,
    After,
}

/// Configuration for the video-generation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoGenConfig {
    pub mode: VideoGenMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_seconds: Option<u32>,
}

impl VideoGenConfig {
    /// Requested duration clamped to the mode's bounds, defaulting per mode.
    pub fn effective_seconds(&self) -> u32 {
        let (min, max) = self.mode.duration_bounds();
        self.max_seconds
            .unwrap_or_else(|| self.mode.default_seconds())
            .clamp(min, max)
    }

    /// Validate that exactly one image source resolves.
    pub fn validate(&self) -> Result<()> {
        let has_model_image = self.model_id.is_some() && self.image_id.is_some();
        let has_direct_url = self.image_url.is_some();
        if has_model_image == has_direct_url {
            return Err(Error::invalid_input(
                "video-generation requires exactly one image source \
                 (modelId+imageId or imageUrl)",
            ));
        }
        Ok(())
    }
}

/// Configuration for the text-overlay step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextOverlayConfig {
    pub text: String,
    pub position: OverlayPosition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_y: Option<f64>,
    pub font_size: u32,
    pub font_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entire_video: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Word-wrap margins in pixels. Part of the execution contract even
    /// though the authoring UI does not expose them.
    #[serde(default)]
    pub padding_left: u32,
    #[serde(default)]
    pub padding_right: u32,
}

impl TextOverlayConfig {
    /// The overlay time window, honoring `entire_video`.
    ///
    /// Returns `(start_time, duration)` with both absent when the overlay
    /// applies to the whole clip.
    pub fn time_window(&self) -> (Option<f64>, Option<f64>) {
        if self.entire_video.unwrap_or(false) {
            (None, None)
        } else {
            (self.start_time, self.duration)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(Error::invalid_input("text-overlay text must not be empty"));
        }
        if self.font_size == 0 {
            return Err(Error::invalid_input("text-overlay fontSize must be > 0"));
        }
        match self.position {
            OverlayPosition::Custom => {
                let (x, y) = match (self.custom_x, self.custom_y) {
                    (Some(x), Some(y)) => (x, y),
                    _ => {
                        return Err(Error::invalid_input(
                            "text-overlay position=custom requires customX and customY",
                        ))
                    }
                };
                if !(0.0..=100.0).contains(&x) || !(0.0..=100.0).contains(&y) {
                    return Err(Error::invalid_input(
                        "text-overlay customX/customY must be within 0-100",
                    ));
                }
            }
            _ => {
                if self.custom_x.is_some() || self.custom_y.is_some() {
                    return Err(Error::invalid_input(
                        "text-overlay customX/customY are only valid with position=custom",
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Configuration for the bg-music step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BgMusicConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_track_url: Option<String>,
    /// Music gain as a percentage (0-100).
    pub volume: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fade_in: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fade_out: Option<f64>,
}

impl BgMusicConfig {
    /// Validate that exactly one audio source is configured.
    pub fn validate(&self) -> Result<()> {
        if self.track_id.is_some() == self.custom_track_url.is_some() {
            return Err(Error::invalid_input(
                "bg-music requires exactly one of trackId or customTrackUrl",
            ));
        }
        if self.volume > 100 {
            return Err(Error::invalid_input("bg-music volume must be within 0-100"));
        }
        Ok(())
    }
}

/// Configuration for the attach-video step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachVideoConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiktok_url: Option<String>,
    /// Back-reference to an earlier enabled step whose output is attached.
    /// Takes precedence over `tiktok_url` and `video_url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_step_id: Option<String>,
    pub position: AttachPosition,
}

impl AttachVideoConfig {
    pub fn validate(&self) -> Result<()> {
        if self.source_step_id.is_none() && self.tiktok_url.is_none() && self.video_url.is_none() {
            return Err(Error::invalid_input(
                "attach-video requires one of sourceStepId, tiktokUrl, or videoUrl",
            ));
        }
        Ok(())
    }
}

/// One configured step of a pipeline, the tagged union over all step kinds.
///
/// The explicit tag means the resolver and the media operations can match
/// exhaustively; adding a step kind is a compile error everywhere it is not
/// handled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "kebab-case")]
pub enum StepConfig {
    VideoGeneration(VideoGenConfig),
    TextOverlay(TextOverlayConfig),
    BgMusic(BgMusicConfig),
    AttachVideo(AttachVideoConfig),
}

impl StepConfig {
    pub fn kind(&self) -> StepKind {
        match self {
            Self::VideoGeneration(_) => StepKind::VideoGeneration,
            Self::TextOverlay(_) => StepKind::TextOverlay,
            Self::BgMusic(_) => StepKind::BgMusic,
            Self::AttachVideo(_) => StepKind::AttachVideo,
        }
    }

    /// Human-readable activity label shown as the job's current `step`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::VideoGeneration(_) => "Generating video",
            Self::TextOverlay(_) => "Adding text overlay",
            Self::BgMusic(_) => "Mixing background music",
            Self::AttachVideo(_) => "Attaching video",
        }
    }

    /// Validate this variant's configuration.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::VideoGeneration(c) => c.validate(),
            Self::TextOverlay(c) => c.validate(),
            Self::BgMusic(c) => c.validate(),
            Self::AttachVideo(c) => c.validate(),
        }
    }
}

/// One step in a pipeline. Order within the containing list is execution
/// order; disabled steps are skipped entirely and not validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStep {
    /// Opaque authoring-supplied ID, unique within the pipeline. The only
    /// valid way to reference a step from `attach-video.sourceStepId`.
    pub id: String,
    #[serde(flatten)]
    pub config: StepConfig,
    pub enabled: bool,
}

/// Lifecycle status of a template job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Whether this is a terminal state (no transitions out).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queued => write!(f, "queued"),
            Self::Processing => write!(f, "processing"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "queued" => Ok(Self::Queued),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("Invalid job status: {}", s)),
        }
    }
}

/// Where the job's source video comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoSource {
    Tiktok,
    Upload,
}

impl fmt::Display for VideoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tiktok => write!(f, "tiktok"),
            Self::Upload => write!(f, "upload"),
        }
    }
}

impl std::str::FromStr for VideoSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "tiktok" => Ok(Self::Tiktok),
            "upload" => Ok(Self::Upload),
            _ => Err(format!("Invalid video source: {}", s)),
        }
    }
}
