//! Rust models matching the database schema.

use chrono::{DateTime, Utc};
use clipforge_common::{JobStatus, PipelineStep, VideoSource};
use serde::{Deserialize, Serialize};

/// A pipeline execution job.
///
/// `steps` is stored as a JSON column; progress fields (`current_step`,
/// `step_label`) are updated in place while the job runs so clients can
/// poll them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateJob {
    pub id: String,
    pub name: String,
    pub status: JobStatus,
    pub video_source: VideoSource,
    pub tiktok_url: Option<String>,
    pub video_url: Option<String>,
    pub steps: Vec<PipelineStep>,
    pub current_step: u32,
    pub total_steps: u32,
    #[serde(rename = "step")]
    pub step_label: Option<String>,
    #[serde(rename = "outputUrl")]
    pub output_path: Option<String>,
    #[serde(rename = "error")]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TemplateJob {
    /// The URL the source video comes from, whichever kind was supplied.
    pub fn source_url(&self) -> Option<&str> {
        match self.video_source {
            VideoSource::Tiktok => self.tiktok_url.as_deref(),
            VideoSource::Upload => self.video_url.as_deref(),
        }
    }
}

/// A saved, reusable pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePreset {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub steps: Vec<PipelineStep>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A catalog entry for a background music track.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicTrack {
    pub id: String,
    pub name: String,
    pub url: String,
    pub duration_secs: Option<f64>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}
