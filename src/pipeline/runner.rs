//! Pipeline job execution.
//!
//! A runner owns one job from `queued` to a terminal state. Steps run
//! strictly in order; the first failure freezes the job's step counters and
//! records the error. Intermediate artifacts live in a temp workspace that
//! is removed on every exit path.

use crate::pipeline::resolver::ResolvedStep;
use crate::services::Services;
use clipforge_av::{MixParams, OverlayParams, TextAnchor, Workspace};
use clipforge_common::{
    AttachPosition, Error, OverlayPosition, Result, StepConfig, VideoSource,
};
use clipforge_db::models::TemplateJob;
use clipforge_db::pool::DbPool;
use clipforge_db::queries::{music_tracks, template_jobs};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub struct PipelineRunner {
    pool: DbPool,
    services: Services,
    step_timeout: Duration,
}

impl PipelineRunner {
    pub fn new(pool: DbPool, services: Services, step_timeout: Duration) -> Self {
        Self {
            pool,
            services,
            step_timeout,
        }
    }

    /// Execute a job to completion. Never returns an error: failures are
    /// recorded on the job row.
    pub async fn run(&self, job: TemplateJob, resolved: Vec<ResolvedStep>) {
        let job_id = job.id.clone();
        tracing::info!(job_id = %job_id, steps = resolved.len(), "Starting pipeline job");

        match self.run_inner(&job, &resolved).await {
            Ok(output_url) => {
                tracing::info!(job_id = %job_id, output_url = %output_url, "Pipeline job completed");
            }
            Err(err) => {
                tracing::error!(job_id = %job_id, error = %err, "Pipeline job failed");
                match self.pool.get() {
                    Ok(conn) => {
                        if let Err(db_err) = template_jobs::fail_job(&conn, &job_id, &err.to_string())
                        {
                            tracing::error!(job_id = %job_id, error = %db_err, "Failed to record job failure");
                        }
                    }
                    Err(pool_err) => {
                        tracing::error!(job_id = %job_id, error = %pool_err, "No connection to record job failure");
                    }
                }
            }
        }
    }

    async fn run_inner(&self, job: &TemplateJob, resolved: &[ResolvedStep]) -> Result<String> {
        {
            let conn = self.pool.get().map_err(|e| Error::database(e.to_string()))?;
            template_jobs::start_job(&conn, &job.id)?;
        }

        let workspace = Workspace::new().map_err(|e| Error::internal(e.to_string()))?;

        // Outputs kept alive for attach-video back-references
        let mut retained: HashMap<String, PathBuf> = HashMap::new();

        let starts_with_generation = matches!(
            resolved.first().map(|r| &r.step.config),
            Some(StepConfig::VideoGeneration(_))
        );

        let mut current: Option<PathBuf> = if starts_with_generation {
            None
        } else {
            let source = workspace.file("source.mp4");
            let url = job.source_url().ok_or_else(|| {
                Error::step_failed("Fetching source video: no source URL on job".to_string())
            })?;
            match job.video_source {
                VideoSource::Tiktok => {
                    self.services.fetcher.download_tiktok(url, &source).await
                }
                VideoSource::Upload => self.services.fetcher.download(url, &source).await,
            }
            .map_err(|e| Error::step_failed(format!("Fetching source video: {}", message_of(e))))?;
            Some(source)
        };

        for resolved_step in resolved {
            let label = resolved_step.step.config.label();
            {
                let conn = self.pool.get().map_err(|e| Error::database(e.to_string()))?;
                template_jobs::update_step_progress(
                    &conn,
                    &job.id,
                    resolved_step.index as u32 + 1,
                    label,
                )?;
            }
            tracing::debug!(
                job_id = %job.id,
                step = resolved_step.index + 1,
                label,
                "Executing step"
            );

            let output = workspace.step_output(resolved_step.index);
            let result = tokio::time::timeout(
                self.step_timeout,
                self.execute_step(resolved_step, current.as_deref(), &output, &workspace, &retained),
            )
            .await;

            match result {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    return Err(match err {
                        Error::StepFailed(msg) => Error::StepFailed(msg),
                        other => Error::step_failed(format!("{}: {}", label, message_of(other))),
                    })
                }
                // Dropping the future kills any child process it spawned
                Err(_) => {
                    return Err(Error::step_failed(format!(
                        "{} timed out after {}s",
                        label,
                        self.step_timeout.as_secs()
                    )))
                }
            }

            // The previous artifact is garbage unless a later step needs it
            if let Some(prev) = current.take() {
                if !retained.values().any(|p| p == &prev) {
                    if let Err(err) = tokio::fs::remove_file(&prev).await {
                        tracing::debug!(error = %err, "Failed to remove intermediate artifact");
                    }
                }
            }

            if resolved_step.retain_output {
                retained.insert(resolved_step.step.id.clone(), output.clone());
            }
            current = Some(output);
        }

        let final_output = current
            .ok_or_else(|| Error::internal("Pipeline produced no output".to_string()))?;

        let output_url = self
            .services
            .store
            .publish(&job.id, &final_output)
            .await
            .map_err(|e| Error::step_failed(format!("Publishing output: {}", message_of(e))))?;

        {
            let conn = self.pool.get().map_err(|e| Error::database(e.to_string()))?;
            template_jobs::complete_job(&conn, &job.id, &output_url)?;
        }

        Ok(output_url)
    }

    async fn execute_step(
        &self,
        resolved_step: &ResolvedStep,
        input: Option<&Path>,
        output: &Path,
        workspace: &Workspace,
        retained: &HashMap<String, PathBuf>,
    ) -> Result<()> {
        match &resolved_step.step.config {
            StepConfig::VideoGeneration(config) => {
                self.services.generation.generate(config, output).await
            }

            StepConfig::TextOverlay(config) => {
                let input = require_input(input)?;
                let anchor = match config.position {
                    OverlayPosition::Top => TextAnchor::Top,
                    OverlayPosition::Center => TextAnchor::Center,
                    OverlayPosition::Bottom => TextAnchor::Bottom,
                    OverlayPosition::Custom => TextAnchor::Custom {
                        // resolver guarantees both are present
                        x_pct: config.custom_x.unwrap_or(50.0),
                        y_pct: config.custom_y.unwrap_or(50.0),
                    },
                };
                let (start_time, duration) = config.time_window();
                let params = OverlayParams {
                    text: config.text.clone(),
                    font_size: config.font_size,
                    font_color: config.font_color.clone(),
                    anchor,
                    bg_color: config.bg_color.clone(),
                    padding_left: config.padding_left,
                    padding_right: config.padding_right,
                    start_time,
                    duration,
                };
                self.services.engine.overlay(input, output, &params).await
            }

            StepConfig::BgMusic(config) => {
                let input = require_input(input)?;
                let track_url = match (&config.track_id, &config.custom_track_url) {
                    (Some(track_id), _) => {
                        let conn =
                            self.pool.get().map_err(|e| Error::database(e.to_string()))?;
                        music_tracks::get_track(&conn, track_id)
                            .map_err(|_| {
                                Error::step_failed(format!("Music track {} not found", track_id))
                            })?
                            .url
                    }
                    (None, Some(url)) => url.clone(),
                    (None, None) => {
                        return Err(Error::internal("bg-music step without a source".to_string()))
                    }
                };

                let music = workspace.file(&format!("music-{}.mp3", resolved_step.index));
                self.services.fetcher.download(&track_url, &music).await?;

                let params = MixParams {
                    volume_pct: config.volume,
                    fade_in: config.fade_in.unwrap_or(0.0),
                    fade_out: config.fade_out.unwrap_or(0.0),
                };
                self.services
                    .engine
                    .mix(input, &music, output, &params)
                    .await
            }

            StepConfig::AttachVideo(config) => {
                let input = require_input(input)?;
                let attachment = if let Some(source_id) = &config.source_step_id {
                    retained
                        .get(source_id)
                        .cloned()
                        .ok_or_else(|| {
                            Error::internal(format!("No retained output for step '{}'", source_id))
                        })?
                } else {
                    let dest =
                        workspace.file(&format!("attach-{}.mp4", resolved_step.index));
                    if let Some(url) = &config.tiktok_url {
                        self.services.fetcher.download_tiktok(url, &dest).await?;
                    } else if let Some(url) = &config.video_url {
                        self.services.fetcher.download(url, &dest).await?;
                    }
                    dest
                };

                let inputs: Vec<&Path> = match config.position {
                    AttachPosition::Before => vec![attachment.as_path(), input],
                    AttachPosition::After => vec![input, attachment.as_path()],
                };
                self.services
                    .engine
                    .concat(&inputs, output, workspace.dir())
                    .await
            }
        }
    }
}

fn require_input(input: Option<&Path>) -> Result<&Path> {
    input.ok_or_else(|| Error::internal("Step requires an input video".to_string()))
}

/// Inner message of an error, without the variant prefix, for composing
/// user-facing step failures.
fn message_of(err: Error) -> String {
    match err {
        Error::NotFound(msg)
        | Error::Database(msg)
        | Error::InvalidInput(msg)
        | Error::StepFailed(msg)
        | Error::Internal(msg) => msg,
        Error::Io(e) => e.to_string(),
    }
}
