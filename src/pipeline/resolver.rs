//! Pipeline validation and resolution.
//!
//! Resolution happens once, before the job row is created and before any
//! subprocess runs. A pipeline that resolves is guaranteed structurally
//! executable; runtime failures after this point are step failures, not
//! validation errors.

use clipforge_common::{Error, PipelineStep, Result, StepConfig, StepKind};
use std::collections::HashMap;

/// An enabled step ready for execution.
#[derive(Debug, Clone)]
pub struct ResolvedStep {
    /// Position within the resolved (enabled-only) sequence, 0-based.
    pub index: usize,
    pub step: PipelineStep,
    /// A later attach-video step references this step's output, so the
    /// runner must keep it after moving on.
    pub retain_output: bool,
}

/// Validate a pipeline and produce its executable step sequence.
///
/// `has_source_video` is whether the job supplies a source clip (TikTok
/// URL or uploaded file); without one the first enabled step must generate
/// the video.
pub fn resolve(steps: &[PipelineStep], has_source_video: bool) -> Result<Vec<ResolvedStep>> {
    let enabled: Vec<&PipelineStep> = steps.iter().filter(|s| s.enabled).collect();

    if enabled.is_empty() {
        return Err(Error::invalid_input(
            "Pipeline must contain at least one enabled step",
        ));
    }

    // Duplicate IDs would make sourceStepId references ambiguous
    let mut seen = HashMap::new();
    for step in &enabled {
        if seen.insert(step.id.as_str(), ()).is_some() {
            return Err(Error::invalid_input(format!(
                "Duplicate step id '{}'",
                step.id
            )));
        }
    }

    for (position, step) in enabled.iter().enumerate() {
        if step.config.kind() == StepKind::VideoGeneration && position != 0 {
            return Err(Error::invalid_input(
                "video-generation is only valid as the first enabled step",
            ));
        }
    }

    let starts_with_generation = enabled[0].config.kind() == StepKind::VideoGeneration;
    if !starts_with_generation && !has_source_video {
        return Err(Error::invalid_input(
            "Pipeline needs a source video (tiktokUrl or videoUrl) unless it starts \
             with video-generation",
        ));
    }

    for step in &enabled {
        step.config.validate()?;
    }

    let mut resolved: Vec<ResolvedStep> = enabled
        .iter()
        .enumerate()
        .map(|(index, step)| ResolvedStep {
            index,
            step: (*step).clone(),
            retain_output: false,
        })
        .collect();

    // Back-references must point at a strictly earlier enabled step, and
    // that step's output has to survive until the referencing step runs.
    for index in 0..resolved.len() {
        let source_id = match &resolved[index].step.config {
            StepConfig::AttachVideo(c) => c.source_step_id.clone(),
            _ => None,
        };
        let Some(source_id) = source_id else { continue };

        let target = resolved[..index]
            .iter()
            .position(|r| r.step.id == source_id);
        match target {
            Some(target_index) => resolved[target_index].retain_output = true,
            None => {
                return Err(Error::invalid_input(format!(
                    "attach-video sourceStepId '{}' does not name an earlier enabled step",
                    source_id
                )))
            }
        }
    }

    Ok(resolved)
}
