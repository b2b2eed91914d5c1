//! Pipeline job query operations.
//!
//! Jobs move through queued -> processing -> completed | failed. Every
//! transition is a guarded UPDATE whose WHERE clause names the expected
//! current status, so a concurrent writer cannot move a job backwards or
//! overwrite a terminal state.

use chrono::{DateTime, Utc};
use clipforge_common::{Error, JobId, JobStatus, PipelineStep, Result, VideoSource};
use rusqlite::{params, Connection};

use crate::models::TemplateJob;

const JOB_COLUMNS: &str = "id, name, status, video_source, source_url, steps, current_step, \
     total_steps, step_label, output_path, error_message, created_at, started_at, completed_at";

fn parse_job_row(row: &rusqlite::Row) -> rusqlite::Result<TemplateJob> {
    let steps_json: String = row.get(5)?;
    let steps: Vec<PipelineStep> = serde_json::from_str(&steps_json).unwrap_or_default();

    let video_source = row
        .get::<_, String>(3)?
        .parse()
        .unwrap_or(VideoSource::Upload);
    let source_url: String = row.get(4)?;
    let source_url = (!source_url.is_empty()).then_some(source_url);
    let (tiktok_url, video_url) = match video_source {
        VideoSource::Tiktok => (source_url, None),
        VideoSource::Upload => (None, source_url),
    };

    Ok(TemplateJob {
        id: row.get(0)?,
        name: row.get(1)?,
        status: row
            .get::<_, String>(2)?
            .parse()
            .unwrap_or(JobStatus::Queued),
        video_source,
        tiktok_url,
        video_url,
        steps,
        current_step: row.get(6)?,
        total_steps: row.get(7)?,
        step_label: row.get(8)?,
        output_path: row.get(9)?,
        error_message: row.get(10)?,
        created_at: DateTime::parse_from_rfc3339(&row.get::<_, String>(11)?)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        started_at: row
            .get::<_, Option<String>>(12)?
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc)),
        completed_at: row
            .get::<_, Option<String>>(13)?
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc)),
    })
}

/// Create a new queued job with the resolved step list.
pub fn create_job(
    conn: &Connection,
    name: &str,
    video_source: VideoSource,
    source_url: &str,
    steps: &[PipelineStep],
) -> Result<TemplateJob> {
    let id = JobId::new().to_string();
    let now = Utc::now();
    let steps_json =
        serde_json::to_string(steps).map_err(|e| Error::database(e.to_string()))?;
    // Progress counts only the steps that will actually run
    let total_steps = steps.iter().filter(|s| s.enabled).count() as u32;

    conn.execute(
        "INSERT INTO template_jobs (id, name, status, video_source, source_url, steps,
             current_step, total_steps, created_at)
         VALUES (?, ?, 'queued', ?, ?, ?, 0, ?, ?)",
        params![
            &id,
            name,
            video_source.to_string(),
            source_url,
            steps_json,
            total_steps,
            now.to_rfc3339(),
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    let stored_url = (!source_url.is_empty()).then(|| source_url.to_string());
    let (tiktok_url, video_url) = match video_source {
        VideoSource::Tiktok => (stored_url, None),
        VideoSource::Upload => (None, stored_url),
    };

    Ok(TemplateJob {
        id,
        name: name.to_string(),
        status: JobStatus::Queued,
        video_source,
        tiktok_url,
        video_url,
        steps: steps.to_vec(),
        current_step: 0,
        total_steps,
        step_label: None,
        output_path: None,
        error_message: None,
        created_at: now,
        started_at: None,
        completed_at: None,
    })
}

/// Get a job by ID.
pub fn get_job(conn: &Connection, id: &str) -> Result<TemplateJob> {
    conn.query_row(
        &format!("SELECT {} FROM template_jobs WHERE id = ?", JOB_COLUMNS),
        [id],
        |row| parse_job_row(row),
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => Error::not_found("template_job"),
        _ => Error::database(e.to_string()),
    })
}

/// List jobs, most recent first.
pub fn list_jobs(conn: &Connection, limit: usize) -> Result<Vec<TemplateJob>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {} FROM template_jobs ORDER BY created_at DESC LIMIT ?",
            JOB_COLUMNS
        ))
        .map_err(|e| Error::database(e.to_string()))?;

    let jobs = stmt
        .query_map([limit as i64], |row| parse_job_row(row))
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(jobs)
}

/// Move a job from queued to processing.
pub fn start_job(conn: &Connection, id: &str) -> Result<()> {
    let now = Utc::now();
    let affected = conn
        .execute(
            "UPDATE template_jobs SET status = 'processing', started_at = ?
             WHERE id = ? AND status = 'queued'",
            params![now.to_rfc3339(), id],
        )
        .map_err(|e| Error::database(e.to_string()))?;

    if affected == 0 {
        return Err(Error::not_found("template_job"));
    }

    Ok(())
}

/// Update step progress on a processing job.
pub fn update_step_progress(
    conn: &Connection,
    id: &str,
    current_step: u32,
    step_label: &str,
) -> Result<()> {
    let affected = conn
        .execute(
            "UPDATE template_jobs SET current_step = ?, step_label = ?
             WHERE id = ? AND status = 'processing'",
            params![current_step, step_label, id],
        )
        .map_err(|e| Error::database(e.to_string()))?;

    if affected == 0 {
        return Err(Error::not_found("template_job"));
    }

    Ok(())
}

/// Complete a processing job with its final output path.
pub fn complete_job(conn: &Connection, id: &str, output_path: &str) -> Result<()> {
    let now = Utc::now();
    let affected = conn
        .execute(
            "UPDATE template_jobs SET status = 'completed', output_path = ?,
                 step_label = NULL, completed_at = ?
             WHERE id = ? AND status = 'processing'",
            params![output_path, now.to_rfc3339(), id],
        )
        .map_err(|e| Error::database(e.to_string()))?;

    if affected == 0 {
        return Err(Error::not_found("template_job"));
    }

    Ok(())
}

/// Fail a job with an error message. Valid from queued or processing.
pub fn fail_job(conn: &Connection, id: &str, error_message: &str) -> Result<()> {
    let now = Utc::now();
    let affected = conn
        .execute(
            "UPDATE template_jobs SET status = 'failed', error_message = ?, completed_at = ?
             WHERE id = ? AND status IN ('queued', 'processing')",
            params![error_message, now.to_rfc3339(), id],
        )
        .map_err(|e| Error::database(e.to_string()))?;

    if affected == 0 {
        return Err(Error::not_found("template_job"));
    }

    Ok(())
}

/// Fail every job left in a non-terminal state by a previous process.
///
/// Called once at startup. Jobs are not resumable, so anything still
/// queued or processing at that point was orphaned by a crash or restart.
pub fn reset_orphaned_jobs(conn: &Connection) -> Result<usize> {
    let now = Utc::now();
    let affected = conn
        .execute(
            "UPDATE template_jobs
             SET status = 'failed',
                 error_message = 'Interrupted by server restart',
                 completed_at = ?
             WHERE status IN ('queued', 'processing')",
            params![now.to_rfc3339()],
        )
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;
    use clipforge_common::{OverlayPosition, StepConfig, TextOverlayConfig};

    fn sample_steps() -> Vec<PipelineStep> {
        vec![PipelineStep {
            id: "step-1".to_string(),
            config: StepConfig::TextOverlay(TextOverlayConfig {
                text: "Hello".to_string(),
                position: OverlayPosition::Bottom,
                custom_x: None,
                custom_y: None,
                font_size: 48,
                font_color: "#FFFFFF".to_string(),
                font_family: None,
                text_style: None,
                bg_color: None,
                entire_video: Some(true),
                start_time: None,
                duration: None,
                padding_left: 0,
                padding_right: 0,
            }),
            enabled: true,
        }]
    }

    #[test]
    fn test_create_and_get_job() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let job =
            create_job(&conn, "Job", VideoSource::Upload, "/media/in.mp4", &sample_steps()).unwrap();
        assert_eq!(job.status, JobStatus::Queued);
        assert_eq!(job.total_steps, 1);

        let fetched = get_job(&conn, &job.id).unwrap();
        assert_eq!(fetched.id, job.id);
        assert_eq!(fetched.steps.len(), 1);
        assert_eq!(fetched.video_url.as_deref(), Some("/media/in.mp4"));
        assert!(fetched.tiktok_url.is_none());
    }

    #[test]
    fn test_get_missing_job() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        assert!(matches!(
            get_job(&conn, "nope"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_lifecycle_happy_path() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let job =
            create_job(&conn, "Job", VideoSource::Tiktok, "https://t/v", &sample_steps()).unwrap();

        start_job(&conn, &job.id).unwrap();
        let job2 = get_job(&conn, &job.id).unwrap();
        assert_eq!(job2.status, JobStatus::Processing);
        assert!(job2.started_at.is_some());

        update_step_progress(&conn, &job.id, 1, "Adding text overlay").unwrap();
        let job3 = get_job(&conn, &job.id).unwrap();
        assert_eq!(job3.current_step, 1);
        assert_eq!(job3.step_label.as_deref(), Some("Adding text overlay"));

        complete_job(&conn, &job.id, "/media/out.mp4").unwrap();
        let job4 = get_job(&conn, &job.id).unwrap();
        assert_eq!(job4.status, JobStatus::Completed);
        assert_eq!(job4.output_path.as_deref(), Some("/media/out.mp4"));
        assert!(job4.step_label.is_none());
        assert!(job4.completed_at.is_some());
    }

    #[test]
    fn test_start_requires_queued() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let job =
            create_job(&conn, "Job", VideoSource::Upload, "/media/in.mp4", &sample_steps()).unwrap();
        start_job(&conn, &job.id).unwrap();

        // Already processing, a second start must not match
        assert!(start_job(&conn, &job.id).is_err());
    }

    #[test]
    fn test_terminal_states_are_final() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let job =
            create_job(&conn, "Job", VideoSource::Upload, "/media/in.mp4", &sample_steps()).unwrap();
        start_job(&conn, &job.id).unwrap();
        fail_job(&conn, &job.id, "Step failed: boom").unwrap();

        let failed = get_job(&conn, &job.id).unwrap();
        assert_eq!(failed.status, JobStatus::Failed);
        assert_eq!(failed.error_message.as_deref(), Some("Step failed: boom"));

        // No transition out of failed
        assert!(complete_job(&conn, &job.id, "/out.mp4").is_err());
        assert!(fail_job(&conn, &job.id, "again").is_err());
        assert!(update_step_progress(&conn, &job.id, 2, "x").is_err());
    }

    #[test]
    fn test_fail_from_queued() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let job =
            create_job(&conn, "Job", VideoSource::Upload, "/media/in.mp4", &sample_steps()).unwrap();
        fail_job(&conn, &job.id, "Invalid pipeline").unwrap();

        let failed = get_job(&conn, &job.id).unwrap();
        assert_eq!(failed.status, JobStatus::Failed);
    }

    #[test]
    fn test_list_jobs_most_recent_first() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let steps = sample_steps();
        let a = create_job(&conn, "A", VideoSource::Upload, "/a.mp4", &steps).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let b = create_job(&conn, "B", VideoSource::Upload, "/b.mp4", &steps).unwrap();

        let jobs = list_jobs(&conn, 10).unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].id, b.id);
        assert_eq!(jobs[1].id, a.id);

        let limited = list_jobs(&conn, 1).unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn test_reset_orphaned_jobs() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let steps = sample_steps();
        let queued = create_job(&conn, "A", VideoSource::Upload, "/a.mp4", &steps).unwrap();
        let processing = create_job(&conn, "B", VideoSource::Upload, "/b.mp4", &steps).unwrap();
        start_job(&conn, &processing.id).unwrap();
        let done = create_job(&conn, "C", VideoSource::Upload, "/c.mp4", &steps).unwrap();
        start_job(&conn, &done.id).unwrap();
        complete_job(&conn, &done.id, "/c-out.mp4").unwrap();

        let reset = reset_orphaned_jobs(&conn).unwrap();
        assert_eq!(reset, 2);

        assert_eq!(get_job(&conn, &queued.id).unwrap().status, JobStatus::Failed);
        assert_eq!(
            get_job(&conn, &processing.id).unwrap().status,
            JobStatus::Failed
        );
        assert_eq!(get_job(&conn, &done.id).unwrap().status, JobStatus::Completed);
    }
}
