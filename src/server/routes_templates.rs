//! Template job routes: submit a pipeline, poll its progress, fetch results.

use crate::pipeline::resolver;
use crate::server::{error_response, AppContext};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use clipforge_common::{PipelineStep, VideoSource};
use clipforge_db::queries::template_jobs;
use serde::Deserialize;

pub fn template_routes() -> Router<AppContext> {
    Router::new()
        .route("/templates", post(create_template).get(list_templates))
        .route("/templates/:id", get(get_template))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTemplateRequest {
    name: String,
    pipeline: Vec<PipelineStep>,
    tiktok_url: Option<String>,
    video_url: Option<String>,
}

/// Submit a pipeline for execution.
///
/// The pipeline is resolved before the job row exists, so invalid requests
/// are rejected with 400 and never appear in the job list. Accepted jobs
/// come back as JSON immediately; execution is fire-and-forget.
async fn create_template(
    State(ctx): State<AppContext>,
    Json(payload): Json<CreateTemplateRequest>,
) -> Result<Json<clipforge_db::models::TemplateJob>, (StatusCode, String)> {
    if payload.name.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "name must not be empty".to_string()));
    }

    let has_source = payload.tiktok_url.is_some() || payload.video_url.is_some();
    let resolved = resolver::resolve(&payload.pipeline, has_source).map_err(error_response)?;

    // An uploaded video wins over a TikTok URL when both are supplied
    let (video_source, source_url) = match (&payload.video_url, &payload.tiktok_url) {
        (Some(url), _) => (VideoSource::Upload, url.clone()),
        (None, Some(url)) => (VideoSource::Tiktok, url.clone()),
        (None, None) => (VideoSource::Upload, String::new()),
    };

    let job = {
        let conn = ctx.conn().map_err(error_response)?;
        template_jobs::create_job(
            &conn,
            payload.name.trim(),
            video_source,
            &source_url,
            &payload.pipeline,
        )
        .map_err(error_response)?
    };

    tracing::info!(job_id = %job.id, name = %job.name, "Template job accepted");

    let runner = ctx.runner.clone();
    let spawned_job = job.clone();
    tokio::spawn(async move {
        runner.run(spawned_job, resolved).await;
    });

    Ok(Json(job))
}

async fn list_templates(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<clipforge_db::models::TemplateJob>>, (StatusCode, String)> {
    let conn = ctx.conn().map_err(error_response)?;
    let jobs = template_jobs::list_jobs(&conn, 100).map_err(error_response)?;
    Ok(Json(jobs))
}

/// Fetch a single job.
///
/// Completed jobs get a short-lived download URL attached when the store
/// supports signing; otherwise the stored URL is used as-is.
async fn get_template(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let job = {
        let conn = ctx.conn().map_err(error_response)?;
        template_jobs::get_job(&conn, &id).map_err(error_response)?
    };

    let download_url = job.output_path.as_ref().map(|stored| {
        match ctx.services.store.signed_url(stored) {
            Ok(signed) => signed,
            Err(err) => {
                tracing::debug!(error = %err, "Signing unavailable, using stored URL");
                stored.clone()
            }
        }
    });

    let mut body = serde_json::to_value(&job)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    if let Some(url) = download_url {
        body["downloadUrl"] = serde_json::Value::String(url);
    }

    Ok(Json(body))
}
