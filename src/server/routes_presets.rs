//! Pipeline preset routes.

use crate::server::{error_response, AppContext};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use clipforge_common::PipelineStep;
use clipforge_db::models::TemplatePreset;
use clipforge_db::queries::template_presets;
use serde::Deserialize;

pub fn preset_routes() -> Router<AppContext> {
    Router::new()
        .route("/presets", get(list_presets).post(create_preset))
        .route(
            "/presets/:id",
            get(get_preset).put(update_preset).delete(delete_preset),
        )
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PresetRequest {
    name: String,
    description: Option<String>,
    pipeline: Vec<PipelineStep>,
}

async fn list_presets(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<TemplatePreset>>, (StatusCode, String)> {
    let conn = ctx.conn().map_err(error_response)?;
    let presets = template_presets::list_presets(&conn).map_err(error_response)?;
    Ok(Json(presets))
}

async fn create_preset(
    State(ctx): State<AppContext>,
    Json(payload): Json<PresetRequest>,
) -> Result<Json<TemplatePreset>, (StatusCode, String)> {
    if payload.name.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "name must not be empty".to_string()));
    }

    let conn = ctx.conn().map_err(error_response)?;
    let preset = template_presets::create_preset(
        &conn,
        payload.name.trim(),
        payload.description.as_deref(),
        &payload.pipeline,
    )
    .map_err(error_response)?;

    Ok(Json(preset))
}

async fn get_preset(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<TemplatePreset>, (StatusCode, String)> {
    let conn = ctx.conn().map_err(error_response)?;
    let preset = template_presets::get_preset(&conn, &id).map_err(error_response)?;
    Ok(Json(preset))
}

async fn update_preset(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Json(payload): Json<PresetRequest>,
) -> Result<Json<TemplatePreset>, (StatusCode, String)> {
    if payload.name.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "name must not be empty".to_string()));
    }

    let conn = ctx.conn().map_err(error_response)?;
    template_presets::update_preset(
        &conn,
        &id,
        payload.name.trim(),
        payload.description.as_deref(),
        &payload.pipeline,
    )
    .map_err(error_response)?;

    let preset = template_presets::get_preset(&conn, &id).map_err(error_response)?;
    Ok(Json(preset))
}

async fn delete_preset(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let conn = ctx.conn().map_err(error_response)?;
    template_presets::delete_preset(&conn, &id).map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}
