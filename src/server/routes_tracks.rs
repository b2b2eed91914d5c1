//! Music track catalog routes.

use crate::server::{error_response, AppContext};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use clipforge_db::models::MusicTrack;
use clipforge_db::queries::music_tracks;
use serde::Deserialize;

pub fn track_routes() -> Router<AppContext> {
    Router::new()
        .route("/tracks", get(list_tracks).post(create_track))
        .route("/tracks/:id", get(get_track).delete(delete_track))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTrackRequest {
    name: String,
    url: String,
    duration_secs: Option<f64>,
    #[serde(default)]
    is_default: bool,
}

async fn list_tracks(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<MusicTrack>>, (StatusCode, String)> {
    let conn = ctx.conn().map_err(error_response)?;
    let tracks = music_tracks::list_tracks(&conn).map_err(error_response)?;
    Ok(Json(tracks))
}

async fn create_track(
    State(ctx): State<AppContext>,
    Json(payload): Json<CreateTrackRequest>,
) -> Result<Json<MusicTrack>, (StatusCode, String)> {
    if payload.name.trim().is_empty() || payload.url.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "name and url must not be empty".to_string(),
        ));
    }

    let conn = ctx.conn().map_err(error_response)?;
    let track = music_tracks::create_track(
        &conn,
        payload.name.trim(),
        payload.url.trim(),
        payload.duration_secs,
        payload.is_default,
    )
    .map_err(error_response)?;

    Ok(Json(track))
}

async fn get_track(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<MusicTrack>, (StatusCode, String)> {
    let conn = ctx.conn().map_err(error_response)?;
    let track = music_tracks::get_track(&conn, &id).map_err(error_response)?;
    Ok(Json(track))
}

async fn delete_track(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let conn = ctx.conn().map_err(error_response)?;
    music_tracks::delete_track(&conn, &id).map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}
