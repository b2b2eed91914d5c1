//! Music track catalog query operations.

use chrono::{DateTime, Utc};
use clipforge_common::{Error, Result, TrackId};
use rusqlite::{params, Connection};

use crate::models::MusicTrack;

fn parse_track_row(row: &rusqlite::Row) -> rusqlite::Result<MusicTrack> {
    Ok(MusicTrack {
        id: row.get(0)?,
        name: row.get(1)?,
        url: row.get(2)?,
        duration_secs: row.get(3)?,
        is_default: row.get(4)?,
        created_at: DateTime::parse_from_rfc3339(&row.get::<_, String>(5)?)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

/// Add a track to the catalog.
pub fn create_track(
    conn: &Connection,
    name: &str,
    url: &str,
    duration_secs: Option<f64>,
    is_default: bool,
) -> Result<MusicTrack> {
    let id = TrackId::new().to_string();
    let now = Utc::now();

    conn.execute(
        "INSERT INTO music_tracks (id, name, url, duration_secs, is_default, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
        params![&id, name, url, duration_secs, is_default, now.to_rfc3339()],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(MusicTrack {
        id,
        name: name.to_string(),
        url: url.to_string(),
        duration_secs,
        is_default,
        created_at: now,
    })
}

/// Get a track by ID.
pub fn get_track(conn: &Connection, id: &str) -> Result<MusicTrack> {
    conn.query_row(
        "SELECT id, name, url, duration_secs, is_default, created_at
         FROM music_tracks WHERE id = ?",
        [id],
        |row| parse_track_row(row),
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => Error::not_found("music_track"),
        _ => Error::database(e.to_string()),
    })
}

/// List all tracks, alphabetically by name.
pub fn list_tracks(conn: &Connection) -> Result<Vec<MusicTrack>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, name, url, duration_secs, is_default, created_at
             FROM music_tracks ORDER BY name",
        )
        .map_err(|e| Error::database(e.to_string()))?;

    let tracks = stmt
        .query_map([], |row| parse_track_row(row))
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(tracks)
}

/// Remove a track from the catalog.
pub fn delete_track(conn: &Connection, id: &str) -> Result<()> {
    let affected = conn
        .execute("DELETE FROM music_tracks WHERE id = ?", [id])
        .map_err(|e| Error::database(e.to_string()))?;

    if affected == 0 {
        return Err(Error::not_found("music_track"));
    }

    Ok(())
}
