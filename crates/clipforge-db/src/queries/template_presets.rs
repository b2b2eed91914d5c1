//! Pipeline preset query operations.

use chrono::{DateTime, Utc};
use clipforge_common::{Error, PipelineStep, PresetId, Result};
use rusqlite::{params, Connection};

use crate::models::TemplatePreset;

fn parse_preset_row(row: &rusqlite::Row) -> rusqlite::Result<TemplatePreset> {
    let steps_json: String = row.get(3)?;
    let steps: Vec<PipelineStep> = serde_json::from_str(&steps_json).unwrap_or_default();

    Ok(TemplatePreset {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        steps,
        created_at: DateTime::parse_from_rfc3339(&row.get::<_, String>(4)?)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        updated_at: DateTime::parse_from_rfc3339(&row.get::<_, String>(5)?)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

/// Create a new preset.
pub fn create_preset(
    conn: &Connection,
    name: &str,
    description: Option<&str>,
    steps: &[PipelineStep],
) -> Result<TemplatePreset> {
    let id = PresetId::new().to_string();
    let now = Utc::now();
    let steps_json =
        serde_json::to_string(steps).map_err(|e| Error::database(e.to_string()))?;

    conn.execute(
        "INSERT INTO template_presets (id, name, description, steps, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?)",
        params![
            &id,
            name,
            description,
            steps_json,
            now.to_rfc3339(),
            now.to_rfc3339(),
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(TemplatePreset {
        id,
        name: name.to_string(),
        description: description.map(|s| s.to_string()),
        steps: steps.to_vec(),
        created_at: now,
        updated_at: now,
    })
}

/// Get a preset by ID.
pub fn get_preset(conn: &Connection, id: &str) -> Result<TemplatePreset> {
    conn.query_row(
        "SELECT id, name, description, steps, created_at, updated_at
         FROM template_presets WHERE id = ?",
        [id],
        |row| parse_preset_row(row),
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => Error::not_found("template_preset"),
        _ => Error::database(e.to_string()),
    })
}

/// List all presets, alphabetically by name.
pub fn list_presets(conn: &Connection) -> Result<Vec<TemplatePreset>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, name, description, steps, created_at, updated_at
             FROM template_presets ORDER BY name",
        )
        .map_err(|e| Error::database(e.to_string()))?;

    let presets = stmt
        .query_map([], |row| parse_preset_row(row))
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(presets)
}

/// Update a preset's name, description, and steps.
pub fn update_preset(
    conn: &Connection,
    id: &str,
    name: &str,
    description: Option<&str>,
    steps: &[PipelineStep],
) -> Result<()> {
    let now = Utc::now();
    let steps_json =
        serde_json::to_string(steps).map_err(|e| Error::database(e.to_string()))?;

    let affected = conn
        .execute(
            "UPDATE template_presets SET name = ?, description = ?, steps = ?, updated_at = ?
             WHERE id = ?",
            params![name, description, steps_json, now.to_rfc3339(), id],
        )
        .map_err(|e| Error::database(e.to_string()))?;

    if affected == 0 {
        return Err(Error::not_found("template_preset"));
    }

    Ok(())
}

/// Delete a preset.
pub fn delete_preset(conn: &Connection, id: &str) -> Result<()> {
    let affected = conn
        .execute("DELETE FROM template_presets WHERE id = ?", [id])
        .map_err(|e| Error::database(e.to_string()))?;

    if affected == 0 {
        return Err(Error::not_found("template_preset"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;

    #[test]
    fn test_preset_crud() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let preset = create_preset(&conn, "Daily short", Some("Overlay + music"), &[]).unwrap();
        assert_eq!(preset.name, "Daily short");

        let fetched = get_preset(&conn, &preset.id).unwrap();
        assert_eq!(fetched.description.as_deref(), Some("Overlay + music"));

        update_preset(&conn, &preset.id, "Weekly short", None, &[]).unwrap();
        let updated = get_preset(&conn, &preset.id).unwrap();
        assert_eq!(updated.name, "Weekly short");
        assert!(updated.description.is_none());
        assert!(updated.updated_at >= updated.created_at);

        delete_preset(&conn, &preset.id).unwrap();
        assert!(get_preset(&conn, &preset.id).is_err());
    }

    #[test]
    fn test_list_presets_sorted_by_name() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        create_preset(&conn, "Zebra", None, &[]).unwrap();
        create_preset(&conn, "Alpha", None, &[]).unwrap();

        let presets = list_presets(&conn).unwrap();
        assert_eq!(presets.len(), 2);
        assert_eq!(presets[0].name, "Alpha");
        assert_eq!(presets[1].name, "Zebra");
    }

    #[test]
    fn test_delete_missing_preset() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        assert!(matches!(
            delete_preset(&conn, "nope"),
            Err(Error::NotFound(_))
        ));
    }
}
