use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::DatabaseError;
use crate::models::*;

const TEMPLATE_COLUMNS: &str =
    "id, name, description, content, owner_id, is_shared, created_at, updated_at";

fn read_template(row: &Row<'_>) -> rusqlite::Result<Template> {
    Ok(Template {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        content: row.get(3)?,
        owner_id: row.get(4)?,
        is_shared: row.get::<_, i64>(5)? != 0,
        created_at: parse_timestamp(&row.get::<_, String>(6)?).unwrap_or_default(),
        updated_at: parse_timestamp(&row.get::<_, String>(7)?).unwrap_or_default(),
    })
}

pub fn insert_template(conn: &Connection, template: &NewTemplate) -> Result<Template, DatabaseError> {
    let now = now_timestamp();
    conn.execute(
        "INSERT INTO templates (name, description, content, owner_id, is_shared, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![
            template.name,
            template.description,
            template.content,
            template.owner_id,
            template.is_shared as i32,
            format_timestamp(&now),
        ],
    )?;
    Ok(Template {
        id: conn.last_insert_rowid(),
        name: template.name.clone(),
        description: template.description.clone(),
        content: template.content.clone(),
        owner_id: template.owner_id,
        is_shared: template.is_shared,
        created_at: now,
        updated_at: now,
    })
}

pub fn get_template(conn: &Connection, id: i64) -> Result<Option<Template>, DatabaseError> {
    let template = conn
        .query_row(
            &format!("SELECT {TEMPLATE_COLUMNS} FROM templates WHERE id = ?1"),
            params![id],
            read_template,
        )
        .optional()?;
    Ok(template)
}

/// Templates visible to `user_id`: their own plus every shared one.
/// With `mine` off, every template is returned.
pub fn list_templates(
    conn: &Connection,
    user_id: i64,
    mine: bool,
) -> Result<Vec<Template>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TEMPLATE_COLUMNS} FROM templates
         WHERE ?2 = 0 OR owner_id = ?1 OR is_shared = 1
         ORDER BY updated_at DESC, id DESC"
    ))?;
    let rows = stmt.query_map(params![user_id, mine as i32], read_template)?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_template(
    conn: &Connection,
    id: i64,
    changes: &TemplateChanges,
) -> Result<Template, DatabaseError> {
    let mut template =
        get_template(conn, id)?.ok_or_else(|| DatabaseError::not_found("Template", id))?;

    if let Some(name) = &changes.name {
        template.name = name.clone();
    }
    if let Some(description) = &changes.description {
        template.description = Some(description.clone());
    }
    if let Some(content) = &changes.content {
        template.content = content.clone();
    }
    if let Some(is_shared) = changes.is_shared {
        template.is_shared = is_shared;
    }
    template.updated_at = now_timestamp();

    conn.execute(
        "UPDATE templates SET name = ?1, description = ?2, content = ?3, is_shared = ?4,
         updated_at = ?5 WHERE id = ?6",
        params![
            template.name,
            template.description,
            template.content,
            template.is_shared as i32,
            format_timestamp(&template.updated_at),
            id,
        ],
    )?;
    Ok(template)
}

pub fn delete_template(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let removed = conn.execute("DELETE FROM templates WHERE id = ?1", params![id])?;
    if removed == 0 {
        return Err(DatabaseError::not_found("Template", id));
    }
    Ok(())
}
