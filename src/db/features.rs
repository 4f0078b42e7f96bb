//! Feature records.

use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::rows::{contains_pattern, datetime_at, opt_uuid_at, uuid_at};
use crate::models::{ContentKind, EntitySummary, Feature};
use crate::Result;

const COLUMNS: &str = "id, name, description, folder_id, template_prompt_id, sequence_diagram_id, sql_query_id, created_at, updated_at";

/// Folder ids bound per `IN (...)` statement.
const IN_CHUNK: usize = 500;

fn map_feature(row: &Row<'_>) -> rusqlite::Result<Feature> {
    Ok(Feature {
        id: uuid_at(row, 0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        folder_id: uuid_at(row, 3)?,
        template_prompt_id: opt_uuid_at(row, 4)?,
        sequence_diagram_id: opt_uuid_at(row, 5)?,
        sql_query_id: opt_uuid_at(row, 6)?,
        created_at: datetime_at(row, 7)?,
        updated_at: datetime_at(row, 8)?,
    })
}

fn query(conn: &Connection, filter: &str, params: impl rusqlite::Params) -> Result<Vec<Feature>> {
    let sql = format!("SELECT {} FROM features {} ORDER BY name, id", COLUMNS, filter);
    let mut stmt = conn.prepare(&sql)?;
    let features = stmt
        .query_map(params, map_feature)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(features)
}

pub(crate) fn get(conn: &Connection, id: Uuid) -> Result<Option<Feature>> {
    let sql = format!("SELECT {} FROM features WHERE id = ?", COLUMNS);
    let feature = conn
        .query_row(&sql, [id.to_string()], map_feature)
        .optional()?;
    Ok(feature)
}

pub(crate) fn insert(conn: &Connection, feature: &Feature) -> Result<()> {
    conn.execute(
        "INSERT INTO features (id, name, description, folder_id, template_prompt_id, sequence_diagram_id, sql_query_id, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        (
            feature.id.to_string(),
            &feature.name,
            &feature.description,
            feature.folder_id.to_string(),
            feature.template_prompt_id.map(|u| u.to_string()),
            feature.sequence_diagram_id.map(|u| u.to_string()),
            feature.sql_query_id.map(|u| u.to_string()),
            feature.created_at.to_rfc3339(),
            feature.updated_at.to_rfc3339(),
        ),
    )?;
    Ok(())
}

pub(crate) fn update(conn: &Connection, feature: &Feature) -> Result<bool> {
    let rows = conn.execute(
        "UPDATE features SET name = ?, description = ?, folder_id = ?, template_prompt_id = ?, sequence_diagram_id = ?, sql_query_id = ?, updated_at = ?
         WHERE id = ?",
        (
            &feature.name,
            &feature.description,
            feature.folder_id.to_string(),
            feature.template_prompt_id.map(|u| u.to_string()),
            feature.sequence_diagram_id.map(|u| u.to_string()),
            feature.sql_query_id.map(|u| u.to_string()),
            feature.updated_at.to_rfc3339(),
            feature.id.to_string(),
        ),
    )?;
    Ok(rows > 0)
}

pub(crate) fn delete(conn: &Connection, id: Uuid) -> Result<bool> {
    let rows = conn.execute("DELETE FROM features WHERE id = ?", [id.to_string()])?;
    Ok(rows > 0)
}

/// Delete every feature located in one of `folder_ids`, returning the count.
pub(crate) fn delete_in_folders(conn: &Connection, folder_ids: &[Uuid]) -> Result<usize> {
    let mut deleted = 0;
    for chunk in folder_ids.chunks(IN_CHUNK) {
        let placeholders = vec!["?"; chunk.len()].join(", ");
        let sql = format!("DELETE FROM features WHERE folder_id IN ({})", placeholders);
        deleted += conn.execute(&sql, params_from_iter(chunk.iter().map(|id| id.to_string())))?;
    }
    Ok(deleted)
}

/// Drop references to a content item that is about to disappear.
pub(crate) fn clear_content_reference(
    conn: &Connection,
    kind: ContentKind,
    content_id: Uuid,
) -> Result<usize> {
    let column = kind.feature_column();
    let sql = format!(
        "UPDATE features SET {column} = NULL, updated_at = ? WHERE {column} = ?",
        column = column
    );
    let rows = conn.execute(
        &sql,
        (chrono::Utc::now().to_rfc3339(), content_id.to_string()),
    )?;
    Ok(rows)
}

pub(crate) fn find_all(conn: &Connection) -> Result<Vec<Feature>> {
    query(conn, "", [])
}

pub(crate) fn find_by_folder(conn: &Connection, folder_id: Uuid) -> Result<Vec<Feature>> {
    query(conn, "WHERE folder_id = ?", [folder_id.to_string()])
}

pub(crate) fn find_by_name_containing(conn: &Connection, text: &str) -> Result<Vec<Feature>> {
    query(
        conn,
        "WHERE name LIKE ? ESCAPE '\\'",
        [contains_pattern(text)],
    )
}

pub(crate) fn summaries_by_folder(
    conn: &Connection,
    folder_id: Uuid,
) -> Result<Vec<EntitySummary>> {
    let mut stmt =
        conn.prepare("SELECT id, name FROM features WHERE folder_id = ? ORDER BY name, id")?;
    let summaries = stmt
        .query_map([folder_id.to_string()], |row| {
            Ok(EntitySummary {
                id: uuid_at(row, 0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(summaries)
}
