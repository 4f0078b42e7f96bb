//! Folder records.

use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::rows::{contains_pattern, datetime_at, opt_uuid_at, uuid_at};
use crate::models::{EntitySummary, Folder};
use crate::Result;

const COLUMNS: &str = "id, name, description, parent_id, created_at, updated_at";

fn map_folder(row: &Row<'_>) -> rusqlite::Result<Folder> {
    Ok(Folder {
        id: uuid_at(row, 0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        parent_id: opt_uuid_at(row, 3)?,
        created_at: datetime_at(row, 4)?,
        updated_at: datetime_at(row, 5)?,
    })
}

fn query(conn: &Connection, filter: &str, params: impl rusqlite::Params) -> Result<Vec<Folder>> {
    let sql = format!("SELECT {} FROM folders {} ORDER BY name, id", COLUMNS, filter);
    let mut stmt = conn.prepare(&sql)?;
    let folders = stmt
        .query_map(params, map_folder)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(folders)
}

pub(crate) fn get(conn: &Connection, id: Uuid) -> Result<Option<Folder>> {
    let sql = format!("SELECT {} FROM folders WHERE id = ?", COLUMNS);
    let folder = conn
        .query_row(&sql, [id.to_string()], map_folder)
        .optional()?;
    Ok(folder)
}

pub(crate) fn exists(conn: &Connection, id: Uuid) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM folders WHERE id = ?",
            [id.to_string()],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

pub(crate) fn count(conn: &Connection) -> Result<usize> {
    let n: i64 = conn.query_row("SELECT COUNT(*) FROM folders", [], |row| row.get(0))?;
    Ok(n as usize)
}

/// Parent of `id`: `None` if the folder does not exist, `Some(None)` for a root.
pub(crate) fn parent_of(conn: &Connection, id: Uuid) -> Result<Option<Option<Uuid>>> {
    let parent = conn
        .query_row(
            "SELECT parent_id FROM folders WHERE id = ?",
            [id.to_string()],
            |row| opt_uuid_at(row, 0),
        )
        .optional()?;
    Ok(parent)
}

pub(crate) fn insert(conn: &Connection, folder: &Folder) -> Result<()> {
    conn.execute(
        "INSERT INTO folders (id, name, description, parent_id, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?)",
        (
            folder.id.to_string(),
            &folder.name,
            &folder.description,
            folder.parent_id.map(|u| u.to_string()),
            folder.created_at.to_rfc3339(),
            folder.updated_at.to_rfc3339(),
        ),
    )?;
    Ok(())
}

pub(crate) fn update(conn: &Connection, folder: &Folder) -> Result<bool> {
    let rows = conn.execute(
        "UPDATE folders SET name = ?, description = ?, parent_id = ?, updated_at = ? WHERE id = ?",
        (
            &folder.name,
            &folder.description,
            folder.parent_id.map(|u| u.to_string()),
            folder.updated_at.to_rfc3339(),
            folder.id.to_string(),
        ),
    )?;
    Ok(rows > 0)
}

pub(crate) fn delete(conn: &Connection, id: Uuid) -> Result<bool> {
    let rows = conn.execute("DELETE FROM folders WHERE id = ?", [id.to_string()])?;
    Ok(rows > 0)
}

pub(crate) fn find_all(conn: &Connection) -> Result<Vec<Folder>> {
    query(conn, "", [])
}

pub(crate) fn find_by_parent(conn: &Connection, parent_id: Uuid) -> Result<Vec<Folder>> {
    query(conn, "WHERE parent_id = ?", [parent_id.to_string()])
}

pub(crate) fn find_roots(conn: &Connection) -> Result<Vec<Folder>> {
    query(conn, "WHERE parent_id IS NULL", [])
}

pub(crate) fn find_by_name_containing(conn: &Connection, text: &str) -> Result<Vec<Folder>> {
    query(
        conn,
        "WHERE name LIKE ? ESCAPE '\\'",
        [contains_pattern(text)],
    )
}

pub(crate) fn child_ids(conn: &Connection, parent_id: Uuid) -> Result<Vec<Uuid>> {
    let mut stmt = conn.prepare("SELECT id FROM folders WHERE parent_id = ?")?;
    let ids = stmt
        .query_map([parent_id.to_string()], |row| uuid_at(row, 0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(ids)
}

pub(crate) fn child_summaries(conn: &Connection, parent_id: Uuid) -> Result<Vec<EntitySummary>> {
    let mut stmt =
        conn.prepare("SELECT id, name FROM folders WHERE parent_id = ? ORDER BY name, id")?;
    let summaries = stmt
        .query_map([parent_id.to_string()], |row| {
            Ok(EntitySummary {
                id: uuid_at(row, 0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(summaries)
}
