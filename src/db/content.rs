//! Template prompt, sequence diagram and SQL query records.
//!
//! The three kinds share a table layout, so one set of functions serves all of
//! them with the table chosen by [`ContentKind`].

use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::rows::{contains_pattern, datetime_at, uuid_at};
use crate::models::{ContentItem, ContentKind};
use crate::Result;

fn map_item(kind: ContentKind) -> impl Fn(&Row<'_>) -> rusqlite::Result<ContentItem> {
    move |row| {
        Ok(ContentItem {
            id: uuid_at(row, 0)?,
            kind,
            name: row.get(1)?,
            content: row.get(2)?,
            created_at: datetime_at(row, 3)?,
            updated_at: datetime_at(row, 4)?,
        })
    }
}

fn query(
    conn: &Connection,
    kind: ContentKind,
    filter: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<ContentItem>> {
    let sql = format!(
        "SELECT id, name, content, created_at, updated_at FROM {} {} ORDER BY name, id",
        kind.table(),
        filter
    );
    let mut stmt = conn.prepare(&sql)?;
    let items = stmt
        .query_map(params, map_item(kind))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(items)
}

pub(crate) fn get(conn: &Connection, kind: ContentKind, id: Uuid) -> Result<Option<ContentItem>> {
    let sql = format!(
        "SELECT id, name, content, created_at, updated_at FROM {} WHERE id = ?",
        kind.table()
    );
    let item = conn
        .query_row(&sql, [id.to_string()], map_item(kind))
        .optional()?;
    Ok(item)
}

pub(crate) fn exists(conn: &Connection, kind: ContentKind, id: Uuid) -> Result<bool> {
    let sql = format!("SELECT 1 FROM {} WHERE id = ?", kind.table());
    let found = conn
        .query_row(&sql, [id.to_string()], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

pub(crate) fn insert(conn: &Connection, item: &ContentItem) -> Result<()> {
    let sql = format!(
        "INSERT INTO {} (id, name, content, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        item.kind.table()
    );
    conn.execute(
        &sql,
        (
            item.id.to_string(),
            &item.name,
            &item.content,
            item.created_at.to_rfc3339(),
            item.updated_at.to_rfc3339(),
        ),
    )?;
    Ok(())
}

pub(crate) fn update(conn: &Connection, item: &ContentItem) -> Result<bool> {
    let sql = format!(
        "UPDATE {} SET name = ?, content = ?, updated_at = ? WHERE id = ?",
        item.kind.table()
    );
    let rows = conn.execute(
        &sql,
        (
            &item.name,
            &item.content,
            item.updated_at.to_rfc3339(),
            item.id.to_string(),
        ),
    )?;
    Ok(rows > 0)
}

pub(crate) fn delete(conn: &Connection, kind: ContentKind, id: Uuid) -> Result<bool> {
    let sql = format!("DELETE FROM {} WHERE id = ?", kind.table());
    let rows = conn.execute(&sql, [id.to_string()])?;
    Ok(rows > 0)
}

pub(crate) fn find_all(conn: &Connection, kind: ContentKind) -> Result<Vec<ContentItem>> {
    query(conn, kind, "", [])
}

pub(crate) fn find_by_name_containing(
    conn: &Connection,
    kind: ContentKind,
    text: &str,
) -> Result<Vec<ContentItem>> {
    query(
        conn,
        kind,
        "WHERE name LIKE ? ESCAPE '\\'",
        [contains_pattern(text)],
    )
}
