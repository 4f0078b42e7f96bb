pub(crate) mod content;
pub(crate) mod features;
pub(crate) mod folders;
mod rows;
pub(crate) mod schema;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use uuid::Uuid;

use crate::error::EntityKind;
use crate::hierarchy::Hierarchy;
use crate::models::*;
use crate::{Error, Result};

/// Shared handle to the entity store.
///
/// All callers share one connection. Writes run inside an `IMMEDIATE`
/// transaction while the mutex is held, so the hierarchy checks and the
/// mutation they guard are applied as one step.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: &Path, busy_timeout: Duration) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.busy_timeout(busy_timeout)?;
        Self::from_connection(conn)
    }

    pub fn open_memory() -> anyhow::Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> anyhow::Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> anyhow::Result<()> {
        let conn = self.lock();
        schema::run_migrations(&conn)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database lock poisoned")
    }

    fn read<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.lock();
        f(&conn)
    }

    /// Run `f` in a transaction. Any error rolls every statement back.
    fn write<T>(&self, f: impl FnOnce(&Transaction<'_>) -> Result<T>) -> Result<T> {
        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    // ============================================================
    // Folder operations
    // ============================================================

    pub fn get_all_folders(&self) -> Result<Vec<FolderDetail>> {
        self.read(|conn| details(conn, folders::find_all(conn)?))
    }

    pub fn get_root_folders(&self) -> Result<Vec<FolderDetail>> {
        self.read(|conn| details(conn, Hierarchy::new(conn).list_roots()?))
    }

    pub fn get_child_folders(&self, parent_id: Uuid) -> Result<Vec<FolderDetail>> {
        self.read(|conn| details(conn, Hierarchy::new(conn).list_children(parent_id)?))
    }

    pub fn search_folders(&self, name: &str) -> Result<Vec<FolderDetail>> {
        self.read(|conn| details(conn, folders::find_by_name_containing(conn, name)?))
    }

    pub fn get_folder(&self, id: Uuid) -> Result<FolderDetail> {
        self.read(|conn| {
            let h = Hierarchy::new(conn);
            h.folder_detail(h.require_folder(id)?)
        })
    }

    pub fn get_folder_tree(&self) -> Result<Vec<FolderTreeNode>> {
        self.read(|conn| Hierarchy::new(conn).tree())
    }

    pub fn get_folder_subtree(&self, id: Uuid) -> Result<FolderTreeNode> {
        self.read(|conn| Hierarchy::new(conn).subtree(id))
    }

    pub fn create_folder(&self, input: CreateFolderInput) -> Result<FolderDetail> {
        self.write(|tx| {
            let h = Hierarchy::new(tx);
            h.folder_detail(h.create_folder(input)?)
        })
    }

    pub fn update_folder(&self, id: Uuid, input: UpdateFolderInput) -> Result<FolderDetail> {
        self.write(|tx| {
            let h = Hierarchy::new(tx);
            h.folder_detail(h.update_folder(id, input)?)
        })
    }

    pub fn delete_folder(&self, id: Uuid) -> Result<DeletedSubtree> {
        self.write(|tx| Hierarchy::new(tx).delete_folder(id))
    }

    pub fn add_feature_to_folder(&self, folder_id: Uuid, draft: FeatureDraft) -> Result<FeatureDetail> {
        self.write(|tx| {
            let feature = Hierarchy::new(tx).attach_feature(folder_id, draft)?;
            feature_detail(tx, feature)
        })
    }

    pub fn move_feature_to_folder(&self, feature_id: Uuid, folder_id: Uuid) -> Result<FeatureDetail> {
        self.write(|tx| {
            let feature = Hierarchy::new(tx).move_feature(feature_id, folder_id)?;
            feature_detail(tx, feature)
        })
    }

    // ============================================================
    // Feature operations
    // ============================================================

    pub fn get_all_features(&self) -> Result<Vec<FeatureDetail>> {
        self.read(|conn| {
            features::find_all(conn)?
                .into_iter()
                .map(|f| feature_detail(conn, f))
                .collect()
        })
    }

    pub fn search_features(&self, name: &str) -> Result<Vec<FeatureDetail>> {
        self.read(|conn| {
            features::find_by_name_containing(conn, name)?
                .into_iter()
                .map(|f| feature_detail(conn, f))
                .collect()
        })
    }

    pub fn get_features_by_folder(&self, folder_id: Uuid) -> Result<Vec<FeatureDetail>> {
        self.read(|conn| {
            Hierarchy::new(conn).require_folder(folder_id)?;
            features::find_by_folder(conn, folder_id)?
                .into_iter()
                .map(|f| feature_detail(conn, f))
                .collect()
        })
    }

    pub fn get_feature(&self, id: Uuid) -> Result<FeatureDetail> {
        self.read(|conn| feature_detail(conn, require_feature(conn, id)?))
    }

    pub fn create_feature(&self, input: CreateFeatureInput) -> Result<FeatureDetail> {
        self.add_feature_to_folder(input.folder_id, input.draft)
    }

    /// Apply a partial update. Every referenced id is checked before the row
    /// is written; a failed check leaves the feature untouched.
    pub fn update_feature(&self, id: Uuid, input: UpdateFeatureInput) -> Result<FeatureDetail> {
        self.write(|tx| {
            let h = Hierarchy::new(tx);
            let existing = require_feature(tx, id)?;

            let name = match &input.name {
                Some(name) => normalize_name("feature name", name)?,
                None => existing.name.clone(),
            };
            let description = input.description.clone().apply(existing.description.clone());
            check_description(description.as_deref())?;

            for kind in ContentKind::ALL {
                if let Some(content_id) = input.content_patch(kind).as_set() {
                    h.require_content(kind, *content_id)?;
                }
            }

            let moved = match input.folder_id {
                Some(folder_id) if folder_id != existing.folder_id => {
                    Some(h.move_feature(id, folder_id)?)
                }
                _ => None,
            };
            let base = moved.unwrap_or(existing);

            let feature = Feature {
                name,
                description,
                template_prompt_id: input.template_prompt_id.apply(base.template_prompt_id),
                sequence_diagram_id: input.sequence_diagram_id.apply(base.sequence_diagram_id),
                sql_query_id: input.sql_query_id.apply(base.sql_query_id),
                updated_at: Utc::now(),
                ..base
            };
            features::update(tx, &feature)?;
            feature_detail(tx, feature)
        })
    }

    pub fn delete_feature(&self, id: Uuid) -> Result<()> {
        self.write(|tx| {
            if !features::delete(tx, id)? {
                return Err(Error::not_found(EntityKind::Feature, id));
            }
            tracing::info!(feature_id = %id, "Deleted feature");
            Ok(())
        })
    }

    // ============================================================
    // Content operations
    // ============================================================

    pub fn get_all_content(&self, kind: ContentKind) -> Result<Vec<ContentItem>> {
        self.read(|conn| content::find_all(conn, kind))
    }

    pub fn search_content(&self, kind: ContentKind, name: &str) -> Result<Vec<ContentItem>> {
        self.read(|conn| content::find_by_name_containing(conn, kind, name))
    }

    pub fn get_content(&self, kind: ContentKind, id: Uuid) -> Result<ContentItem> {
        self.read(|conn| require_content_item(conn, kind, id))
    }

    pub fn create_content(&self, kind: ContentKind, input: ContentInput) -> Result<ContentItem> {
        let name = normalize_name("name", &input.name)?;
        self.write(|tx| {
            let now = Utc::now();
            let item = ContentItem {
                id: Uuid::new_v4(),
                kind,
                name,
                content: input.content,
                created_at: now,
                updated_at: now,
            };
            content::insert(tx, &item)?;
            tracing::info!(kind = kind.as_str(), id = %item.id, "Created content item");
            Ok(item)
        })
    }

    pub fn update_content(
        &self,
        kind: ContentKind,
        id: Uuid,
        input: ContentInput,
    ) -> Result<ContentItem> {
        let name = normalize_name("name", &input.name)?;
        self.write(|tx| {
            let existing = require_content_item(tx, kind, id)?;
            let item = ContentItem {
                name,
                content: input.content,
                updated_at: Utc::now(),
                ..existing
            };
            content::update(tx, &item)?;
            Ok(item)
        })
    }

    /// Delete a content item and clear it from every feature that used it.
    pub fn delete_content(&self, kind: ContentKind, id: Uuid) -> Result<()> {
        self.write(|tx| {
            if !content::exists(tx, kind, id)? {
                return Err(Error::not_found(kind.entity(), id));
            }
            let detached = features::clear_content_reference(tx, kind, id)?;
            content::delete(tx, kind, id)?;
            tracing::info!(kind = kind.as_str(), id = %id, detached, "Deleted content item");
            Ok(())
        })
    }
}

fn details(conn: &Connection, folders: Vec<Folder>) -> Result<Vec<FolderDetail>> {
    let h = Hierarchy::new(conn);
    folders.into_iter().map(|f| h.folder_detail(f)).collect()
}

fn require_feature(conn: &Connection, id: Uuid) -> Result<Feature> {
    features::get(conn, id)?.ok_or_else(|| Error::not_found(EntityKind::Feature, id))
}

fn require_content_item(conn: &Connection, kind: ContentKind, id: Uuid) -> Result<ContentItem> {
    content::get(conn, kind, id)?.ok_or_else(|| Error::not_found(kind.entity(), id))
}

fn feature_detail(conn: &Connection, feature: Feature) -> Result<FeatureDetail> {
    let folder_name = Hierarchy::new(conn).require_folder(feature.folder_id)?.name;
    let resolve = |kind: ContentKind| -> Result<Option<ContentRef>> {
        match feature.content_id(kind) {
            Some(id) => Ok(Some(require_content_item(conn, kind, id)?.into())),
            None => Ok(None),
        }
    };

    Ok(FeatureDetail {
        template_prompt: resolve(ContentKind::TemplatePrompt)?,
        sequence_diagram: resolve(ContentKind::SequenceDiagram)?,
        sql_query: resolve(ContentKind::SqlQuery)?,
        folder_name,
        feature,
    })
}
