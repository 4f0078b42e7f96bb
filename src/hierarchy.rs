//! Folder hierarchy manager.
//!
//! Folders form a forest through their `parent_id`. Every mutation here
//! validates fully before writing anything, so callers that run a
//! [`Hierarchy`] inside one transaction never observe a half-applied change.
//!
//! Child sets are always derived from `parent_id` lookups; nothing stores the
//! reverse direction.

use std::collections::{HashMap, HashSet, VecDeque};

use chrono::Utc;
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::{content, features, folders};
use crate::error::EntityKind;
use crate::models::*;
use crate::{Error, Result};

/// Deepest folder nesting returned in one tree response.
pub const MAX_TREE_DEPTH: usize = 32;

/// Hierarchy operations over an open connection or transaction.
pub struct Hierarchy<'c> {
    conn: &'c Connection,
}

impl<'c> Hierarchy<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    // ============================================================
    // Folder mutations
    // ============================================================

    pub fn create_folder(&self, input: CreateFolderInput) -> Result<Folder> {
        let name = normalize_name("folder name", &input.name)?;
        check_description(input.description.as_deref())?;

        // A new node has no descendants, so existence is the only check
        if let Some(parent_id) = input.parent_id {
            self.require_folder(parent_id)?;
        }

        let now = Utc::now();
        let folder = Folder {
            id: Uuid::new_v4(),
            name,
            description: input.description,
            parent_id: input.parent_id,
            created_at: now,
            updated_at: now,
        };
        folders::insert(self.conn, &folder)?;

        tracing::info!(folder_id = %folder.id, parent_id = ?folder.parent_id, "Created folder");
        Ok(folder)
    }

    /// Rename and re-parent a folder. A `None` parent makes it a root.
    pub fn update_folder(&self, id: Uuid, input: UpdateFolderInput) -> Result<Folder> {
        let existing = self.require_folder(id)?;
        let name = normalize_name("folder name", &input.name)?;
        check_description(input.description.as_deref())?;

        if let Some(parent_id) = input.parent_id {
            self.check_new_parent(id, parent_id)?;
        }

        let folder = Folder {
            name,
            description: input.description,
            parent_id: input.parent_id,
            updated_at: Utc::now(),
            ..existing
        };
        folders::update(self.conn, &folder)?;

        if existing.parent_id != folder.parent_id {
            tracing::info!(
                folder_id = %id,
                from = ?existing.parent_id,
                to = ?folder.parent_id,
                "Moved folder"
            );
        }
        Ok(folder)
    }

    fn check_new_parent(&self, id: Uuid, parent_id: Uuid) -> Result<()> {
        if parent_id == id {
            tracing::warn!(folder_id = %id, "Rejected self-parenting");
            return Err(Error::InvalidOperation(
                "A folder cannot be its own parent".to_string(),
            ));
        }

        self.require_folder(parent_id)?;

        if self.is_ancestor(id, parent_id)? {
            tracing::warn!(folder_id = %id, parent_id = %parent_id, "Rejected descendant parent");
            return Err(Error::InvalidOperation(
                "Cannot set a descendant folder as parent".to_string(),
            ));
        }
        Ok(())
    }

    /// Delete a folder, every folder below it and every feature they contain.
    ///
    /// The subtree is collected first, then features go, then folders from the
    /// leaves up, so no statement ever leaves a dangling reference behind.
    pub fn delete_folder(&self, id: Uuid) -> Result<DeletedSubtree> {
        if !folders::exists(self.conn, id)? {
            return Err(Error::not_found(EntityKind::Folder, id));
        }

        let subtree = self.subtree_ids(id)?;
        let feature_count = features::delete_in_folders(self.conn, &subtree)?;

        // Breadth-first order puts every parent before its children
        let folder_ids: Vec<Uuid> = subtree.into_iter().rev().collect();
        for folder_id in &folder_ids {
            if !folders::delete(self.conn, *folder_id)? {
                return Err(Error::Corrupt(format!(
                    "folder {} vanished during delete",
                    folder_id
                )));
            }
        }

        tracing::info!(
            folder_id = %id,
            folders = folder_ids.len(),
            features = feature_count,
            "Deleted folder subtree"
        );
        Ok(DeletedSubtree {
            folder_ids,
            feature_count,
        })
    }

    // ============================================================
    // Structure queries
    // ============================================================

    pub fn require_folder(&self, id: Uuid) -> Result<Folder> {
        folders::get(self.conn, id)?.ok_or_else(|| Error::not_found(EntityKind::Folder, id))
    }

    pub fn list_children(&self, parent_id: Uuid) -> Result<Vec<Folder>> {
        if !folders::exists(self.conn, parent_id)? {
            return Err(Error::not_found(EntityKind::Folder, parent_id));
        }
        folders::find_by_parent(self.conn, parent_id)
    }

    pub fn list_roots(&self) -> Result<Vec<Folder>> {
        folders::find_roots(self.conn)
    }

    /// Ids on the parent chain above `id`, nearest first.
    ///
    /// The walk is bounded by the folder count; running past it means the
    /// stored parent references contain a cycle.
    pub fn ancestor_ids(&self, id: Uuid) -> Result<Vec<Uuid>> {
        let limit = folders::count(self.conn)?;
        let mut current = folders::parent_of(self.conn, id)?
            .ok_or_else(|| Error::not_found(EntityKind::Folder, id))?;
        let mut ancestors = Vec::new();

        while let Some(parent_id) = current {
            if ancestors.len() >= limit {
                return Err(Error::Corrupt(format!(
                    "parent chain above {} does not reach a root",
                    id
                )));
            }
            ancestors.push(parent_id);
            current = folders::parent_of(self.conn, parent_id)?.ok_or_else(|| {
                Error::Corrupt(format!("folder references missing parent {}", parent_id))
            })?;
        }
        Ok(ancestors)
    }

    /// Whether `ancestor` lies on the parent chain above `id`.
    pub fn is_ancestor(&self, ancestor: Uuid, id: Uuid) -> Result<bool> {
        Ok(self.ancestor_ids(id)?.contains(&ancestor))
    }

    /// `root` followed by all of its descendants in breadth-first order.
    pub fn subtree_ids(&self, root: Uuid) -> Result<Vec<Uuid>> {
        let mut seen = HashSet::from([root]);
        let mut order = vec![root];
        let mut queue = VecDeque::from([root]);

        while let Some(folder_id) = queue.pop_front() {
            for child in folders::child_ids(self.conn, folder_id)? {
                if !seen.insert(child) {
                    return Err(Error::Corrupt(format!(
                        "folder {} is reachable twice below {}",
                        child, root
                    )));
                }
                order.push(child);
                queue.push_back(child);
            }
        }
        Ok(order)
    }

    // ============================================================
    // Features in folders
    // ============================================================

    /// Persist a new feature located in `folder_id`.
    pub fn attach_feature(&self, folder_id: Uuid, draft: FeatureDraft) -> Result<Feature> {
        self.require_folder(folder_id)?;
        let name = normalize_name("feature name", &draft.name)?;
        check_description(draft.description.as_deref())?;

        let refs = [
            (ContentKind::TemplatePrompt, draft.template_prompt_id),
            (ContentKind::SequenceDiagram, draft.sequence_diagram_id),
            (ContentKind::SqlQuery, draft.sql_query_id),
        ];
        for (kind, id) in refs {
            if let Some(id) = id {
                self.require_content(kind, id)?;
            }
        }

        let now = Utc::now();
        let feature = Feature {
            id: Uuid::new_v4(),
            name,
            description: draft.description,
            folder_id,
            template_prompt_id: draft.template_prompt_id,
            sequence_diagram_id: draft.sequence_diagram_id,
            sql_query_id: draft.sql_query_id,
            created_at: now,
            updated_at: now,
        };
        features::insert(self.conn, &feature)?;

        tracing::info!(feature_id = %feature.id, folder_id = %folder_id, "Attached feature");
        Ok(feature)
    }

    pub fn move_feature(&self, feature_id: Uuid, folder_id: Uuid) -> Result<Feature> {
        let existing = features::get(self.conn, feature_id)?
            .ok_or_else(|| Error::not_found(EntityKind::Feature, feature_id))?;
        self.require_folder(folder_id)?;

        let feature = Feature {
            folder_id,
            updated_at: Utc::now(),
            ..existing
        };
        features::update(self.conn, &feature)?;

        tracing::info!(
            feature_id = %feature_id,
            from = %existing.folder_id,
            to = %folder_id,
            "Moved feature"
        );
        Ok(feature)
    }

    pub(crate) fn require_content(&self, kind: ContentKind, id: Uuid) -> Result<()> {
        if content::exists(self.conn, kind, id)? {
            Ok(())
        } else {
            Err(Error::not_found(kind.entity(), id))
        }
    }

    // ============================================================
    // Read models
    // ============================================================

    pub fn folder_detail(&self, folder: Folder) -> Result<FolderDetail> {
        let parent_name = match folder.parent_id {
            Some(parent_id) => Some(self.require_folder(parent_id)?.name),
            None => None,
        };
        let child_folders = folders::child_summaries(self.conn, folder.id)?;
        let features = features::summaries_by_folder(self.conn, folder.id)?;

        Ok(FolderDetail {
            folder,
            parent_name,
            child_folders,
            features,
        })
    }

    /// The whole forest, built from one scan of folders and one of features.
    ///
    /// Nesting stops at [`MAX_TREE_DEPTH`]; folders at that depth report
    /// `children_truncated` and their subtree is available from
    /// [`Hierarchy::subtree`].
    pub fn tree(&self) -> Result<Vec<FolderTreeNode>> {
        self.build_tree(None)
    }

    /// The tree rooted at `id`, with `id` at depth one.
    pub fn subtree(&self, id: Uuid) -> Result<FolderTreeNode> {
        self.require_folder(id)?;
        self.build_tree(Some(id))?
            .pop()
            .ok_or_else(|| Error::Corrupt(format!("folder {} vanished while building its tree", id)))
    }

    fn build_tree(&self, root: Option<Uuid>) -> Result<Vec<FolderTreeNode>> {
        let scanned = folders::find_all(self.conn)?;
        let total = scanned.len();

        let mut children_map: HashMap<Option<Uuid>, Vec<Uuid>> = HashMap::new();
        let mut by_id: HashMap<Uuid, Folder> = HashMap::with_capacity(total);
        for folder in scanned {
            children_map.entry(folder.parent_id).or_default().push(folder.id);
            by_id.insert(folder.id, folder);
        }

        let mut features_map: HashMap<Uuid, Vec<EntitySummary>> = HashMap::new();
        for feature in features::find_all(self.conn)? {
            features_map
                .entry(feature.folder_id)
                .or_default()
                .push(EntitySummary {
                    id: feature.id,
                    name: feature.name,
                });
        }

        let start: Vec<Uuid> = match root {
            Some(id) => vec![id],
            None => children_map.get(&None).cloned().unwrap_or_default(),
        };

        // Breadth-first over ids, all the way down, so every stored folder is
        // accounted for even below the depth cap
        let mut seen: HashSet<Uuid> = start.iter().copied().collect();
        let mut queue: VecDeque<(Uuid, usize)> = start.iter().map(|id| (*id, 1)).collect();
        let mut order = Vec::with_capacity(total);
        while let Some((id, depth)) = queue.pop_front() {
            order.push((id, depth));
            for child in children_map.get(&Some(id)).into_iter().flatten() {
                if !seen.insert(*child) {
                    return Err(Error::Corrupt(format!(
                        "folder {} is reachable twice in the tree",
                        child
                    )));
                }
                queue.push_back((*child, depth + 1));
            }
        }
        if root.is_none() && order.len() != total {
            return Err(Error::Corrupt(format!(
                "{} of {} folders are not reachable from a root",
                total - order.len(),
                total
            )));
        }

        // Children come later in breadth-first order, so walking it backwards
        // builds every node after all of its children
        let mut built: HashMap<Uuid, FolderTreeNode> = HashMap::new();
        for &(id, depth) in order.iter().rev() {
            if depth > MAX_TREE_DEPTH {
                continue;
            }
            let child_ids = children_map.get(&Some(id)).map(Vec::as_slice).unwrap_or(&[]);
            let (children, children_truncated) = if depth == MAX_TREE_DEPTH {
                (Vec::new(), !child_ids.is_empty())
            } else {
                let nodes = child_ids.iter().filter_map(|c| built.remove(c)).collect();
                (nodes, false)
            };
            let folder = by_id
                .remove(&id)
                .ok_or_else(|| Error::Corrupt(format!("folder {} placed twice", id)))?;
            built.insert(
                id,
                FolderTreeNode {
                    folder,
                    features: features_map.remove(&id).unwrap_or_default(),
                    children,
                    children_truncated,
                },
            );
        }

        Ok(start.iter().filter_map(|id| built.remove(id)).collect())
    }
}
