use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::EntitySummary;

/// A node in the folder forest.
///
/// `parent_id` is the single source of truth for the tree shape. A folder with
/// no parent is a root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolderInput {
    pub name: String,
    pub description: Option<String>,
    /// Parent folder. `None` creates a root folder.
    pub parent_id: Option<Uuid>,
}

/// Input for renaming and re-parenting a folder.
///
/// This is a full replacement: a missing `parent_id` turns the folder into a
/// root and a missing `description` clears it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateFolderInput {
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
}

/// A folder with its parent and direct contents summarized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderDetail {
    #[serde(flatten)]
    pub folder: Folder,
    pub parent_name: Option<String>,
    pub child_folders: Vec<EntitySummary>,
    pub features: Vec<EntitySummary>,
}

/// A folder with its features and nested children, used for tree responses.
///
/// Nesting is bounded; see `children_truncated`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderTreeNode {
    #[serde(flatten)]
    pub folder: Folder,
    pub features: Vec<EntitySummary>,
    pub children: Vec<FolderTreeNode>,
    /// Set when the folder has children that were cut off by the depth limit.
    #[serde(default)]
    pub children_truncated: bool,
}

/// What a cascading folder delete removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletedSubtree {
    /// Removed folders, leaves first; the deleted root is last.
    pub folder_ids: Vec<Uuid>,
    pub feature_count: usize,
}
