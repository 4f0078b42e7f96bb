//! Domain models for Accelerator.
//!
//! # Core Concepts
//!
//! - [`Folder`]: A named node in the folder forest. Only the child→parent
//!   reference is stored; child folders and contained features are derived by
//!   query.
//! - [`Feature`]: A named bundle located in exactly one folder, optionally
//!   referencing one of each [`ContentKind`].
//! - [`ContentItem`]: A prompt template, sequence diagram or SQL query. Owned by
//!   its own CRUD service and shared by reference between features.
//!
//! Update inputs for optional references use [`Patch`] so that "leave as is",
//! "clear" and "set" are distinct.

mod content;
mod feature;
mod folder;
mod patch;

pub use content::*;
pub use feature::*;
pub use folder::*;
pub use patch::*;

/// Longest description accepted for folders and features.
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// `id` + `name` pair used wherever a related entity is summarized.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EntitySummary {
    pub id: uuid::Uuid,
    pub name: String,
}

/// Trim a required name, rejecting blank ones.
pub(crate) fn normalize_name(field: &str, name: &str) -> crate::Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(crate::Error::Validation(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn check_description(description: Option<&str>) -> crate::Result<()> {
    match description {
        Some(d) if d.chars().count() > MAX_DESCRIPTION_LEN => Err(crate::Error::Validation(
            format!("description exceeds {} characters", MAX_DESCRIPTION_LEN),
        )),
        _ => Ok(()),
    }
}
