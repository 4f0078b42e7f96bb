use rusqlite::ErrorCode;
use thiserror::Error;
use uuid::Uuid;

/// Entity kinds that can be reported missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Folder,
    Feature,
    TemplatePrompt,
    SequenceDiagram,
    SqlQuery,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Folder => "Folder",
            Self::Feature => "Feature",
            Self::TemplatePrompt => "Template prompt",
            Self::SequenceDiagram => "Sequence diagram",
            Self::SqlQuery => "SQL query",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{entity} not found with ID: {id}")]
    NotFound { entity: EntityKind, id: Uuid },

    /// A structurally illegal request, such as parenting a folder under itself.
    #[error("{0}")]
    InvalidOperation(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Concurrent write conflict, retry the request")]
    WriteConflict,

    #[error("Corrupt folder hierarchy: {0}")]
    Corrupt(String),

    #[error("Storage failure: {0}")]
    Storage(#[source] rusqlite::Error),
}

impl Error {
    pub fn not_found(entity: EntityKind, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        match e.sqlite_error_code() {
            Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
                Self::WriteConflict
            }
            _ => Self::Storage(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
