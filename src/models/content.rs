use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EntityKind;

/// The three kinds of content a feature can reference.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    TemplatePrompt,
    SequenceDiagram,
    SqlQuery,
}

impl ContentKind {
    pub const ALL: [ContentKind; 3] = [
        Self::TemplatePrompt,
        Self::SequenceDiagram,
        Self::SqlQuery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TemplatePrompt => "template_prompt",
            Self::SequenceDiagram => "sequence_diagram",
            Self::SqlQuery => "sql_query",
        }
    }

    /// Table holding items of this kind.
    pub(crate) fn table(&self) -> &'static str {
        match self {
            Self::TemplatePrompt => "template_prompts",
            Self::SequenceDiagram => "sequence_diagrams",
            Self::SqlQuery => "sql_queries",
        }
    }

    /// Column on `features` referencing items of this kind.
    pub(crate) fn feature_column(&self) -> &'static str {
        match self {
            Self::TemplatePrompt => "template_prompt_id",
            Self::SequenceDiagram => "sequence_diagram_id",
            Self::SqlQuery => "sql_query_id",
        }
    }

    pub fn entity(&self) -> EntityKind {
        match self {
            Self::TemplatePrompt => EntityKind::TemplatePrompt,
            Self::SequenceDiagram => EntityKind::SequenceDiagram,
            Self::SqlQuery => EntityKind::SqlQuery,
        }
    }
}

/// A prompt template, sequence diagram or SQL query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: Uuid,
    pub kind: ContentKind,
    pub name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or replacing a content item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentInput {
    pub name: String,
    #[serde(default)]
    pub content: String,
}

/// Content embedded in a feature response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRef {
    pub id: Uuid,
    pub name: String,
    pub content: String,
}

impl From<ContentItem> for ContentRef {
    fn from(item: ContentItem) -> Self {
        Self {
            id: item.id,
            name: item.name,
            content: item.content,
        }
    }
}
