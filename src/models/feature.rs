use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ContentKind, ContentRef, Patch};

/// A reusable bundle of content located in exactly one folder.
///
/// The content references are independent: a feature may point at none, some
/// or all of them, and many features may share the same content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub folder_id: Uuid,
    pub template_prompt_id: Option<Uuid>,
    pub sequence_diagram_id: Option<Uuid>,
    pub sql_query_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Feature {
    pub fn content_id(&self, kind: ContentKind) -> Option<Uuid> {
        match kind {
            ContentKind::TemplatePrompt => self.template_prompt_id,
            ContentKind::SequenceDiagram => self.sequence_diagram_id,
            ContentKind::SqlQuery => self.sql_query_id,
        }
    }
}

/// The folder-independent part of a new feature.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureDraft {
    pub name: String,
    pub description: Option<String>,
    pub template_prompt_id: Option<Uuid>,
    pub sequence_diagram_id: Option<Uuid>,
    pub sql_query_id: Option<Uuid>,
}

/// Input for creating a feature through the feature service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFeatureInput {
    pub folder_id: Uuid,
    #[serde(flatten)]
    pub draft: FeatureDraft,
}

/// Input for updating a feature. Every field is optional.
///
/// `folder_id` moves the feature; a feature cannot be detached from its
/// folder, so there is no way to clear it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFeatureInput {
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub description: Patch<String>,
    pub folder_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub template_prompt_id: Patch<Uuid>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub sequence_diagram_id: Patch<Uuid>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub sql_query_id: Patch<Uuid>,
}

impl UpdateFeatureInput {
    pub fn content_patch(&self, kind: ContentKind) -> &Patch<Uuid> {
        match kind {
            ContentKind::TemplatePrompt => &self.template_prompt_id,
            ContentKind::SequenceDiagram => &self.sequence_diagram_id,
            ContentKind::SqlQuery => &self.sql_query_id,
        }
    }
}

/// A feature with its folder name and referenced content resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureDetail {
    #[serde(flatten)]
    pub feature: Feature,
    pub folder_name: String,
    pub template_prompt: Option<ContentRef>,
    pub sequence_diagram: Option<ContentRef>,
    pub sql_query: Option<ContentRef>,
}
