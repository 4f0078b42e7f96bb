use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::{api_error, ApiError, SearchQuery};
use crate::db::Database;
use crate::models::*;

pub async fn list_folders(
    State(db): State<Database>,
) -> Result<Json<Vec<FolderDetail>>, ApiError> {
    db.get_all_folders().map(Json).map_err(api_error)
}

pub async fn list_root_folders(
    State(db): State<Database>,
) -> Result<Json<Vec<FolderDetail>>, ApiError> {
    db.get_root_folders().map(Json).map_err(api_error)
}

pub async fn get_folder_tree(
    State(db): State<Database>,
) -> Result<Json<Vec<FolderTreeNode>>, ApiError> {
    db.get_folder_tree().map(Json).map_err(api_error)
}

pub async fn get_folder_subtree(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<FolderTreeNode>, ApiError> {
    db.get_folder_subtree(id).map(Json).map_err(api_error)
}

pub async fn search_folders(
    State(db): State<Database>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<FolderDetail>>, ApiError> {
    db.search_folders(&query.name).map(Json).map_err(api_error)
}

pub async fn get_folder(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<FolderDetail>, ApiError> {
    db.get_folder(id).map(Json).map_err(api_error)
}

pub async fn list_child_folders(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<FolderDetail>>, ApiError> {
    db.get_child_folders(id).map(Json).map_err(api_error)
}

pub async fn create_folder(
    State(db): State<Database>,
    Json(input): Json<CreateFolderInput>,
) -> Result<(StatusCode, Json<FolderDetail>), ApiError> {
    db.create_folder(input)
        .map(|f| (StatusCode::CREATED, Json(f)))
        .map_err(api_error)
}

pub async fn update_folder(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateFolderInput>,
) -> Result<Json<FolderDetail>, ApiError> {
    db.update_folder(id, input).map(Json).map_err(api_error)
}

pub async fn delete_folder(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    db.delete_folder(id)
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(api_error)
}

pub async fn add_feature_to_folder(
    State(db): State<Database>,
    Path(folder_id): Path<Uuid>,
    Json(draft): Json<FeatureDraft>,
) -> Result<(StatusCode, Json<FeatureDetail>), ApiError> {
    db.add_feature_to_folder(folder_id, draft)
        .map(|f| (StatusCode::CREATED, Json(f)))
        .map_err(api_error)
}

pub async fn move_feature_to_folder(
    State(db): State<Database>,
    Path((folder_id, feature_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<FeatureDetail>, ApiError> {
    db.move_feature_to_folder(feature_id, folder_id)
        .map(Json)
        .map_err(api_error)
}
