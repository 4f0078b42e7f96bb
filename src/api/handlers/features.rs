use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::{api_error, ApiError, SearchQuery};
use crate::db::Database;
use crate::models::*;

pub async fn list_features(
    State(db): State<Database>,
) -> Result<Json<Vec<FeatureDetail>>, ApiError> {
    db.get_all_features().map(Json).map_err(api_error)
}

pub async fn search_features(
    State(db): State<Database>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<FeatureDetail>>, ApiError> {
    db.search_features(&query.name).map(Json).map_err(api_error)
}

pub async fn list_features_by_folder(
    State(db): State<Database>,
    Path(folder_id): Path<Uuid>,
) -> Result<Json<Vec<FeatureDetail>>, ApiError> {
    db.get_features_by_folder(folder_id)
        .map(Json)
        .map_err(api_error)
}

pub async fn get_feature(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<FeatureDetail>, ApiError> {
    db.get_feature(id).map(Json).map_err(api_error)
}

pub async fn create_feature(
    State(db): State<Database>,
    Json(input): Json<CreateFeatureInput>,
) -> Result<(StatusCode, Json<FeatureDetail>), ApiError> {
    db.create_feature(input)
        .map(|f| (StatusCode::CREATED, Json(f)))
        .map_err(api_error)
}

pub async fn update_feature(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateFeatureInput>,
) -> Result<Json<FeatureDetail>, ApiError> {
    db.update_feature(id, input).map(Json).map_err(api_error)
}

pub async fn delete_feature(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    db.delete_feature(id)
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(api_error)
}
