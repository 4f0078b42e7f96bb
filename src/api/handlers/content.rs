//! Handlers shared by the template prompt, sequence diagram and SQL query
//! routes. The route group installs its [`ContentKind`] as an extension.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use super::{api_error, ApiError, SearchQuery};
use crate::db::Database;
use crate::models::*;

pub async fn list_content(
    State(db): State<Database>,
    Extension(kind): Extension<ContentKind>,
) -> Result<Json<Vec<ContentItem>>, ApiError> {
    db.get_all_content(kind).map(Json).map_err(api_error)
}

pub async fn search_content(
    State(db): State<Database>,
    Extension(kind): Extension<ContentKind>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<ContentItem>>, ApiError> {
    db.search_content(kind, &query.name)
        .map(Json)
        .map_err(api_error)
}

pub async fn get_content(
    State(db): State<Database>,
    Extension(kind): Extension<ContentKind>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContentItem>, ApiError> {
    db.get_content(kind, id).map(Json).map_err(api_error)
}

pub async fn create_content(
    State(db): State<Database>,
    Extension(kind): Extension<ContentKind>,
    Json(input): Json<ContentInput>,
) -> Result<(StatusCode, Json<ContentItem>), ApiError> {
    db.create_content(kind, input)
        .map(|item| (StatusCode::CREATED, Json(item)))
        .map_err(api_error)
}

pub async fn update_content(
    State(db): State<Database>,
    Extension(kind): Extension<ContentKind>,
    Path(id): Path<Uuid>,
    Json(input): Json<ContentInput>,
) -> Result<Json<ContentItem>, ApiError> {
    db.update_content(kind, id, input)
        .map(Json)
        .map_err(api_error)
}

pub async fn delete_content(
    State(db): State<Database>,
    Extension(kind): Extension<ContentKind>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    db.delete_content(kind, id)
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(api_error)
}
