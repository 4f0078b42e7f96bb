mod handlers;

use axum::{
    http::HeaderValue,
    routing::{get, post, put},
    Extension, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::db::Database;
use crate::models::ContentKind;

/// Router with permissive CORS, as used for local serving and tests.
pub fn create_router(db: Database) -> Router {
    create_router_with_cors(db, None)
}

/// Router restricted to `cors_origins` when given. Origins that are not valid
/// header values are skipped with a warning.
pub fn create_router_with_cors(db: Database, cors_origins: Option<&[String]>) -> Router {
    let api = Router::new()
        // Folders
        .route("/folders", get(handlers::list_folders).post(handlers::create_folder))
        .route("/folders/root", get(handlers::list_root_folders))
        .route("/folders/tree", get(handlers::get_folder_tree))
        .route("/folders/search", get(handlers::search_folders))
        .route(
            "/folders/{id}",
            get(handlers::get_folder)
                .put(handlers::update_folder)
                .delete(handlers::delete_folder),
        )
        .route("/folders/{id}/children", get(handlers::list_child_folders))
        .route("/folders/{id}/tree", get(handlers::get_folder_subtree))
        .route("/folders/{id}/features", post(handlers::add_feature_to_folder))
        .route(
            "/folders/{id}/features/{feature_id}",
            put(handlers::move_feature_to_folder),
        )
        // Features
        .route("/features", get(handlers::list_features).post(handlers::create_feature))
        .route("/features/search", get(handlers::search_features))
        .route("/features/folder/{folder_id}", get(handlers::list_features_by_folder))
        .route(
            "/features/{id}",
            get(handlers::get_feature)
                .put(handlers::update_feature)
                .delete(handlers::delete_feature),
        )
        // Content
        .nest("/template-prompts", content_routes(ContentKind::TemplatePrompt))
        .nest("/sequence-diagrams", content_routes(ContentKind::SequenceDiagram))
        .nest("/sql-queries", content_routes(ContentKind::SqlQuery))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(cors_origins)),
        )
        .with_state(db)
}

/// The same CRUD surface for each content kind; handlers read the kind from
/// the request extensions.
fn content_routes(kind: ContentKind) -> Router<Database> {
    Router::new()
        .route("/", get(handlers::list_content).post(handlers::create_content))
        .route("/search", get(handlers::search_content))
        .route(
            "/{id}",
            get(handlers::get_content)
                .put(handlers::update_content)
                .delete(handlers::delete_content),
        )
        .layer(Extension(kind))
}

fn cors_layer(origins: Option<&[String]>) -> CorsLayer {
    let Some(origins) = origins else {
        return CorsLayer::permissive();
    };

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .map(|origin| origin.trim())
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}
