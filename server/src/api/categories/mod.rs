pub mod descendants;
pub mod refresh;
pub mod tree;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/categories endpoints (mounted at /api/categories)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tree::get_category_tree))
        .route("/descendants", get(descendants::get_descendants_for_many))
        .route("/{id}/descendants", get(descendants::get_descendants))
        .route("/refresh", post(refresh::refresh_categories))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        tree::get_category_tree,
        descendants::get_descendants,
        descendants::get_descendants_for_many,
        refresh::refresh_categories,
    ),
    components(schemas(
        tree::CategoryTreeResponse,
        tree::CategoryNodeResponse,
        descendants::DescendantsResponse,
    ))
)]
pub struct ApiDoc;
