pub mod search;

use crate::AppState;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/recipes endpoints (mounted at /api/recipes)
pub fn router() -> Router<AppState> {
    Router::new().route("/search", get(search::search_recipes))
}

#[derive(OpenApi)]
#[openapi(
    paths(search::search_recipes),
    components(schemas(
        search::SearchRecipesResponse,
        search::RecipeSummaryResponse,
        search::PaginationMetadata,
    ))
)]
pub struct ApiDoc;
