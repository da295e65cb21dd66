use crate::AppState;
use axum::{extract::State, http::StatusCode};

#[utoipa::path(
    post,
    path = "/api/categories/refresh",
    tag = "categories",
    responses(
        (status = 204, description = "Cached category data dropped; the next lookup reloads it")
    )
)]
pub async fn refresh_categories(State(ctx): State<AppState>) -> StatusCode {
    ctx.categories.invalidate();
    tracing::info!("category cache refreshed");
    StatusCode::NO_CONTENT
}
