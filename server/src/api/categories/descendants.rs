use crate::api::ErrorResponse;
use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use saffron_core::search::parse_id_list;
use saffron_core::{get_descendant_category_ids, get_descendant_category_ids_for_multiple};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DescendantsResponse {
    /// The requested ids followed by every category beneath them, without duplicates
    pub ids: Vec<i32>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DescendantsParams {
    /// Comma-separated category ids
    pub ids: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}/descendants",
    tag = "categories",
    params(
        ("id" = i32, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "The category and all of its descendants", body = DescendantsResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    )
)]
pub async fn get_descendants(
    State(ctx): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DescendantsResponse>, ApiError> {
    let store = ctx.categories.as_ref();

    if store.category_names(&[id]).await?.is_empty() {
        return Err(ApiError::NotFound(format!("Category {}", id)));
    }

    let ids = get_descendant_category_ids(id, store).await?;
    Ok(Json(DescendantsResponse { ids }))
}

#[utoipa::path(
    get,
    path = "/api/categories/descendants",
    tag = "categories",
    params(DescendantsParams),
    responses(
        (status = 200, description = "Union of the subtrees of every requested category", body = DescendantsResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    )
)]
pub async fn get_descendants_for_many(
    State(ctx): State<AppState>,
    Query(params): Query<DescendantsParams>,
) -> Result<Json<DescendantsResponse>, ApiError> {
    let roots = params.ids.as_deref().map(parse_id_list).unwrap_or_default();
    let ids = get_descendant_category_ids_for_multiple(&roots, ctx.categories.as_ref()).await?;
    Ok(Json(DescendantsResponse { ids }))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{catalog_store, get_json, state_with};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_descendants_of_root() {
        let (status, json) =
            get_json(state_with(catalog_store()), "/api/categories/1/descendants").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ids"], json!([1, 2, 3, 4]));
    }

    #[tokio::test]
    async fn test_descendants_of_leaf() {
        let (_, json) = get_json(state_with(catalog_store()), "/api/categories/6/descendants").await;
        assert_eq!(json["ids"], json!([6]));
    }

    #[tokio::test]
    async fn test_unknown_category_is_404() {
        let (status, json) =
            get_json(state_with(catalog_store()), "/api/categories/404/descendants").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Category 404 not found");
    }

    #[tokio::test]
    async fn test_descendants_for_many_dedupes() {
        let (status, json) = get_json(
            state_with(catalog_store()),
            "/api/categories/descendants?ids=2,1,5,x",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ids"], json!([2, 1, 3, 4, 5, 6]));
    }

    #[tokio::test]
    async fn test_descendants_for_many_without_ids() {
        let (_, json) = get_json(state_with(catalog_store()), "/api/categories/descendants").await;
        assert_eq!(json["ids"], json!([]));
    }
}
