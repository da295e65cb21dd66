use crate::api::ErrorResponse;
use crate::error::ApiError;
use crate::AppState;
use axum::{extract::State, Json};
use saffron_core::{build_category_tree, CategoryNode};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNodeResponse {
    pub id: i32,
    pub name: String,
    pub parent_id: Option<i32>,
    #[schema(no_recursion)]
    pub children: Vec<CategoryNodeResponse>,
}

impl From<CategoryNode> for CategoryNodeResponse {
    fn from(node: CategoryNode) -> Self {
        Self {
            id: node.id,
            name: node.name,
            parent_id: node.parent_id,
            children: node.children.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryTreeResponse {
    /// Root categories, each with its children nested
    pub categories: Vec<CategoryNodeResponse>,
}

#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "categories",
    responses(
        (status = 200, description = "The category forest", body = CategoryTreeResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    )
)]
pub async fn get_category_tree(
    State(ctx): State<AppState>,
) -> Result<Json<CategoryTreeResponse>, ApiError> {
    let categories = ctx.categories.all_categories().await?;
    let tree = build_category_tree(&categories);

    Ok(Json(CategoryTreeResponse {
        categories: tree.into_iter().map(Into::into).collect(),
    }))
}
