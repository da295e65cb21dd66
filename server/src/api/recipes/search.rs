use crate::api::ErrorResponse;
use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use saffron_core::{resolve_filter, Pagination, RecipeSummary, SearchInput, SearchResult};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchRecipesParams {
    /// Case-insensitive text matched against title and description
    pub q: Option<String>,
    /// Comma-separated category ids. Each id also matches its descendants.
    pub categories: Option<String>,
    /// Comma-separated tag names; a recipe needs at least one
    pub tags: Option<String>,
    /// Comma-separated cuisine ids
    pub cuisines: Option<String>,
    /// Comma-separated allergen names; recipes containing any are excluded
    pub allergens: Option<String>,
    /// EASY, MEDIUM or HARD. Anything else is ignored.
    pub difficulty: Option<String>,
    /// newest (default), oldest, popular, rating or quickest
    pub sort: Option<String>,
    /// 1-indexed page (default: 1)
    pub page: Option<String>,
    /// Page size (default: 12, max: 100)
    pub per_page: Option<String>,
}

/// Non-numeric values are treated as absent rather than rejected.
fn lenient_int(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse().ok())
}

impl From<SearchRecipesParams> for SearchInput {
    fn from(params: SearchRecipesParams) -> Self {
        SearchInput {
            page: lenient_int(params.page.as_deref()),
            per_page: lenient_int(params.per_page.as_deref()),
            q: params.q,
            categories: params.categories,
            tags: params.tags,
            cuisines: params.cuisines,
            allergens: params.allergens,
            difficulty: params.difficulty,
            sort: params.sort,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMetadata {
    /// 1-indexed page that was returned
    pub page: i64,
    pub per_page: i64,
    /// Number of recipes matching the filter across all pages
    pub total_count: i64,
    pub total_pages: i64,
}

impl From<Pagination> for PaginationMetadata {
    fn from(p: Pagination) -> Self {
        Self {
            page: p.page,
            per_page: p.per_page,
            total_count: p.total_count,
            total_pages: p.total_pages,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSummaryResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// EASY, MEDIUM or HARD
    pub difficulty: String,
    pub prep_time_minutes: Option<i32>,
    pub cook_time_minutes: Option<i32>,
    /// Prep plus cook time; null only when both are unknown
    pub total_time_minutes: Option<i32>,
    pub servings: Option<i32>,
    pub cuisine: Option<String>,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    /// Null when the recipe has no reviews
    pub average_rating: Option<f64>,
    pub review_count: i64,
    pub primary_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<RecipeSummary> for RecipeSummaryResponse {
    fn from(r: RecipeSummary) -> Self {
        Self {
            id: r.id,
            title: r.title,
            description: r.description,
            difficulty: r.difficulty.as_str().to_string(),
            prep_time_minutes: r.prep_time_minutes,
            cook_time_minutes: r.cook_time_minutes,
            total_time_minutes: r.total_time_minutes,
            servings: r.servings,
            cuisine: r.cuisine,
            tags: r.tags,
            categories: r.categories,
            average_rating: r.average_rating,
            review_count: r.review_count,
            primary_image_url: r.primary_image_url,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SearchRecipesResponse {
    pub recipes: Vec<RecipeSummaryResponse>,
    pub pagination: PaginationMetadata,
}

impl From<SearchResult> for SearchRecipesResponse {
    fn from(result: SearchResult) -> Self {
        Self {
            recipes: result.recipes.into_iter().map(Into::into).collect(),
            pagination: result.pagination.into(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/recipes/search",
    tag = "recipes",
    params(SearchRecipesParams),
    responses(
        (status = 200, description = "One page of matching published recipes", body = SearchRecipesResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    )
)]
pub async fn search_recipes(
    State(ctx): State<AppState>,
    Query(params): Query<SearchRecipesParams>,
) -> Result<Json<SearchRecipesResponse>, ApiError> {
    let input = SearchInput::from(params);
    let filter = resolve_filter(
        &input,
        ctx.default_per_page,
        ctx.categories.as_ref(),
        ctx.cuisines.as_ref(),
    )
    .await?;

    let result = saffron_core::search_recipes(ctx.recipes.as_ref(), &filter).await?;
    Ok(Json(result.into()))
}
