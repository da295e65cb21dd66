//! Recipe search: filter, rank and paginate.

mod filter;
mod paginate;
mod params;

pub use filter::{lowercase_all, RecipeFilter, SortMode};
pub use paginate::{offset, total_pages, Pagination, DEFAULT_PER_PAGE, MAX_PER_PAGE};
pub use params::{parse_id_list, parse_name_list, resolve_cuisine_names, resolve_filter, SearchInput};

use serde::Serialize;

use crate::error::StoreError;
use crate::store::RecipeStore;
use crate::types::RecipeSummary;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub recipes: Vec<RecipeSummary>,
    pub pagination: Pagination,
}

/// Run a filter against the recipe store and return one page.
///
/// Page and page size are clamped (see [`RecipeFilter::page`] and
/// [`RecipeFilter::per_page`]). A page past the end yields no recipes but
/// still reports the true totals.
pub async fn search_recipes(
    store: &dyn RecipeStore,
    filter: &RecipeFilter,
) -> Result<SearchResult, StoreError> {
    let page = filter.page();
    let per_page = filter.per_page();

    let found = store
        .find_recipes(filter, per_page, offset(page, per_page))
        .await?;

    tracing::debug!(
        page,
        per_page,
        total_count = found.total_count,
        returned = found.recipes.len(),
        sort = filter.sort.as_str(),
        "recipe search"
    );

    Ok(SearchResult {
        recipes: found.recipes,
        pagination: Pagination::new(page, per_page, found.total_count),
    })
}
