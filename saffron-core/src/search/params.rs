//! Raw query-string values to a resolved [`RecipeFilter`].

use crate::category::resolve_category_names;
use crate::error::StoreError;
use crate::store::{CategoryStore, CuisineStore};
use crate::types::{CuisineId, Difficulty};

use super::filter::{RecipeFilter, SortMode};

/// Search parameters as they arrive from a request, before any defaulting.
///
/// `categories` and `cuisines` are comma-separated ids; `tags` and
/// `allergens` are comma-separated names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchInput {
    pub q: Option<String>,
    pub categories: Option<String>,
    pub tags: Option<String>,
    pub cuisines: Option<String>,
    pub allergens: Option<String>,
    pub difficulty: Option<String>,
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Parse `"1, 2,,x,3"` into `[1, 2, 3]`. Blank and non-numeric entries are skipped.
pub fn parse_id_list(raw: &str) -> Vec<i32> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse() {
            Ok(id) => Some(id),
            Err(_) => {
                tracing::debug!(value = s, "ignoring non-numeric id");
                None
            }
        })
        .collect()
}

/// Drop NUL characters. PostgreSQL text can't hold them, so they are
/// removed before any store sees the value.
fn strip_nul(raw: &str) -> String {
    raw.replace('\0', "")
}

/// Parse `"vegan, ,gluten free"` into `["vegan", "gluten free"]`.
pub fn parse_name_list(raw: &str) -> Vec<String> {
    strip_nul(raw)
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub async fn resolve_cuisine_names(
    ids: &[CuisineId],
    store: &dyn CuisineStore,
) -> Result<Vec<String>, StoreError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    store.cuisine_names(ids).await
}

/// Default the raw input and resolve category and cuisine ids to names.
///
/// Missing values are defaulted, never rejected. If ids were supplied but
/// none of them resolve, the filter keeps a constraint that matches nothing
/// rather than silently widening to every recipe.
pub async fn resolve_filter(
    input: &SearchInput,
    default_per_page: i64,
    categories: &dyn CategoryStore,
    cuisines: &dyn CuisineStore,
) -> Result<RecipeFilter, StoreError> {
    let category_ids = input.categories.as_deref().map(parse_id_list).unwrap_or_default();
    let cuisine_ids = input.cuisines.as_deref().map(parse_id_list).unwrap_or_default();

    let mut category_names = resolve_category_names(&category_ids, categories).await?;
    if !category_ids.is_empty() && category_names.is_empty() {
        category_names.push(String::new());
    }

    let mut cuisine_names = resolve_cuisine_names(&cuisine_ids, cuisines).await?;
    if !cuisine_ids.is_empty() && cuisine_names.is_empty() {
        cuisine_names.push(String::new());
    }

    let difficulty = input.difficulty.as_deref().and_then(|raw| {
        let parsed = Difficulty::parse(raw);
        if parsed.is_none() && !raw.trim().is_empty() {
            tracing::debug!(value = raw, "ignoring unknown difficulty");
        }
        parsed
    });

    Ok(RecipeFilter {
        query: strip_nul(input.q.as_deref().unwrap_or_default())
            .trim()
            .to_string(),
        categories: category_names,
        tags: input.tags.as_deref().map(parse_name_list).unwrap_or_default(),
        cuisines: cuisine_names,
        allergens: input
            .allergens
            .as_deref()
            .map(parse_name_list)
            .unwrap_or_default(),
        difficulty,
        sort: input.sort.as_deref().map(SortMode::parse).unwrap_or_default(),
        page: input.page.unwrap_or(1),
        per_page: input.per_page.unwrap_or(default_per_page),
    })
}
