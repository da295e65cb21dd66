//! PostgreSQL implementation of the core store traits.
//!
//! Diesel is synchronous, so every call checks out a pooled connection and
//! runs inside a `db.query` span on the request's own task. That keeps the
//! per-request query counter in `telemetry` accurate.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::Integer;
use saffron_core::search::lowercase_all;
use saffron_core::{
    sort_names, total_time, Category, CategoryId, CategoryStore, CuisineId, CuisineStore, Difficulty,
    RecipeFilter, RecipePage, RecipeStatus, RecipeStore, RecipeSummary, SortMode, StoreError,
};
use uuid::Uuid;

use crate::db::DbPool;
use crate::models::{CategoryRow, RecipeSearchRow};
use crate::raw_sql;
use crate::schema::{categories, cuisines, recipe_categories, recipe_tags, recipes, tags};
use crate::{cuisine_name_in, linked_name_in};

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

#[derive(QueryableByName)]
struct IdRow {
    #[diesel(sql_type = Integer)]
    id: i32,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn with_conn<T>(
        &self,
        op: &'static str,
        f: impl FnOnce(&mut PgConnection) -> QueryResult<T>,
    ) -> Result<T, StoreError> {
        let _span = tracing::info_span!("db.query", op).entered();
        let mut conn = self
            .pool
            .get()
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        f(&mut conn).map_err(|e| StoreError::Query(e.to_string()))
    }
}

/// Keep `ids` order, drop ids with no row.
fn names_in_order(ids: &[i32], rows: Vec<(i32, String)>) -> Vec<String> {
    let mut by_id: HashMap<i32, String> = rows.into_iter().collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

/// Escape LIKE metacharacters so user text matches literally.
fn like_pattern(text: &str) -> String {
    format!(
        "%{}%",
        text.replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_")
    )
}

/// Names per recipe, each list in [`sort_names`] order.
fn group_names(pairs: Vec<(Uuid, String)>) -> HashMap<Uuid, Vec<String>> {
    let mut grouped: HashMap<Uuid, Vec<String>> = HashMap::new();
    for (recipe_id, name) in pairs {
        grouped.entry(recipe_id).or_default().push(name);
    }
    grouped
        .into_iter()
        .map(|(recipe_id, names)| (recipe_id, sort_names(names)))
        .collect()
}

/// Published recipes passing every constraint in `filter`, unordered.
fn filtered(filter: &RecipeFilter) -> recipes::BoxedQuery<'static, Pg> {
    let mut query = recipes::table
        .filter(recipes::status.eq(RecipeStatus::Published.as_str()))
        .into_boxed();

    if let Some(difficulty) = filter.difficulty {
        query = query.filter(recipes::difficulty.eq(difficulty.as_str()));
    }

    let text = filter.trimmed_query();
    if !text.is_empty() {
        let pattern = like_pattern(text);
        query = query.filter(
            recipes::title
                .ilike(pattern.clone())
                .or(recipes::description.ilike(pattern)),
        );
    }

    if !filter.categories.is_empty() {
        query = query.filter(linked_name_in!(
            "EXISTS",
            "recipe_categories",
            "category_id",
            "categories",
            lowercase_all(&filter.categories)
        ));
    }

    if !filter.tags.is_empty() {
        query = query.filter(linked_name_in!(
            "EXISTS",
            "recipe_tags",
            "tag_id",
            "tags",
            lowercase_all(&filter.tags)
        ));
    }

    if !filter.cuisines.is_empty() {
        query = query.filter(cuisine_name_in!(lowercase_all(&filter.cuisines)));
    }

    if !filter.allergens.is_empty() {
        query = query.filter(linked_name_in!(
            "NOT EXISTS",
            "recipe_allergens",
            "allergen_id",
            "allergens",
            lowercase_all(&filter.allergens)
        ));
    }

    query
}

fn ordered(
    query: recipes::BoxedQuery<'static, Pg>,
    sort: SortMode,
) -> recipes::BoxedQuery<'static, Pg> {
    let query = match sort {
        SortMode::Newest => query.order(recipes::created_at.desc()),
        SortMode::Oldest => query.order(recipes::created_at.asc()),
        SortMode::Popular => query
            .order(raw_sql::order_review_count_desc())
            .then_order_by(recipes::created_at.desc()),
        SortMode::Rating => query
            .order(raw_sql::order_average_rating_desc())
            .then_order_by(raw_sql::order_review_count_desc())
            .then_order_by(recipes::created_at.desc()),
        SortMode::Quickest => query
            .order(raw_sql::order_total_time_asc())
            .then_order_by(recipes::created_at.desc()),
    };
    query.then_order_by(recipes::id.asc())
}

fn to_summary(
    row: RecipeSearchRow,
    tags: &mut HashMap<Uuid, Vec<String>>,
    categories: &mut HashMap<Uuid, Vec<String>>,
) -> Result<RecipeSummary, StoreError> {
    let difficulty = Difficulty::parse(&row.difficulty).ok_or_else(|| {
        StoreError::Query(format!(
            "recipe {} has unknown difficulty {:?}",
            row.id, row.difficulty
        ))
    })?;

    Ok(RecipeSummary {
        id: row.id,
        title: row.title,
        description: row.description,
        difficulty,
        prep_time_minutes: row.prep_time_minutes,
        cook_time_minutes: row.cook_time_minutes,
        total_time_minutes: total_time(row.prep_time_minutes, row.cook_time_minutes),
        servings: row.servings,
        cuisine: row.cuisine,
        tags: tags.remove(&row.id).unwrap_or_default(),
        categories: categories.remove(&row.id).unwrap_or_default(),
        average_rating: row.average_rating,
        review_count: row.review_count,
        primary_image_url: row.primary_image_url,
        created_at: row.created_at,
    })
}

#[async_trait]
impl CategoryStore for PgStore {
    async fn all_categories(&self) -> Result<Vec<Category>, StoreError> {
        let rows = self.with_conn("all_categories", |conn| {
            categories::table
                .order(categories::id.asc())
                .select(CategoryRow::as_select())
                .load(conn)
        })?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn child_ids(&self, parent_id: CategoryId) -> Result<Vec<CategoryId>, StoreError> {
        self.with_conn("child_ids", |conn| {
            categories::table
                .filter(categories::parent_id.eq(parent_id))
                .order(categories::id.asc())
                .select(categories::id)
                .load(conn)
        })
    }

    async fn subtree_ids(&self, root: CategoryId) -> Result<Vec<CategoryId>, StoreError> {
        let rows: Vec<IdRow> = self.with_conn("subtree_ids", |conn| {
            diesel::sql_query(raw_sql::CATEGORY_SUBTREE_QUERY)
                .bind::<Integer, _>(root)
                .load(conn)
        })?;
        Ok(rows.into_iter().map(|r| r.id).collect())
    }

    async fn category_names(&self, ids: &[CategoryId]) -> Result<Vec<String>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = self.with_conn("category_names", |conn| {
            categories::table
                .filter(categories::id.eq_any(ids.to_vec()))
                .select((categories::id, categories::name))
                .load::<(i32, String)>(conn)
        })?;
        Ok(names_in_order(ids, rows))
    }
}

#[async_trait]
impl CuisineStore for PgStore {
    async fn cuisine_names(&self, ids: &[CuisineId]) -> Result<Vec<String>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = self.with_conn("cuisine_names", |conn| {
            cuisines::table
                .filter(cuisines::id.eq_any(ids.to_vec()))
                .select((cuisines::id, cuisines::name))
                .load::<(i32, String)>(conn)
        })?;
        Ok(names_in_order(ids, rows))
    }
}

#[async_trait]
impl RecipeStore for PgStore {
    async fn find_recipes(
        &self,
        filter: &RecipeFilter,
        limit: i64,
        offset: i64,
    ) -> Result<RecipePage, StoreError> {
        // COUNT(*) OVER() computes the total count across all matching rows
        let rows: Vec<RecipeSearchRow> = self.with_conn("find_recipes", |conn| {
            ordered(filtered(filter), filter.sort)
                .select((
                    recipes::id,
                    recipes::title,
                    recipes::description,
                    recipes::prep_time_minutes,
                    recipes::cook_time_minutes,
                    recipes::servings,
                    recipes::difficulty,
                    recipes::created_at,
                    raw_sql::cuisine_name(),
                    raw_sql::average_rating(),
                    raw_sql::review_count(),
                    raw_sql::primary_image_url(),
                    raw_sql::count_over(),
                ))
                .limit(limit)
                .offset(offset)
                .load(conn)
        })?;

        let total_count = match rows.first() {
            Some(row) => row.total_count,
            // Past the last page the window function has no row to ride on
            None if offset > 0 => self.with_conn("count_recipes", |conn| {
                filtered(filter).count().get_result::<i64>(conn)
            })?,
            None => 0,
        };

        if rows.is_empty() {
            return Ok(RecipePage {
                recipes: Vec::new(),
                total_count,
            });
        }

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let tag_pairs = self.with_conn("recipe_tags", |conn| {
            recipe_tags::table
                .inner_join(tags::table)
                .filter(recipe_tags::recipe_id.eq_any(ids.clone()))
                .select((recipe_tags::recipe_id, tags::name))
                .load::<(Uuid, String)>(conn)
        })?;

        let category_pairs = self.with_conn("recipe_categories", |conn| {
            recipe_categories::table
                .inner_join(categories::table)
                .filter(recipe_categories::recipe_id.eq_any(ids.clone()))
                .select((recipe_categories::recipe_id, categories::name))
                .load::<(Uuid, String)>(conn)
        })?;

        let mut tags = group_names(tag_pairs);
        let mut categories = group_names(category_pairs);

        let recipes = rows
            .into_iter()
            .map(|row| to_summary(row, &mut tags, &mut categories))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RecipePage {
            recipes,
            total_count,
        })
    }
}
