//! In-memory store for tests and local fixtures.
//!
//! Filtering and ordering follow [`RecipeFilter::matches`] and
//! [`SortMode::compare`](crate::search::SortMode::compare), the same rules the
//! SQL store expresses in its queries.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{CategoryStore, CuisineStore, RecipePage, RecipeStore};
use crate::error::StoreError;
use crate::search::RecipeFilter;
use crate::types::{Category, CategoryId, Cuisine, CuisineId, RecipeRecord};

/// A store backed by plain vectors.
///
/// Category subtrees use the default per-node walk, so the call counters show
/// exactly how many round trips a real store would have made.
#[derive(Debug, Default)]
pub struct MemoryStore {
    categories: Vec<Category>,
    cuisines: Vec<Cuisine>,
    recipes: Vec<RecipeRecord>,
    /// Fail every call with a query error
    failing: bool,
    all_categories_calls: AtomicUsize,
    child_ids_calls: AtomicUsize,
    find_recipes_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_cuisines(mut self, cuisines: Vec<Cuisine>) -> Self {
        self.cuisines = cuisines;
        self
    }

    pub fn with_recipes(mut self, recipes: Vec<RecipeRecord>) -> Self {
        self.recipes = recipes;
        self
    }

    /// Make every subsequent call return an error.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn all_categories_calls(&self) -> usize {
        self.all_categories_calls.load(Ordering::Relaxed)
    }

    pub fn child_ids_calls(&self) -> usize {
        self.child_ids_calls.load(Ordering::Relaxed)
    }

    pub fn find_recipes_calls(&self) -> usize {
        self.find_recipes_calls.load(Ordering::Relaxed)
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing {
            return Err(StoreError::Query("memory store set to fail".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn all_categories(&self) -> Result<Vec<Category>, StoreError> {
        self.all_categories_calls.fetch_add(1, Ordering::Relaxed);
        self.check()?;
        Ok(self.categories.clone())
    }

    async fn child_ids(&self, parent_id: CategoryId) -> Result<Vec<CategoryId>, StoreError> {
        self.child_ids_calls.fetch_add(1, Ordering::Relaxed);
        self.check()?;
        Ok(self
            .categories
            .iter()
            .filter(|c| c.parent_id == Some(parent_id))
            .map(|c| c.id)
            .collect())
    }

    async fn category_names(&self, ids: &[CategoryId]) -> Result<Vec<String>, StoreError> {
        self.check()?;
        Ok(ids
            .iter()
            .filter_map(|id| self.categories.iter().find(|c| c.id == *id))
            .map(|c| c.name.clone())
            .collect())
    }
}

#[async_trait]
impl CuisineStore for MemoryStore {
    async fn cuisine_names(&self, ids: &[CuisineId]) -> Result<Vec<String>, StoreError> {
        self.check()?;
        Ok(ids
            .iter()
            .filter_map(|id| self.cuisines.iter().find(|c| c.id == *id))
            .map(|c| c.name.clone())
            .collect())
    }
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn find_recipes(
        &self,
        filter: &RecipeFilter,
        limit: i64,
        offset: i64,
    ) -> Result<RecipePage, StoreError> {
        self.find_recipes_calls.fetch_add(1, Ordering::Relaxed);
        self.check()?;

        let mut matching: Vec<&RecipeRecord> =
            self.recipes.iter().filter(|r| filter.matches(r)).collect();
        matching.sort_by(|a, b| filter.sort.compare(a, b));

        let total_count = matching.len() as i64;
        let recipes = matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(RecipeRecord::to_summary)
            .collect();

        Ok(RecipePage {
            recipes,
            total_count,
        })
    }
}
