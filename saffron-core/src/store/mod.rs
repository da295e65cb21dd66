//! Store seams for category and recipe data.
//!
//! The search layer never owns a connection. Callers pass a store handle
//! explicitly; the server hands in its PostgreSQL store, tests hand in
//! [`MemoryStore`].

mod cached;
mod memory;

pub use cached::CachedCategoryStore;
pub use memory::MemoryStore;

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::search::RecipeFilter;
use crate::types::{Category, CategoryId, CuisineId, RecipeSummary};

/// Read access to the category table.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Every category, in storage order.
    async fn all_categories(&self) -> Result<Vec<Category>, StoreError>;

    /// Direct children of `parent_id`.
    async fn child_ids(&self, parent_id: CategoryId) -> Result<Vec<CategoryId>, StoreError>;

    /// `root` plus all of its descendants.
    ///
    /// The default walks the tree with one `child_ids` call per node. Stores
    /// that can answer in a single round trip (recursive query, cached index)
    /// should override it.
    async fn subtree_ids(&self, root: CategoryId) -> Result<Vec<CategoryId>, StoreError> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![root];

        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            out.push(id);
            let children = self.child_ids(id).await?;
            stack.extend(children.into_iter().rev());
        }

        Ok(out)
    }

    /// Names for the given ids, in the order given. Unknown ids are skipped.
    async fn category_names(&self, ids: &[CategoryId]) -> Result<Vec<String>, StoreError>;

    /// Forget anything cached about the category table. No-op for stores
    /// that always read through.
    fn invalidate(&self) {}
}

/// Read access to the cuisine lookup table.
#[async_trait]
pub trait CuisineStore: Send + Sync {
    /// Names for the given ids, in the order given. Unknown ids are skipped.
    async fn cuisine_names(&self, ids: &[CuisineId]) -> Result<Vec<String>, StoreError>;
}

/// One window of matching recipes plus the size of the full match set.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipePage {
    pub recipes: Vec<RecipeSummary>,
    pub total_count: i64,
}

/// Executes a composite recipe filter.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Published recipes matching `filter`, ordered by `filter.sort`, skipping
    /// `offset` and returning at most `limit`.
    async fn find_recipes(
        &self,
        filter: &RecipeFilter,
        limit: i64,
        offset: i64,
    ) -> Result<RecipePage, StoreError>;
}
