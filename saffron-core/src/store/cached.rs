//! Caching wrapper for category stores.
//!
//! Loads the whole category table once into a [`CategoryIndex`] and answers
//! subtree and name lookups from memory until [`CachedCategoryStore::invalidate`]
//! is called.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::CategoryStore;
use crate::category::CategoryIndex;
use crate::error::StoreError;
use crate::types::{Category, CategoryId};

#[derive(Debug)]
pub struct CachedCategoryStore<S> {
    inner: S,
    index: RwLock<Option<Arc<CategoryIndex>>>,
    /// Bumped on every invalidation so an in-flight load can't store a stale index
    generation: AtomicU64,
}

impl<S: CategoryStore> CachedCategoryStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            index: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Drop the cached index. Call after any category insert, update or delete.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.index.write().unwrap_or_else(|e| e.into_inner()) = None;
        tracing::debug!("category index invalidated");
    }

    pub fn is_loaded(&self) -> bool {
        self.cached().is_some()
    }

    fn cached(&self) -> Option<Arc<CategoryIndex>> {
        self.index
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(Arc::clone)
    }

    fn store(&self, index: &Arc<CategoryIndex>, generation: u64) {
        let mut guard = self.index.write().unwrap_or_else(|e| e.into_inner());
        if self.generation.load(Ordering::SeqCst) == generation {
            *guard = Some(Arc::clone(index));
        }
    }

    /// The current index, loading it from the inner store on a miss.
    pub async fn index(&self) -> Result<Arc<CategoryIndex>, StoreError> {
        if let Some(index) = self.cached() {
            return Ok(index);
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let categories = self.inner.all_categories().await?;
        let index = Arc::new(CategoryIndex::new(categories));
        tracing::debug!(categories = index.len(), "category index loaded");

        self.store(&index, generation);
        Ok(index)
    }
}

#[async_trait]
impl<S: CategoryStore> CategoryStore for CachedCategoryStore<S> {
    async fn all_categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.index().await?.categories().to_vec())
    }

    async fn child_ids(&self, parent_id: CategoryId) -> Result<Vec<CategoryId>, StoreError> {
        Ok(self.index().await?.children(parent_id).to_vec())
    }

    async fn subtree_ids(&self, root: CategoryId) -> Result<Vec<CategoryId>, StoreError> {
        Ok(self.index().await?.subtree(root))
    }

    async fn category_names(&self, ids: &[CategoryId]) -> Result<Vec<String>, StoreError> {
        let index = self.index().await?;
        Ok(ids
            .iter()
            .filter_map(|id| index.name(*id))
            .map(str::to_string)
            .collect())
    }

    fn invalidate(&self) {
        CachedCategoryStore::invalidate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn cached() -> CachedCategoryStore<MemoryStore> {
        CachedCategoryStore::new(MemoryStore::new().with_categories(vec![
            Category::new(1, "Desserts", None),
            Category::new(2, "Cakes", Some(1)),
            Category::new(3, "Cookies", Some(1)),
            Category::new(4, "Sponge", Some(2)),
        ]))
    }

    #[tokio::test]
    async fn test_loads_once() {
        let store = cached();
        assert!(!store.is_loaded());

        assert_eq!(store.subtree_ids(1).await.unwrap(), vec![1, 2, 4, 3]);
        assert_eq!(store.subtree_ids(2).await.unwrap(), vec![2, 4]);
        assert_eq!(
            store.category_names(&[4, 1]).await.unwrap(),
            vec!["Sponge", "Desserts"]
        );

        assert!(store.is_loaded());
        assert_eq!(store.inner().all_categories_calls(), 1);
        assert_eq!(store.inner().child_ids_calls(), 0);
    }

    #[tokio::test]
    async fn test_invalidate_reloads() {
        let store = cached();
        store.child_ids(1).await.unwrap();
        store.invalidate();
        assert!(!store.is_loaded());
        store.child_ids(1).await.unwrap();
        assert_eq!(store.inner().all_categories_calls(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_through_trait_object() {
        let store = cached();
        store.child_ids(1).await.unwrap();
        let dynamic: &dyn CategoryStore = &store;
        dynamic.invalidate();
        assert!(!store.is_loaded());
    }

    #[tokio::test]
    async fn test_load_error_propagates_and_is_not_cached() {
        let store = CachedCategoryStore::new(MemoryStore::new().failing());
        assert!(store.subtree_ids(1).await.is_err());
        assert!(!store.is_loaded());
    }
}
