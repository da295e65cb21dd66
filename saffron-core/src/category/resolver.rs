//! Category ids to the full set of descendant ids and names.

use std::collections::HashSet;

use crate::error::StoreError;
use crate::store::CategoryStore;
use crate::types::CategoryId;

/// `parent_id` followed by every category beneath it.
///
/// How many round trips this costs depends on the store: the default
/// `subtree_ids` is one query per node, the PostgreSQL store and the cached
/// index answer in one. Store errors propagate unchanged.
pub async fn get_descendant_category_ids(
    parent_id: CategoryId,
    store: &dyn CategoryStore,
) -> Result<Vec<CategoryId>, StoreError> {
    store.subtree_ids(parent_id).await
}

/// Union of the subtrees of every id in `parent_ids`, without duplicates.
///
/// Ids come back in first-seen order, though callers should treat the result
/// as a set.
pub async fn get_descendant_category_ids_for_multiple(
    parent_ids: &[CategoryId],
    store: &dyn CategoryStore,
) -> Result<Vec<CategoryId>, StoreError> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for &parent_id in parent_ids {
        // A root already covered by an earlier subtree adds nothing
        if seen.contains(&parent_id) {
            continue;
        }
        for id in get_descendant_category_ids(parent_id, store).await? {
            if seen.insert(id) {
                out.push(id);
            }
        }
    }

    Ok(out)
}

/// Expand category ids to their subtrees and map the result to names.
pub async fn resolve_category_names(
    ids: &[CategoryId],
    store: &dyn CategoryStore,
) -> Result<Vec<String>, StoreError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let expanded = get_descendant_category_ids_for_multiple(ids, store).await?;
    tracing::debug!(
        requested = ids.len(),
        expanded = expanded.len(),
        "expanded category filter"
    );

    store.category_names(&expanded).await
}
