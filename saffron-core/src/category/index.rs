//! In-memory adjacency index over the category table.

use std::collections::{HashMap, HashSet};

use crate::types::{Category, CategoryId};

/// Parent to children adjacency, built once from the full category list.
#[derive(Debug, Clone, Default)]
pub struct CategoryIndex {
    categories: Vec<Category>,
    names: HashMap<CategoryId, String>,
    children: HashMap<CategoryId, Vec<CategoryId>>,
}

impl CategoryIndex {
    pub fn new(categories: Vec<Category>) -> Self {
        let mut names = HashMap::with_capacity(categories.len());
        let mut children: HashMap<CategoryId, Vec<CategoryId>> = HashMap::new();

        for category in &categories {
            names
                .entry(category.id)
                .or_insert_with(|| category.name.clone());
            if let Some(parent) = category.parent_id {
                children.entry(parent).or_default().push(category.id);
            }
        }

        Self {
            categories,
            names,
            children,
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, id: CategoryId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn children(&self, id: CategoryId) -> &[CategoryId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `root` followed by all its descendants, preorder. Cycles are cut at the
    /// first revisit.
    pub fn subtree(&self, root: CategoryId) -> Vec<CategoryId> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![root];

        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            out.push(id);
            stack.extend(self.children(id).iter().rev());
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> CategoryIndex {
        CategoryIndex::new(vec![
            Category::new(1, "Desserts", None),
            Category::new(2, "Cakes", Some(1)),
            Category::new(3, "Cookies", Some(1)),
            Category::new(4, "Sponge", Some(2)),
            Category::new(5, "Mains", None),
        ])
    }

    #[test]
    fn test_subtree_preorder() {
        assert_eq!(index().subtree(1), vec![1, 2, 4, 3]);
        assert_eq!(index().subtree(5), vec![5]);
    }

    #[test]
    fn test_subtree_of_unknown_id_is_just_the_id() {
        assert_eq!(index().subtree(99), vec![99]);
    }

    #[test]
    fn test_subtree_survives_cycle() {
        let index = CategoryIndex::new(vec![
            Category::new(1, "A", Some(2)),
            Category::new(2, "B", Some(1)),
        ]);
        assert_eq!(index.subtree(1), vec![1, 2]);
    }

    #[test]
    fn test_names() {
        let index = index();
        assert_eq!(index.name(3), Some("Cookies"));
        assert_eq!(index.name(42), None);
        assert_eq!(index.len(), 5);
    }
}
