//! Flat category rows to a nested forest.

use std::collections::{HashMap, HashSet};

use crate::types::{Category, CategoryId, CategoryNode};

/// Deepest level kept in a built tree. Roots are level 1.
pub const MAX_CATEGORY_DEPTH: usize = 64;

/// Build the category forest from a flat list.
///
/// Roots and siblings keep the relative order of the input. A category whose
/// parent is missing from the input is promoted to a root. Categories caught
/// in a parent cycle can't be reached from any root and are left out, and so
/// is anything below [`MAX_CATEGORY_DEPTH`]. Each case is logged.
pub fn build_category_tree(categories: &[Category]) -> Vec<CategoryNode> {
    // Pass 1: index every category by id (first occurrence wins)
    let mut index: HashMap<CategoryId, usize> = HashMap::with_capacity(categories.len());
    for (i, category) in categories.iter().enumerate() {
        if index.contains_key(&category.id) {
            tracing::warn!(id = category.id, "duplicate category id, keeping first");
            continue;
        }
        index.insert(category.id, i);
    }

    // Pass 2: link each category to its parent
    let mut roots: Vec<usize> = Vec::new();
    let mut children: HashMap<CategoryId, Vec<usize>> = HashMap::new();
    for (i, category) in categories.iter().enumerate() {
        if index.get(&category.id) != Some(&i) {
            continue;
        }
        match category.parent_id {
            None => roots.push(i),
            Some(parent) if index.contains_key(&parent) => {
                children.entry(parent).or_default().push(i);
            }
            Some(parent) => {
                tracing::warn!(
                    id = category.id,
                    parent_id = parent,
                    "category parent not found, promoting to root"
                );
                roots.push(i);
            }
        }
    }

    // Pass 3: preorder walk from the roots as (row, parent row) pairs
    let mut order: Vec<(usize, Option<usize>)> = Vec::with_capacity(index.len());
    let mut placed: HashSet<CategoryId> = HashSet::with_capacity(index.len());
    let mut too_deep: Vec<CategoryId> = Vec::new();
    let mut stack: Vec<(usize, Option<usize>, usize)> =
        roots.iter().rev().map(|&i| (i, None, 1)).collect();
    while let Some((i, parent, depth)) = stack.pop() {
        let id = categories[i].id;
        placed.insert(id);
        order.push((i, parent));

        let Some(kids) = children.get(&id) else {
            continue;
        };
        if depth < MAX_CATEGORY_DEPTH {
            stack.extend(kids.iter().rev().map(|&k| (k, Some(i), depth + 1)));
            continue;
        }

        let mut pending = kids.clone();
        while let Some(k) = pending.pop() {
            let kid = categories[k].id;
            if placed.insert(kid) {
                too_deep.push(kid);
                if let Some(more) = children.get(&kid) {
                    pending.extend(more);
                }
            }
        }
    }

    if !too_deep.is_empty() {
        too_deep.sort_unstable();
        tracing::warn!(
            max_depth = MAX_CATEGORY_DEPTH,
            ids = ?too_deep,
            "categories nested too deep left out of tree"
        );
    }

    if placed.len() < index.len() {
        let mut unreachable: Vec<CategoryId> = index
            .keys()
            .copied()
            .filter(|id| !placed.contains(id))
            .collect();
        unreachable.sort_unstable();
        tracing::warn!(ids = ?unreachable, "categories in a parent cycle left out of tree");
    }

    // Pass 4: assemble bottom-up. In reverse preorder every node comes after
    // its descendants and siblings arrive last to first.
    let mut built: HashMap<usize, Vec<CategoryNode>> = HashMap::new();
    let mut tree: Vec<CategoryNode> = Vec::with_capacity(roots.len());
    for &(i, parent) in order.iter().rev() {
        let category = &categories[i];
        let mut kids = built.remove(&i).unwrap_or_default();
        kids.reverse();

        let node = CategoryNode {
            id: category.id,
            name: category.name.clone(),
            parent_id: category.parent_id,
            children: kids,
        };
        match parent {
            Some(p) => built.entry(p).or_default().push(node),
            None => tree.push(node),
        }
    }
    tree.reverse();

    tree
}

/// Every id in the forest, depth first.
pub fn flatten_ids(nodes: &[CategoryNode]) -> Vec<CategoryId> {
    let mut out = Vec::new();
    let mut stack: Vec<&CategoryNode> = nodes.iter().rev().collect();
    while let Some(node) = stack.pop() {
        out.push(node.id);
        stack.extend(node.children.iter().rev());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desserts() -> Vec<Category> {
        vec![
            Category::new(1, "Desserts", None),
            Category::new(2, "Cakes", Some(1)),
            Category::new(3, "Cookies", Some(1)),
            Category::new(4, "Mains", None),
            Category::new(5, "Chocolate Cakes", Some(2)),
        ]
    }

    #[test]
    fn test_builds_nested_forest() {
        let tree = build_category_tree(&desserts());
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].name, "Desserts");
        assert_eq!(tree[1].name, "Mains");

        let kids: Vec<&str> = tree[0].children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(kids, vec!["Cakes", "Cookies"]);
        assert_eq!(tree[0].children[0].children[0].id, 5);
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn test_every_id_appears_once() {
        let input = desserts();
        let tree = build_category_tree(&input);
        let mut ids = flatten_ids(&tree);
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_child_listed_before_parent() {
        let input = vec![
            Category::new(2, "Cakes", Some(1)),
            Category::new(1, "Desserts", None),
        ];
        let tree = build_category_tree(&input);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].children[0].id, 2);
    }

    #[test]
    fn test_dangling_parent_promoted_to_root() {
        let input = vec![
            Category::new(1, "Desserts", None),
            Category::new(7, "Orphan", Some(99)),
            Category::new(2, "Cakes", Some(1)),
        ];
        let tree = build_category_tree(&input);
        let roots: Vec<i32> = tree.iter().map(|n| n.id).collect();
        assert_eq!(roots, vec![1, 7]);
        assert_eq!(tree[1].parent_id, Some(99));
    }

    #[test]
    fn test_cycle_left_out() {
        let input = vec![
            Category::new(1, "Root", None),
            Category::new(2, "A", Some(3)),
            Category::new(3, "B", Some(2)),
            Category::new(4, "Self", Some(4)),
        ];
        let tree = build_category_tree(&input);
        assert_eq!(flatten_ids(&tree), vec![1]);
    }

    fn chain(len: i32) -> Vec<Category> {
        (1..=len)
            .map(|id| Category::new(id, "Level", (id > 1).then(|| id - 1)))
            .collect()
    }

    #[test]
    fn test_deep_chain_cut_at_max_depth() {
        let tree = build_category_tree(&chain(100_000));
        let ids = flatten_ids(&tree);
        assert_eq!(ids.len(), MAX_CATEGORY_DEPTH);
        assert_eq!(ids.last(), Some(&(MAX_CATEGORY_DEPTH as i32)));
    }

    #[test]
    fn test_chain_at_max_depth_kept_whole() {
        let tree = build_category_tree(&chain(MAX_CATEGORY_DEPTH as i32));
        assert_eq!(flatten_ids(&tree).len(), MAX_CATEGORY_DEPTH);
    }

    #[test]
    fn test_siblings_keep_order_across_levels() {
        let input = vec![
            Category::new(1, "Desserts", None),
            Category::new(2, "Cakes", Some(1)),
            Category::new(3, "Cookies", Some(1)),
            Category::new(4, "Sponge", Some(2)),
            Category::new(5, "Cheesecake", Some(2)),
            Category::new(6, "Mains", None),
        ];
        let tree = build_category_tree(&input);
        assert_eq!(flatten_ids(&tree), vec![1, 2, 4, 5, 3, 6]);
    }

    #[test]
    fn test_empty_input() {
        assert!(build_category_tree(&[]).is_empty());
    }
}
