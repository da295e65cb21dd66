//! Integrity checks for category data, for use before it is stored.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::types::{Category, CategoryId};

use super::tree::MAX_CATEGORY_DEPTH;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryIssue {
    DuplicateId { id: CategoryId },
    DanglingParent { id: CategoryId, parent_id: CategoryId },
    SelfParent { id: CategoryId },
    /// Ids in cycle order, starting from the smallest
    Cycle { ids: Vec<CategoryId> },
    /// First category below the deepest level a built tree keeps
    TooDeep { id: CategoryId },
}

impl fmt::Display for CategoryIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryIssue::DuplicateId { id } => write!(f, "category {} appears more than once", id),
            CategoryIssue::DanglingParent { id, parent_id } => {
                write!(f, "category {} has unknown parent {}", id, parent_id)
            }
            CategoryIssue::SelfParent { id } => write!(f, "category {} is its own parent", id),
            CategoryIssue::Cycle { ids } => write!(f, "categories form a cycle: {:?}", ids),
            CategoryIssue::TooDeep { id } => write!(
                f,
                "category {} is nested deeper than {} levels",
                id, MAX_CATEGORY_DEPTH
            ),
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Visit {
    InProgress,
    Done,
}

/// Report every structural problem in a flat category list.
///
/// An empty result means `build_category_tree` will place every category.
pub fn validate_categories(categories: &[Category]) -> Vec<CategoryIssue> {
    let mut issues = Vec::new();

    // First row per id wins, as in the built tree
    let mut parents: HashMap<CategoryId, Option<CategoryId>> = HashMap::new();
    let mut repeated_rows: HashSet<usize> = HashSet::new();
    for (i, category) in categories.iter().enumerate() {
        match parents.entry(category.id) {
            Entry::Occupied(_) => {
                issues.push(CategoryIssue::DuplicateId { id: category.id });
                repeated_rows.insert(i);
            }
            Entry::Vacant(slot) => {
                slot.insert(category.parent_id);
            }
        }
    }

    for (i, category) in categories.iter().enumerate() {
        if repeated_rows.contains(&i) {
            continue;
        }
        match category.parent_id {
            Some(parent) if parent == category.id => {
                issues.push(CategoryIssue::SelfParent { id: category.id });
            }
            Some(parent) if !parents.contains_key(&parent) => {
                issues.push(CategoryIssue::DanglingParent {
                    id: category.id,
                    parent_id: parent,
                });
            }
            _ => {}
        }
    }

    // Depth of every category a built tree would place, roots at 1
    let mut state: HashMap<CategoryId, Visit> = HashMap::new();
    let mut depths: HashMap<CategoryId, usize> = HashMap::new();
    for category in categories {
        let mut path: Vec<CategoryId> = Vec::new();
        let mut current = Some(category.id);
        // Depth above the top of `path`, None when the walk hit a cycle
        let mut base = Some(0);

        while let Some(id) = current {
            match state.get(&id) {
                Some(Visit::Done) => {
                    base = depths.get(&id).copied();
                    break;
                }
                Some(Visit::InProgress) => {
                    base = None;
                    if let Some(start) = path.iter().position(|&p| p == id) {
                        let cycle = &path[start..];
                        // Self-parents are reported separately
                        if cycle.len() > 1 {
                            issues.push(CategoryIssue::Cycle {
                                ids: rotate_to_min(cycle),
                            });
                        }
                    }
                    break;
                }
                None => {}
            }
            if !parents.contains_key(&id) {
                break;
            }
            state.insert(id, Visit::InProgress);
            path.push(id);
            current = parents.get(&id).copied().flatten();
        }

        for &id in path.iter().rev() {
            state.insert(id, Visit::Done);
            let Some(above) = base else {
                continue;
            };
            let depth = above + 1;
            if depth == MAX_CATEGORY_DEPTH + 1 {
                issues.push(CategoryIssue::TooDeep { id });
            }
            depths.insert(id, depth);
            base = Some(depth);
        }
    }

    issues
}

fn rotate_to_min(cycle: &[CategoryId]) -> Vec<CategoryId> {
    let min_pos = cycle
        .iter()
        .enumerate()
        .min_by_key(|(_, id)| **id)
        .map(|(i, _)| i)
        .unwrap_or(0);
    cycle[min_pos..]
        .iter()
        .chain(cycle[..min_pos].iter())
        .copied()
        .collect()
}
