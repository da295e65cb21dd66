//! Category hierarchy: tree building, validation and descendant resolution.

mod index;
mod resolver;
mod tree;
mod validate;

pub use index::CategoryIndex;
pub use resolver::{
    get_descendant_category_ids, get_descendant_category_ids_for_multiple,
    resolve_category_names,
};
pub use tree::{build_category_tree, flatten_ids, MAX_CATEGORY_DEPTH};
pub use validate::{validate_categories, CategoryIssue};
