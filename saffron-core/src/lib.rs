pub mod category;
pub mod error;
pub mod search;
pub mod store;
pub mod types;

pub use category::{
    build_category_tree, get_descendant_category_ids, get_descendant_category_ids_for_multiple,
    validate_categories, CategoryIndex, CategoryIssue, MAX_CATEGORY_DEPTH,
};
pub use error::StoreError;
pub use search::{
    resolve_filter, search_recipes, Pagination, RecipeFilter, SearchInput, SearchResult, SortMode,
};
pub use store::{
    CachedCategoryStore, CategoryStore, CuisineStore, MemoryStore, RecipePage, RecipeStore,
};
pub use types::{
    sort_names, total_time, Category, CategoryId, CategoryNode, Cuisine, CuisineId, Difficulty,
    RecipeImage, RecipeRecord, RecipeStatus, RecipeSummary,
};
