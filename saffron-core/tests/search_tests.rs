//! End-to-end search tests against the in-memory store.
//!
//! The catalog lives in `tests/fixtures/catalog.json`: six published recipes
//! and one draft spread over a two-level category tree.

use chrono::{Duration, TimeZone, Utc};
use saffron_core::{
    build_category_tree, resolve_filter, search_recipes, CachedCategoryStore, Category, Cuisine,
    Difficulty, MemoryStore, RecipeFilter, RecipeRecord, RecipeStatus, SearchInput, SortMode,
};
use serde::Deserialize;
use std::path::Path;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct Catalog {
    categories: Vec<Category>,
    cuisines: Vec<Cuisine>,
    recipes: Vec<RecipeRecord>,
}

fn load_catalog() -> Catalog {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/catalog.json");
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse {}: {}", path.display(), e))
}

fn catalog_store() -> MemoryStore {
    let catalog = load_catalog();
    MemoryStore::new()
        .with_categories(catalog.categories)
        .with_cuisines(catalog.cuisines)
        .with_recipes(catalog.recipes)
}

fn titles(result: &saffron_core::SearchResult) -> Vec<&str> {
    result.recipes.iter().map(|r| r.title.as_str()).collect()
}

async fn search_with(store: &MemoryStore, input: SearchInput) -> saffron_core::SearchResult {
    let filter = resolve_filter(&input, 12, store, store).await.unwrap();
    search_recipes(store, &filter).await.unwrap()
}

fn hard_recipe(n: u128) -> RecipeRecord {
    RecipeRecord {
        id: Uuid::from_u128(n),
        title: format!("Hard recipe {}", n),
        description: None,
        prep_time_minutes: None,
        cook_time_minutes: None,
        servings: None,
        status: RecipeStatus::Published,
        difficulty: Difficulty::Hard,
        cuisine: None,
        tags: vec![],
        categories: vec![],
        allergens: vec![],
        ratings: vec![],
        images: vec![],
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap() + Duration::hours(n as i64),
    }
}

#[tokio::test]
async fn test_hard_recipes_first_page() {
    let recipes = (1..=5).map(hard_recipe).collect();
    let store = MemoryStore::new().with_recipes(recipes);
    let filter = RecipeFilter {
        difficulty: Some(Difficulty::Hard),
        page: 1,
        per_page: 2,
        ..Default::default()
    };

    let result = search_recipes(&store, &filter).await.unwrap();

    assert_eq!(result.recipes.len(), 2);
    assert_eq!(result.pagination.total_count, 5);
    assert_eq!(result.pagination.total_pages, 3);
    assert_eq!(result.pagination.page, 1);
    assert_eq!(result.pagination.per_page, 2);
    // Newest first
    assert_eq!(result.recipes[0].title, "Hard recipe 5");
    assert_eq!(result.recipes[1].title, "Hard recipe 4");
    assert_eq!(store.find_recipes_calls(), 1);
}

#[tokio::test]
async fn test_last_partial_page_and_page_past_end() {
    let recipes = (1..=5).map(hard_recipe).collect();
    let store = MemoryStore::new().with_recipes(recipes);

    let mut filter = RecipeFilter {
        page: 3,
        per_page: 2,
        ..Default::default()
    };
    let result = search_recipes(&store, &filter).await.unwrap();
    assert_eq!(result.recipes.len(), 1);
    assert_eq!(result.recipes[0].title, "Hard recipe 1");

    filter.page = 9;
    let result = search_recipes(&store, &filter).await.unwrap();
    assert!(result.recipes.is_empty());
    assert_eq!(result.pagination.page, 9);
    assert_eq!(result.pagination.total_count, 5);
    assert_eq!(result.pagination.total_pages, 3);
}

#[tokio::test]
async fn test_no_filters_returns_published_newest_first() {
    let store = catalog_store();
    let result = search_with(&store, SearchInput::default()).await;

    assert_eq!(
        titles(&result),
        vec![
            "Lemon Sorbet",
            "Oatmeal Cookies",
            "Chocolate Layer Cake",
            "Pad Thai",
            "Green Curry",
            "Beef Wellington",
        ]
    );
    assert_eq!(result.pagination.total_count, 6);
    assert_eq!(result.pagination.total_pages, 1);
}

#[tokio::test]
async fn test_sort_modes() {
    let store = catalog_store();
    let cases = [
        (
            SortMode::Oldest,
            vec![
                "Beef Wellington",
                "Green Curry",
                "Pad Thai",
                "Chocolate Layer Cake",
                "Oatmeal Cookies",
                "Lemon Sorbet",
            ],
        ),
        (
            SortMode::Popular,
            vec![
                "Beef Wellington",
                "Chocolate Layer Cake",
                "Oatmeal Cookies",
                "Green Curry",
                "Pad Thai",
                "Lemon Sorbet",
            ],
        ),
        (
            SortMode::Rating,
            vec![
                "Pad Thai",
                "Chocolate Layer Cake",
                "Green Curry",
                "Beef Wellington",
                "Oatmeal Cookies",
                "Lemon Sorbet",
            ],
        ),
        (
            SortMode::Quickest,
            vec![
                "Lemon Sorbet",
                "Oatmeal Cookies",
                "Pad Thai",
                "Chocolate Layer Cake",
                "Beef Wellington",
                "Green Curry",
            ],
        ),
    ];

    for (sort, expected) in cases {
        let input = SearchInput {
            sort: Some(sort.as_str().to_string()),
            ..Default::default()
        };
        let result = search_with(&store, input).await;
        assert_eq!(titles(&result), expected, "sort mode {:?}", sort);
    }
}

#[tokio::test]
async fn test_unknown_sort_falls_back_to_newest() {
    let store = catalog_store();
    let input = SearchInput {
        sort: Some("trending".to_string()),
        ..Default::default()
    };
    let result = search_with(&store, input).await;
    assert_eq!(titles(&result)[0], "Lemon Sorbet");
}

#[tokio::test]
async fn test_parent_category_includes_descendants() {
    let store = catalog_store();
    let input = SearchInput {
        categories: Some("1".to_string()),
        ..Default::default()
    };
    let result = search_with(&store, input).await;
    assert_eq!(
        titles(&result),
        vec!["Lemon Sorbet", "Oatmeal Cookies", "Chocolate Layer Cake"]
    );

    let input = SearchInput {
        categories: Some("5".to_string()),
        ..Default::default()
    };
    let result = search_with(&store, input).await;
    assert_eq!(
        titles(&result),
        vec!["Pad Thai", "Green Curry", "Beef Wellington"]
    );
}

#[tokio::test]
async fn test_allergens_exclude_matching_recipes() {
    let store = catalog_store();
    let input = SearchInput {
        allergens: Some("gluten".to_string()),
        ..Default::default()
    };
    let result = search_with(&store, input).await;
    assert_eq!(
        titles(&result),
        vec!["Lemon Sorbet", "Pad Thai", "Green Curry"]
    );
}

#[tokio::test]
async fn test_tags_cuisines_difficulty_and_text() {
    let store = catalog_store();

    let result = search_with(
        &store,
        SearchInput {
            tags: Some("quick,vegan".to_string()),
            ..Default::default()
        },
    )
    .await;
    assert_eq!(
        titles(&result),
        vec!["Lemon Sorbet", "Oatmeal Cookies", "Pad Thai"]
    );

    let result = search_with(
        &store,
        SearchInput {
            cuisines: Some("3".to_string()),
            ..Default::default()
        },
    )
    .await;
    assert_eq!(titles(&result), vec!["Pad Thai", "Green Curry"]);

    let result = search_with(
        &store,
        SearchInput {
            difficulty: Some("HARD".to_string()),
            ..Default::default()
        },
    )
    .await;
    assert_eq!(titles(&result), vec!["Beef Wellington"]);

    // The draft also mentions cake but is never eligible
    let result = search_with(
        &store,
        SearchInput {
            q: Some("cake".to_string()),
            ..Default::default()
        },
    )
    .await;
    assert_eq!(titles(&result), vec!["Chocolate Layer Cake"]);
}

#[tokio::test]
async fn test_combined_filters() {
    let store = catalog_store();
    let input = SearchInput {
        categories: Some("5".to_string()),
        cuisines: Some("3".to_string()),
        allergens: Some("peanuts".to_string()),
        ..Default::default()
    };
    let result = search_with(&store, input).await;
    assert_eq!(titles(&result), vec!["Green Curry"]);
}

#[tokio::test]
async fn test_summary_fields() {
    let store = catalog_store();
    let input = SearchInput {
        q: Some("layer cake".to_string()),
        ..Default::default()
    };
    let result = search_with(&store, input).await;
    let cake = &result.recipes[0];

    assert_eq!(cake.review_count, 3);
    assert_eq!(cake.total_time_minutes, Some(70));
    assert_eq!(
        cake.primary_image_url.as_deref(),
        Some("https://img.example/cake-top.jpg")
    );
    assert_eq!(cake.cuisine.as_deref(), Some("French"));
}

#[tokio::test]
async fn test_cached_store_resolves_like_walk() {
    let catalog = load_catalog();
    let cached = CachedCategoryStore::new(
        MemoryStore::new().with_categories(catalog.categories.clone()),
    );
    let walking = MemoryStore::new().with_categories(catalog.categories);

    for root in 1..=6 {
        let mut a = saffron_core::get_descendant_category_ids(root, &cached)
            .await
            .unwrap();
        let mut b = saffron_core::get_descendant_category_ids(root, &walking)
            .await
            .unwrap();
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b, "subtree of {}", root);
    }

    assert_eq!(cached.inner().all_categories_calls(), 1);
    assert_eq!(walking.child_ids_calls(), 10);
}

#[test]
fn test_catalog_tree() {
    let catalog = load_catalog();
    let tree = build_category_tree(&catalog.categories);
    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0].children.len(), 3);
    assert_eq!(tree[1].children[0].name, "Noodles");
    assert!(saffron_core::validate_categories(&catalog.categories).is_empty());
}
