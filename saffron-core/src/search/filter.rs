use std::cmp::Ordering;

use crate::types::{Difficulty, RecipeRecord, RecipeStatus};

use super::paginate::{DEFAULT_PER_PAGE, MAX_PER_PAGE};

/// Result ordering. Every mode breaks ties by recipe id, ascending.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    /// Creation time, newest first
    #[default]
    Newest,
    /// Creation time, oldest first
    Oldest,
    /// Most reviews first, then newest
    Popular,
    /// Highest average rating first (unrated last), then most reviews, then newest
    Rating,
    /// Shortest prep + cook time first (unknown last), then newest
    Quickest,
}

impl SortMode {
    pub const ALL: &'static [SortMode] = &[
        SortMode::Newest,
        SortMode::Oldest,
        SortMode::Popular,
        SortMode::Rating,
        SortMode::Quickest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Newest => "newest",
            SortMode::Oldest => "oldest",
            SortMode::Popular => "popular",
            SortMode::Rating => "rating",
            SortMode::Quickest => "quickest",
        }
    }

    /// Unknown or blank values fall back to [`SortMode::Newest`].
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "oldest" => SortMode::Oldest,
            "popular" => SortMode::Popular,
            "rating" => SortMode::Rating,
            "quickest" => SortMode::Quickest,
            _ => SortMode::Newest,
        }
    }

    /// Ordering of two recipes under this mode.
    pub fn compare(&self, a: &RecipeRecord, b: &RecipeRecord) -> Ordering {
        let newest = || b.created_at.cmp(&a.created_at);
        let primary = match self {
            SortMode::Newest => newest(),
            SortMode::Oldest => a.created_at.cmp(&b.created_at),
            SortMode::Popular => b
                .review_count()
                .cmp(&a.review_count())
                .then_with(newest),
            SortMode::Rating => desc_nulls_last(a.average_rating(), b.average_rating())
                .then_with(|| b.review_count().cmp(&a.review_count()))
                .then_with(newest),
            SortMode::Quickest => asc_nulls_last(a.total_time_minutes(), b.total_time_minutes())
                .then_with(newest),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

fn desc_nulls_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn asc_nulls_last(a: Option<i32>, b: Option<i32>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// A composite recipe query.
///
/// Category, tag, cuisine and allergen lists hold names, compared
/// case-insensitively. Categories are expected to be expanded to their
/// descendants already. An empty list or query imposes no constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeFilter {
    /// Substring matched against title or description
    pub query: String,
    /// Match recipes in at least one of these categories
    pub categories: Vec<String>,
    /// Match recipes carrying at least one of these tags
    pub tags: Vec<String>,
    /// Match recipes whose cuisine is one of these
    pub cuisines: Vec<String>,
    /// Exclude recipes containing any of these allergens
    pub allergens: Vec<String>,
    pub difficulty: Option<Difficulty>,
    pub sort: SortMode,
    /// 1-indexed
    pub page: i64,
    pub per_page: i64,
}

impl Default for RecipeFilter {
    fn default() -> Self {
        Self {
            query: String::new(),
            categories: Vec::new(),
            tags: Vec::new(),
            cuisines: Vec::new(),
            allergens: Vec::new(),
            difficulty: None,
            sort: SortMode::default(),
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl RecipeFilter {
    /// Page clamped to at least 1.
    pub fn page(&self) -> i64 {
        self.page.max(1)
    }

    /// Page size clamped to `1..=MAX_PER_PAGE`.
    pub fn per_page(&self) -> i64 {
        self.per_page.clamp(1, MAX_PER_PAGE)
    }

    pub fn trimmed_query(&self) -> &str {
        self.query.trim()
    }

    /// Whether a recipe passes every constraint of this filter.
    pub fn matches(&self, recipe: &RecipeRecord) -> bool {
        if recipe.status != RecipeStatus::Published {
            return false;
        }

        if let Some(difficulty) = self.difficulty {
            if recipe.difficulty != difficulty {
                return false;
            }
        }

        let query = self.trimmed_query();
        if !query.is_empty() {
            let needle = query.to_lowercase();
            let in_title = recipe.title.to_lowercase().contains(&needle);
            let in_description = recipe
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !in_title && !in_description {
                return false;
            }
        }

        if !self.categories.is_empty() && !any_shared(&recipe.categories, &self.categories) {
            return false;
        }

        if !self.tags.is_empty() && !any_shared(&recipe.tags, &self.tags) {
            return false;
        }

        if !self.cuisines.is_empty() {
            let cuisine_ok = recipe
                .cuisine
                .as_deref()
                .map(|c| self.cuisines.iter().any(|w| eq_ci(c, w)))
                .unwrap_or(false);
            if !cuisine_ok {
                return false;
            }
        }

        if any_shared(&recipe.allergens, &self.allergens) {
            return false;
        }

        true
    }
}

fn eq_ci(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn any_shared(have: &[String], wanted: &[String]) -> bool {
    have.iter().any(|h| wanted.iter().any(|w| eq_ci(h, w)))
}

/// Lowercased copies, for stores that compare in their own query language.
pub fn lowercase_all(names: &[String]) -> Vec<String> {
    names.iter().map(|n| n.to_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn recipe(n: u128) -> RecipeRecord {
        RecipeRecord {
            id: Uuid::from_u128(n),
            title: format!("Recipe {}", n),
            description: Some("Rich and buttery".to_string()),
            prep_time_minutes: None,
            cook_time_minutes: None,
            servings: None,
            status: RecipeStatus::Published,
            difficulty: Difficulty::Easy,
            cuisine: Some("French".to_string()),
            tags: vec!["Vegetarian".to_string()],
            categories: vec!["Cakes".to_string()],
            allergens: vec!["Dairy".to_string()],
            ratings: vec![],
            images: vec![],
            created_at: Utc.with_ymd_and_hms(2024, 1, n as u32, 12, 0, 0).unwrap(),
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sort_mode_parse() {
        assert_eq!(SortMode::parse("rating"), SortMode::Rating);
        assert_eq!(SortMode::parse("POPULAR"), SortMode::Popular);
        assert_eq!(SortMode::parse(""), SortMode::Newest);
        assert_eq!(SortMode::parse("alphabetical"), SortMode::Newest);
        for mode in SortMode::ALL {
            assert_eq!(SortMode::parse(mode.as_str()), *mode);
        }
    }

    #[test]
    fn test_default_filter_matches_published_only() {
        let filter = RecipeFilter::default();
        let mut draft = recipe(1);
        draft.status = RecipeStatus::Draft;
        assert!(filter.matches(&recipe(2)));
        assert!(!filter.matches(&draft));
    }

    #[test]
    fn test_query_matches_title_or_description() {
        let mut filter = RecipeFilter {
            query: "  BUTTERY ".to_string(),
            ..Default::default()
        };
        assert!(filter.matches(&recipe(1)));

        filter.query = "recipe 1".to_string();
        assert!(filter.matches(&recipe(1)));

        filter.query = "spicy".to_string();
        assert!(!filter.matches(&recipe(1)));

        let mut no_description = recipe(1);
        no_description.description = None;
        filter.query = "buttery".to_string();
        assert!(!filter.matches(&no_description));
    }

    #[test]
    fn test_tags_are_ored() {
        let filter = RecipeFilter {
            tags: names(&["vegan", "vegetarian"]),
            ..Default::default()
        };
        assert!(filter.matches(&recipe(1)));

        let filter = RecipeFilter {
            tags: names(&["vegan"]),
            ..Default::default()
        };
        assert!(!filter.matches(&recipe(1)));
    }

    #[test]
    fn test_category_and_cuisine() {
        let filter = RecipeFilter {
            categories: names(&["Desserts", "cakes"]),
            cuisines: names(&["french"]),
            ..Default::default()
        };
        assert!(filter.matches(&recipe(1)));

        let mut no_cuisine = recipe(1);
        no_cuisine.cuisine = None;
        assert!(!filter.matches(&no_cuisine));

        let filter = RecipeFilter {
            categories: names(&["Soups"]),
            ..Default::default()
        };
        assert!(!filter.matches(&recipe(1)));
    }

    #[test]
    fn test_allergens_exclude() {
        let filter = RecipeFilter {
            allergens: names(&["nuts", "dairy"]),
            ..Default::default()
        };
        assert!(!filter.matches(&recipe(1)));

        let filter = RecipeFilter {
            allergens: names(&["nuts"]),
            ..Default::default()
        };
        assert!(filter.matches(&recipe(1)));
    }

    #[test]
    fn test_difficulty_exact() {
        let filter = RecipeFilter {
            difficulty: Some(Difficulty::Hard),
            ..Default::default()
        };
        assert!(!filter.matches(&recipe(1)));
        let mut hard = recipe(1);
        hard.difficulty = Difficulty::Hard;
        assert!(filter.matches(&hard));
    }

    #[test]
    fn test_page_clamping() {
        let filter = RecipeFilter {
            page: 0,
            per_page: 5000,
            ..Default::default()
        };
        assert_eq!(filter.page(), 1);
        assert_eq!(filter.per_page(), MAX_PER_PAGE);

        let filter = RecipeFilter {
            per_page: 0,
            ..Default::default()
        };
        assert_eq!(filter.per_page(), 1);
    }

    #[test]
    fn test_rating_sort_puts_unrated_last() {
        let mut rated = recipe(1);
        rated.ratings = vec![3];
        let unrated = recipe(2);
        assert_eq!(SortMode::Rating.compare(&rated, &unrated), Ordering::Less);
        assert_eq!(SortMode::Rating.compare(&unrated, &rated), Ordering::Greater);
    }

    #[test]
    fn test_ties_broken_by_id() {
        let a = recipe(3);
        let mut b = recipe(3);
        b.id = Uuid::from_u128(4);
        assert_eq!(SortMode::Newest.compare(&a, &b), Ordering::Less);
        assert_eq!(SortMode::Newest.compare(&b, &a), Ordering::Greater);
    }
}
