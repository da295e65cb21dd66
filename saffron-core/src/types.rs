use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CategoryId = i32;
pub type CuisineId = i32;

/// A row from the category table. `parent_id` is `None` for roots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub parent_id: Option<CategoryId>,
}

impl Category {
    pub fn new(id: CategoryId, name: &str, parent_id: Option<CategoryId>) -> Self {
        Self {
            id,
            name: name.to_string(),
            parent_id,
        }
    }
}

/// A category with its children attached, built per request from the flat list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNode {
    pub id: CategoryId,
    pub name: String,
    pub parent_id: Option<CategoryId>,
    pub children: Vec<CategoryNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cuisine {
    pub id: CuisineId,
    pub name: String,
}

/// Publication state. Only published recipes are ever searchable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecipeStatus {
    Published,
    Draft,
}

impl RecipeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipeStatus::Published => "PUBLISHED",
            RecipeStatus::Draft => "DRAFT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        }
    }

    /// Case-insensitive parse. Blank or unknown input yields `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EASY" => Some(Difficulty::Easy),
            "MEDIUM" => Some(Difficulty::Medium),
            "HARD" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeImage {
    pub url: String,
    #[serde(default)]
    pub is_primary: bool,
}

/// Everything the search layer needs to know about one recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeRecord {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub prep_time_minutes: Option<i32>,
    #[serde(default)]
    pub cook_time_minutes: Option<i32>,
    #[serde(default)]
    pub servings: Option<i32>,
    pub status: RecipeStatus,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub allergens: Vec<String>,
    /// Review ratings, each 1-5
    #[serde(default)]
    pub ratings: Vec<i16>,
    #[serde(default)]
    pub images: Vec<RecipeImage>,
    pub created_at: DateTime<Utc>,
}

impl RecipeRecord {
    pub fn total_time_minutes(&self) -> Option<i32> {
        total_time(self.prep_time_minutes, self.cook_time_minutes)
    }

    pub fn review_count(&self) -> i64 {
        self.ratings.len() as i64
    }

    pub fn average_rating(&self) -> Option<f64> {
        if self.ratings.is_empty() {
            return None;
        }
        let sum: i64 = self.ratings.iter().map(|r| i64::from(*r)).sum();
        Some(sum as f64 / self.ratings.len() as f64)
    }

    /// The image flagged primary, else the first one.
    pub fn primary_image_url(&self) -> Option<&str> {
        self.images
            .iter()
            .find(|img| img.is_primary)
            .or_else(|| self.images.first())
            .map(|img| img.url.as_str())
    }

    pub fn to_summary(&self) -> RecipeSummary {
        RecipeSummary {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            difficulty: self.difficulty,
            prep_time_minutes: self.prep_time_minutes,
            cook_time_minutes: self.cook_time_minutes,
            total_time_minutes: self.total_time_minutes(),
            servings: self.servings,
            cuisine: self.cuisine.clone(),
            tags: sort_names(self.tags.clone()),
            categories: sort_names(self.categories.clone()),
            average_rating: self.average_rating(),
            review_count: self.review_count(),
            primary_image_url: self.primary_image_url().map(str::to_string),
            created_at: self.created_at,
        }
    }
}

/// Prep plus cook time. Unknown only when both parts are unknown.
pub fn total_time(prep: Option<i32>, cook: Option<i32>) -> Option<i32> {
    match (prep, cook) {
        (None, None) => None,
        (p, c) => Some(p.unwrap_or(0) + c.unwrap_or(0)),
    }
}

/// Name lists on a [`RecipeSummary`] are sorted by byte order, whatever
/// order the store produced them in.
pub fn sort_names(mut names: Vec<String>) -> Vec<String> {
    names.sort_unstable();
    names
}

/// One entry in a page of search results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSummary {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub difficulty: Difficulty,
    pub prep_time_minutes: Option<i32>,
    pub cook_time_minutes: Option<i32>,
    pub total_time_minutes: Option<i32>,
    pub servings: Option<i32>,
    pub cuisine: Option<String>,
    /// Sorted by name, see [`sort_names`]
    pub tags: Vec<String>,
    /// Sorted by name, see [`sort_names`]
    pub categories: Vec<String>,
    pub average_rating: Option<f64>,
    pub review_count: i64,
    pub primary_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}
