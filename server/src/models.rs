use chrono::{DateTime, Utc};
use diesel::prelude::*;
use saffron_core::Category;
use uuid::Uuid;

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CategoryRow {
    pub id: i32,
    pub name: String,
    pub parent_id: Option<i32>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            parent_id: row.parent_id,
        }
    }
}

/// One row of a search page. The trailing columns are computed in SQL, see
/// `raw_sql`.
#[derive(Queryable, Debug)]
pub struct RecipeSearchRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub prep_time_minutes: Option<i32>,
    pub cook_time_minutes: Option<i32>,
    pub servings: Option<i32>,
    pub difficulty: String,
    pub created_at: DateTime<Utc>,
    pub cuisine: Option<String>,
    pub average_rating: Option<f64>,
    pub review_count: i64,
    pub primary_image_url: Option<String>,
    /// Total count of all matching rows (from window function)
    pub total_count: i64,
}
