//! Raw SQL fragments that can't be expressed in Diesel's type-safe DSL.
//!
//! # Safety
//!
//! All SQL in this module has been reviewed for SQL injection safety:
//! - User input is ALWAYS passed via `.bind()` parameters
//! - No string concatenation or interpolation with user data
//!
//! When adding new SQL here:
//! 1. Document why Diesel DSL can't be used
//! 2. Ensure all user input uses `.bind()`

use diesel::dsl::sql;
use diesel::expression::SqlLiteral;
use diesel::sql_types::{BigInt, Double, Nullable, Text};

/// Window function for counting total rows across the full result set.
///
/// Returns `COUNT(*) OVER()` which gives the total count before LIMIT/OFFSET.
/// Diesel doesn't support window functions natively.
///
/// # Safety
/// Static SQL string with no user input.
pub fn count_over() -> SqlLiteral<BigInt> {
    sql::<BigInt>("COUNT(*) OVER()")
}

/// Name of the recipe's cuisine, as a correlated subquery.
///
/// # Safety
/// Static SQL string with no user input.
pub fn cuisine_name() -> SqlLiteral<Nullable<Text>> {
    sql::<Nullable<Text>>("(SELECT cu.name FROM cuisines cu WHERE cu.id = recipes.cuisine_id)")
}

const AVERAGE_RATING: &str =
    "(SELECT AVG(rv.rating)::float8 FROM reviews rv WHERE rv.recipe_id = recipes.id)";

const REVIEW_COUNT: &str = "(SELECT COUNT(*) FROM reviews rv WHERE rv.recipe_id = recipes.id)";

/// Average review rating, NULL when the recipe has no reviews.
///
/// # Safety
/// Static SQL string with no user input.
pub fn average_rating() -> SqlLiteral<Nullable<Double>> {
    sql::<Nullable<Double>>(AVERAGE_RATING)
}

/// Number of reviews.
///
/// # Safety
/// Static SQL string with no user input.
pub fn review_count() -> SqlLiteral<BigInt> {
    sql::<BigInt>(REVIEW_COUNT)
}

/// URL of the image flagged primary, else the first image by position.
///
/// # Safety
/// Static SQL string with no user input.
pub fn primary_image_url() -> SqlLiteral<Nullable<Text>> {
    sql::<Nullable<Text>>(
        "(SELECT ri.url FROM recipe_images ri WHERE ri.recipe_id = recipes.id \
         ORDER BY ri.is_primary DESC, ri.position ASC, ri.id ASC LIMIT 1)",
    )
}

/// ORDER BY term: most reviewed first.
///
/// Diesel's DSL has no way to attach `NULLS LAST` to a subquery expression,
/// so the aggregate order terms are written out in full.
///
/// # Safety
/// Static SQL string with no user input.
pub fn order_review_count_desc() -> SqlLiteral<Text> {
    sql::<Text>(&format!("{} DESC", REVIEW_COUNT))
}

/// ORDER BY term: highest average rating first, unrated recipes last.
///
/// # Safety
/// Static SQL string with no user input.
pub fn order_average_rating_desc() -> SqlLiteral<Text> {
    sql::<Text>(&format!("{} DESC NULLS LAST", AVERAGE_RATING))
}

/// ORDER BY term: shortest prep + cook time first, unknown times last.
///
/// Total time is unknown only when both parts are NULL.
///
/// # Safety
/// Static SQL string with no user input.
pub fn order_total_time_asc() -> SqlLiteral<Text> {
    sql::<Text>(
        "(CASE WHEN recipes.prep_time_minutes IS NULL AND recipes.cook_time_minutes IS NULL \
         THEN NULL \
         ELSE COALESCE(recipes.prep_time_minutes, 0) + COALESCE(recipes.cook_time_minutes, 0) \
         END) ASC NULLS LAST",
    )
}

/// Filter: does the recipe link to a row in `$table` whose lowercased name is
/// in the bound array?
///
/// Expands to `EXISTS (...)` or `NOT EXISTS (...)` depending on the first
/// argument. `$link` is the join table and `$fk` its column pointing at
/// `$table`.
///
/// # Safety
/// The names are passed via `.bind()`, not interpolated. Table and column
/// names are literals fixed at compile time.
///
/// # Why raw SQL?
/// Diesel can express EXISTS over a join, but not as a boxable filter on
/// `recipes` without a correlated alias, and not with `lower()` on an array
/// comparison.
#[macro_export]
macro_rules! linked_name_in {
    ($exists:literal, $link:literal, $fk:literal, $table:literal, $names:expr) => {
        diesel::dsl::sql::<diesel::sql_types::Bool>(concat!(
            $exists,
            " (SELECT 1 FROM ",
            $link,
            " l JOIN ",
            $table,
            " n ON n.id = l.",
            $fk,
            " WHERE l.recipe_id = recipes.id AND lower(n.name) = ANY(",
        ))
        .bind::<diesel::sql_types::Array<diesel::sql_types::Text>, _>($names)
        .sql("))")
    };
}

/// Filter: is the recipe's cuisine one of the bound lowercased names?
///
/// # Safety
/// The names are passed via `.bind()`, not interpolated.
#[macro_export]
macro_rules! cuisine_name_in {
    ($names:expr) => {
        diesel::dsl::sql::<diesel::sql_types::Bool>(
            "recipes.cuisine_id IN (SELECT cu.id FROM cuisines cu WHERE lower(cu.name) = ANY(",
        )
        .bind::<diesel::sql_types::Array<diesel::sql_types::Text>, _>($names)
        .sql("))")
    };
}

/// Root category plus every descendant, in one round trip.
///
/// `UNION` (not `UNION ALL`) drops rows already produced, so a parent cycle
/// in bad data terminates instead of recursing forever. The root is always
/// returned, even if no such category exists.
///
/// # Safety
/// The root id MUST be passed via `.bind()`, not interpolated.
pub const CATEGORY_SUBTREE_QUERY: &str = "WITH RECURSIVE subtree(id) AS ( \
        SELECT $1::int4 \
        UNION \
        SELECT c.id FROM categories c JOIN subtree s ON c.parent_id = s.id \
    ) \
    SELECT id FROM subtree";
