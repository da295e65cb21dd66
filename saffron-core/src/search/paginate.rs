use serde::Serialize;

pub const DEFAULT_PER_PAGE: i64 = 12;
pub const MAX_PER_PAGE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
    /// Matches across all pages
    pub total_count: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64, total_count: i64) -> Self {
        Self {
            page,
            per_page,
            total_count,
            total_pages: total_pages(total_count, per_page),
        }
    }
}

/// `ceil(total_count / per_page)`; zero when there is nothing to show.
pub fn total_pages(total_count: i64, per_page: i64) -> i64 {
    if total_count <= 0 || per_page <= 0 {
        return 0;
    }
    (total_count + per_page - 1) / per_page
}

/// Rows to skip for a 1-indexed page.
pub fn offset(page: i64, per_page: i64) -> i64 {
    (page.max(1) - 1).saturating_mul(per_page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 12), 0);
        assert_eq!(total_pages(5, 2), 3);
        assert_eq!(total_pages(4, 2), 2);
        assert_eq!(total_pages(1, 100), 1);
    }

    #[test]
    fn test_offset() {
        assert_eq!(offset(1, 12), 0);
        assert_eq!(offset(3, 2), 4);
        assert_eq!(offset(0, 12), 0);
    }
}
