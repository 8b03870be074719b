use serde::{Deserialize, Serialize};

/// Catalog query filter. Empty filter matches everything; all criteria
/// are conjunctive. Substring matches are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieFilter {
    pub title_contains: Option<String>,
    pub director_contains: Option<String>,
    pub genre_contains: Option<String>,
    pub path_contains: Option<String>,
    pub codec_contains: Option<String>,
    /// Exact extension match, e.g. ".mkv".
    pub extension: Option<String>,
    pub year_min: Option<u16>,
    pub year_max: Option<u16>,
    pub rating_min: Option<f32>,
    pub rating_max: Option<f32>,
    pub size_mb_min: Option<f64>,
    pub size_mb_max: Option<f64>,
    pub watched: Option<bool>,
    /// `Some(true)` selects records with no overview yet (used by the
    /// fill-missing sweep); `Some(false)` the complement.
    pub missing_overview: Option<bool>,
    /// `Some(true)` selects records carrying an external id.
    pub has_external_id: Option<bool>,
    /// `Some(true)` selects records with no critic rating yet.
    pub missing_critic_rating: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MovieSortField {
    #[default]
    Title,
    Year,
    Rating,
    /// Insertion order (store id).
    Added,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MovieSort {
    pub field: MovieSortField,
    pub direction: SortDirection,
}

impl MovieSort {
    pub const fn ascending(field: MovieSortField) -> Self {
        Self {
            field,
            direction: SortDirection::Ascending,
        }
    }

    pub const fn descending(field: MovieSortField) -> Self {
        Self {
            field,
            direction: SortDirection::Descending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: 24,
            offset: 0,
        }
    }
}

impl Page {
    pub const fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }

    /// 1-based page number helper for CLI pagination.
    pub fn number(page: u32, per_page: u32) -> Self {
        Self {
            limit: per_page,
            offset: page.saturating_sub(1).saturating_mul(per_page),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_number_is_one_based() {
        assert_eq!(Page::number(1, 24), Page::new(24, 0));
        assert_eq!(Page::number(3, 10), Page::new(10, 20));
        // Page 0 behaves like page 1.
        assert_eq!(Page::number(0, 24), Page::new(24, 0));
    }

    #[test]
    fn page_number_saturates_instead_of_overflowing() {
        let page = Page::number(u32::MAX, 24);
        assert_eq!(page.offset, u32::MAX);
        assert_eq!(page.limit, 24);
    }
}
