//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Pagination query parameters for list endpoints.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (max 100). Defaults to 20.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items.
    pub total: u32,
    /// Total number of pages.
    pub total_pages: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl PaginationParams {
    /// Clamps `page` to at least 1 and `per_page` to `1..=100`.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, 100),
        }
    }

    /// Number of items before the requested page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        let params = self.clamped();
        u64::from(params.page - 1) * u64::from(params.per_page)
    }

    /// Builds the metadata for a listing of `total` items.
    #[must_use]
    pub fn meta(&self, total: u64) -> PaginationMeta {
        let params = self.clamped();
        let total = u32::try_from(total).unwrap_or(u32::MAX);
        PaginationMeta {
            page: params.page,
            per_page: params.per_page,
            total,
            total_pages: total.div_ceil(params.per_page),
        }
    }

    /// Slices `items` to the requested page and builds the metadata.
    #[must_use]
    pub fn paginate<T>(&self, items: Vec<T>) -> (Vec<T>, PaginationMeta) {
        let meta = self.meta(items.len() as u64);
        let start = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        let data = items
            .into_iter()
            .skip(start)
            .take(meta.per_page as usize)
            .collect();
        (data, meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginates_and_counts_pages() {
        let params = PaginationParams {
            page: 2,
            per_page: 2,
        };
        let (data, meta) = params.paginate(vec![1, 2, 3, 4, 5]);
        assert_eq!(data, vec![3, 4]);
        assert_eq!(meta.total, 5);
        assert_eq!(meta.total_pages, 3);
    }

    #[test]
    fn clamps_zero_values() {
        let params = PaginationParams {
            page: 0,
            per_page: 0,
        }
        .clamped();
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 1);
    }

    #[test]
    fn offset_skips_previous_pages() {
        let params = PaginationParams {
            page: 3,
            per_page: 25,
        };
        assert_eq!(params.offset(), 50);
        let meta = params.meta(51);
        assert_eq!(meta.total_pages, 3);
        assert_eq!(meta.page, 3);
    }

    #[test]
    fn empty_list_has_zero_pages() {
        let params = PaginationParams {
            page: 1,
            per_page: 20,
        };
        let (data, meta) = params.paginate(Vec::<u8>::new());
        assert!(data.is_empty());
        assert_eq!(meta.total_pages, 0);
    }
}
