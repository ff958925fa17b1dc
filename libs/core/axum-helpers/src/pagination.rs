//! Optional `page`/`size` paging shared by list endpoints.
//!
//! Lists are unpaged unless both parameters are present; the response then
//! carries the extra page metadata.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Largest page a client can ask for
pub const MAX_PAGE_SIZE: u64 = 1000;

/// `(limit, offset)` for a 1-based `page` of `size` items.
///
/// `size` is clamped to `1..=MAX_PAGE_SIZE` and the offset saturates at
/// `i64::MAX`, so both values always fit a Postgres `BIGINT`.
pub fn page_window(page: u64, size: u64) -> (u64, u64) {
    let size = size.clamp(1, MAX_PAGE_SIZE);
    let offset = page
        .max(1)
        .saturating_sub(1)
        .saturating_mul(size)
        .min(i64::MAX as u64);
    (size, offset)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// 1-based page number
    pub page: Option<u64>,
    /// Items per page
    pub size: Option<u64>,
}

impl PageParams {
    pub fn new(page: u64, size: u64) -> Self {
        Self {
            page: Some(page),
            size: Some(size),
        }
    }

    /// `(limit, offset)` when both values are present. See [`page_window`].
    pub fn window(&self) -> Option<(u64, u64)> {
        match (self.page, self.size) {
            (Some(page), Some(size)) => Some(page_window(page, size)),
            _ => None,
        }
    }

    /// Metadata for a page of a result set with `total` items.
    pub fn meta(&self, total: u64) -> Option<PageMeta> {
        let (size, _) = self.window()?;
        let current_page = self.page.unwrap_or(1).max(1);
        let total_pages = total.div_ceil(size);

        Some(PageMeta {
            total_pages,
            current_page,
            has_more: current_page < total_pages,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total_pages: u64,
    pub current_page: u64,
    pub has_more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpaged_without_both_values() {
        assert_eq!(PageParams::default().window(), None);
        assert_eq!(
            PageParams {
                page: Some(2),
                size: None
            }
            .window(),
            None
        );
        assert_eq!(PageParams::default().meta(10), None);
    }

    #[test]
    fn test_window_offsets() {
        assert_eq!(PageParams::new(1, 10).window(), Some((10, 0)));
        assert_eq!(PageParams::new(3, 10).window(), Some((10, 20)));
        assert_eq!(PageParams::new(0, 0).window(), Some((1, 0)));
    }

    #[test]
    fn test_window_is_bounded() {
        assert_eq!(PageParams::new(1, u64::MAX).window(), Some((MAX_PAGE_SIZE, 0)));
        assert_eq!(
            PageParams::new(3, 1 << 63).window(),
            Some((MAX_PAGE_SIZE, 2 * MAX_PAGE_SIZE))
        );

        let (limit, offset) = PageParams::new(u64::MAX, u64::MAX).window().unwrap();
        assert_eq!(limit, MAX_PAGE_SIZE);
        assert_eq!(offset, i64::MAX as u64);
    }

    #[test]
    fn test_meta_with_huge_values() {
        let meta = PageParams::new(u64::MAX, u64::MAX).meta(5).unwrap();
        assert_eq!(meta.total_pages, 1);
        assert_eq!(meta.current_page, u64::MAX);
        assert!(!meta.has_more);
    }

    #[test]
    fn test_meta() {
        let meta = PageParams::new(2, 10).meta(25).unwrap();
        assert_eq!(meta.total_pages, 3);
        assert_eq!(meta.current_page, 2);
        assert!(meta.has_more);

        let last = PageParams::new(3, 10).meta(25).unwrap();
        assert!(!last.has_more);

        let empty = PageParams::new(1, 10).meta(0).unwrap();
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_more);
    }

    #[test]
    fn test_meta_serializes_camel_case() {
        let json = serde_json::to_value(PageParams::new(1, 5).meta(6).unwrap()).unwrap();
        assert_eq!(json["totalPages"], 2);
        assert_eq!(json["hasMore"], true);
    }
}
