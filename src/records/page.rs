//! Raw-data table pagination

use serde::Serialize;

/// Default rows per page for the raw-data table
pub const DEFAULT_PER_PAGE: usize = 25;

/// One page of a larger collection (pages are 1-based)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// 1-based index of the first item on this page, 0 when empty
    pub fn first_index(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            (self.page - 1) * self.per_page + 1
        }
    }
}

/// Slice `items` into the requested page
///
/// `per_page` of zero is treated as one. Pages past the end clamp to the
/// last page so a stale page number still shows data.
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);

    let items = items
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();

    Page {
        items,
        page,
        per_page,
        total_items,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate_middle_page() {
        let page = paginate((1..=55).collect(), 2, 25);

        assert_eq!(page.items.first(), Some(&26));
        assert_eq!(page.items.len(), 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.first_index(), 26);
        assert!(page.has_previous());
        assert!(page.has_next());
    }

    #[test]
    fn test_paginate_last_partial_page() {
        let page = paginate((1..=55).collect(), 3, 25);
        assert_eq!(page.items, (51..=55).collect::<Vec<_>>());
        assert!(!page.has_next());
    }

    #[test]
    fn test_paginate_clamps() {
        let page = paginate((1..=10).collect(), 99, 4);
        assert_eq!(page.page, 3);
        assert_eq!(page.items, vec![9, 10]);

        let page = paginate((1..=10).collect(), 0, 0);
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 1);
        assert_eq!(page.items, vec![1]);
    }

    #[test]
    fn test_paginate_empty() {
        let page: Page<u32> = paginate(Vec::new(), 1, 25);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.first_index(), 0);
        assert!(!page.has_next());
    }
}
