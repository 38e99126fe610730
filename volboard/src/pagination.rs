use serde::Serialize;

/// One page of a filtered list plus the metadata a pager needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub total_pages: u64,
    pub page: u64,
    pub page_size: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Page<T> {
    /// An empty page for a missing or empty collection.
    pub fn empty(page: u64, page_size: u64) -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            total_pages: 0,
            page,
            page_size: page_size.max(1),
            has_next: false,
            has_prev: page > 1,
        }
    }

    /// Zero-based index of the first item on this page within the full list.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// True when the requested page lies past the last page.
    #[inline]
    pub fn is_out_of_range(&self) -> bool {
        self.page == 0 || self.page > self.total_pages
    }

    /// Transform the items while keeping the page metadata.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            total_pages: self.total_pages,
            page: self.page,
            page_size: self.page_size,
            has_next: self.has_next,
            has_prev: self.has_prev,
        }
    }
}

/// Slice `items` to the 1-indexed `page` of `page_size` entries.
///
/// Pages past the end (and page 0) come back empty rather than failing, and a
/// missing collection yields an empty first page. A zero page size is treated
/// as one.
pub fn paginate<T: Clone>(items: Option<&[T]>, page: u64, page_size: u64) -> Page<T> {
    let page_size = page_size.max(1);
    let Some(items) = items else {
        return Page::empty(page, page_size);
    };

    let total_count = items.len() as u64;
    let total_pages = total_count.div_ceil(page_size);

    let slice = if page == 0 || page > total_pages {
        &[][..]
    } else {
        let start = usize::try_from((page - 1) * page_size).unwrap_or(usize::MAX).min(items.len());
        let end = usize::try_from(page * page_size).unwrap_or(usize::MAX).min(items.len());
        &items[start..end]
    };

    Page {
        items: slice.to_vec(),
        total_count,
        total_pages,
        page,
        page_size,
        has_next: page < total_pages,
        has_prev: page > 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(n: u32) -> Vec<u32> {
        (1..=n).collect()
    }

    #[test]
    fn last_partial_page() {
        let items = numbers(25);
        let page = paginate(Some(items.as_slice()), 3, 10);
        assert_eq!(page.items, [21, 22, 23, 24, 25]);
        assert_eq!(page.total_count, 25);
        assert_eq!(page.total_pages, 3);
        assert!(!page.has_next);
        assert!(page.has_prev);
        assert_eq!(page.offset(), 20);
    }

    #[test]
    fn first_page_flags() {
        let items = numbers(25);
        let page = paginate(Some(items.as_slice()), 1, 10);
        assert_eq!(page.items.len(), 10);
        assert!(page.has_next);
        assert!(!page.has_prev);
    }

    #[test]
    fn pages_reconstruct_the_list() {
        let items = numbers(23);
        for size in 1..=25 {
            let first = paginate(Some(items.as_slice()), 1, size);
            let mut rebuilt = Vec::new();
            for p in 1..=first.total_pages {
                let page = paginate(Some(items.as_slice()), p, size);
                assert!(page.items.len() as u64 <= size);
                rebuilt.extend(page.items);
            }
            assert_eq!(rebuilt, items, "page size {size}");
        }
    }

    #[test]
    fn out_of_range_pages_are_empty() {
        let items = numbers(5);
        let past = paginate(Some(items.as_slice()), 4, 2);
        assert!(past.items.is_empty());
        assert_eq!(past.total_pages, 3);
        assert!(past.is_out_of_range());
        assert!(!past.has_next);

        let zero = paginate(Some(items.as_slice()), 0, 2);
        assert!(zero.items.is_empty());
        assert!(!zero.has_prev);
        assert_eq!(zero.offset(), 0);

        let far = paginate(Some(items.as_slice()), u64::MAX, 10);
        assert!(far.items.is_empty());
        assert!(far.is_out_of_range());
        assert_eq!(far.offset(), u64::MAX);
    }

    #[test]
    fn missing_collection_is_an_empty_page() {
        let page = paginate::<u32>(None, 1, 10);
        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 0);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.page, 1);
    }

    #[test]
    fn zero_page_size_is_treated_as_one() {
        let items = numbers(3);
        let page = paginate(Some(items.as_slice()), 2, 0);
        assert_eq!(page.items, [2]);
        assert_eq!(page.page_size, 1);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn serializes_camel_case() {
        let page = paginate::<u32>(None, 1, 10);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["totalCount"], 0);
        assert_eq!(json["totalPages"], 0);
        assert_eq!(json["items"], serde_json::json!([]));
    }
}
