/// One page of a chapter-wide collection.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice<T> {
    pub items: Vec<T>,
    pub total_pages: usize,
}

/// Slices `records` into fixed-size pages and returns page `page`.
///
/// Pages are **one-based**, the same numbering as `page{N}.jpg`. A page past
/// the end is an empty slice carrying the real `total_pages`; page 0 is
/// treated the same way. A `page_size` of zero is clamped to one.
pub fn paginate<T>(records: Vec<T>, page: usize, page_size: usize) -> PageSlice<T> {
    let page_size = page_size.max(1);
    let total_pages = records.len().div_ceil(page_size);

    let items = match page.checked_sub(1) {
        Some(idx) if idx < total_pages => records
            .into_iter()
            .skip(idx * page_size)
            .take(page_size)
            .collect(),
        _ => Vec::new(),
    };

    PageSlice { items, total_pages }
}
