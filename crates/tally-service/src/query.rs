//! Filtering and pagination over record snapshots.
//!
//! All functions are pure and preserve the order of their input.

use tally_types::{Page, PageRequest, Transaction};

/// Records whose type equals `kind`, ignoring case.
///
/// A value that is not a known type matches nothing.
pub fn filter_by_type(records: Vec<Transaction>, kind: &str) -> Vec<Transaction> {
    records.into_iter().filter(|t| t.kind.matches(kind)).collect()
}

/// Records whose category equals `category`, ignoring case.
///
/// Records without a category never match.
pub fn filter_by_category(records: Vec<Transaction>, category: &str) -> Vec<Transaction> {
    records
        .into_iter()
        .filter(|t| t.in_category(category))
        .collect()
}

/// Cut one page out of `records`.
///
/// A page past the end is empty, not an error. `total_pages` is
/// `ceil(total_elements / size)`, so zero for an empty input.
pub fn paginate<T>(records: Vec<T>, request: PageRequest) -> Page<T> {
    let total_elements = records.len();
    let size = request.size();
    let total_pages = total_elements.div_ceil(size);
    let content = records
        .into_iter()
        .skip(request.offset())
        .take(size)
        .collect();
    Page {
        content,
        page: request.page(),
        size,
        total_elements,
        total_pages,
    }
}
