use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A zero-based page index paired with a non-zero page size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    size: NonZeroUsize,
}

impl PageRequest {
    pub fn new(page: usize, size: NonZeroUsize) -> Self {
        Self { page, size }
    }

    /// Fallible constructor for raw sizes; `size == 0` is rejected.
    pub fn of(page: usize, size: usize) -> Result<Self, TypeError> {
        let size = NonZeroUsize::new(size).ok_or(TypeError::ZeroPageSize)?;
        Ok(Self::new(page, size))
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn size(&self) -> usize {
        self.size.get()
    }

    /// Index of the first element on this page. Saturates instead of
    /// overflowing for absurd page indexes.
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size.get())
    }
}

/// One page of results plus the totals needed to navigate the rest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total_elements: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Number of elements on this page.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
