use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};
use tally_types::PageRequest;

use crate::cache::DEFAULT_LIST_CAPACITY;

/// Configuration for the transaction service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// When `false`, every read goes straight to the record store.
    pub cache_enabled: bool,
    /// Upper bound on cached result lists.
    pub max_cached_lists: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            max_cached_lists: DEFAULT_LIST_CAPACITY,
        }
    }
}

impl ServiceConfig {
    /// A configuration with the read cache switched off.
    pub fn uncached() -> Self {
        Self {
            cache_enabled: false,
            ..Self::default()
        }
    }
}

/// How raw paging parameters are turned into a [`PageRequest`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingConfig {
    /// Size used when the caller gives none, or gives zero.
    pub default_page_size: usize,
    /// Upper bound on the page size; larger requests are clamped.
    pub max_page_size: usize,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 2000,
        }
    }
}

impl PagingConfig {
    /// Resolve optional raw parameters into a valid request.
    ///
    /// Missing page → 0. Missing or zero size → `default_page_size`.
    /// Sizes above `max_page_size` are clamped.
    pub fn resolve(&self, page: Option<usize>, size: Option<usize>) -> PageRequest {
        let max = self.max_page_size.max(1);
        let size = match size {
            Some(0) | None => self.default_page_size,
            Some(s) => s,
        }
        .clamp(1, max);
        let size = NonZeroUsize::new(size).unwrap_or(NonZeroUsize::MIN);
        PageRequest::new(page.unwrap_or(0), size)
    }
}
