//! Page requests and paged responses.
//!
//! The backend pages with zero-based `page` and `size` query parameters and
//! answers with a Spring-style page object.

use serde::{Deserialize, Serialize};

/// Default page size used by list screens.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page size the client will ask for.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Which page to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    /// Zero-based page index.
    pub page: u32,
    pub size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build a request, clamping `size` to `1..=MAX_PAGE_SIZE`.
    #[must_use]
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size: size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// From a one-based page number as people type it.
    #[must_use]
    pub fn from_page_number(number: u32, size: u32) -> Self {
        Self::new(number.saturating_sub(1), size)
    }

    /// Query parameters for the request URL.
    #[must_use]
    pub fn query(&self) -> [(&'static str, String); 2] {
        [("page", self.page.to_string()), ("size", self.size.to_string())]
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            size: self.size,
        }
    }

    #[must_use]
    pub const fn previous(self) -> Self {
        Self {
            page: self.page.saturating_sub(1),
            size: self.size,
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(default, alias = "totalPages")]
    pub total_pages: u32,
    #[serde(default, alias = "totalElements")]
    pub total_elements: u64,
    /// Zero-based index of this page.
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub size: u32,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> Page<T> {
    /// An empty page, what failed list reads render as.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            content: Vec::new(),
            total_pages: 0,
            total_elements: 0,
            number: 0,
            size: 0,
        }
    }

    /// Wrap a complete list as a single page.
    #[must_use]
    pub fn single(content: Vec<T>) -> Self {
        let len = content.len();
        Self {
            content,
            total_pages: u32::from(len > 0),
            total_elements: len as u64,
            number: 0,
            size: u32::try_from(len).unwrap_or(u32::MAX),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number.saturating_add(1) < self.total_pages
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.number > 0
    }

    /// One-based page number for display.
    #[must_use]
    pub const fn page_number(&self) -> u32 {
        self.number.saturating_add(1)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_pages: self.total_pages,
            total_elements: self.total_elements,
            number: self.number,
            size: self.size,
        }
    }
}
