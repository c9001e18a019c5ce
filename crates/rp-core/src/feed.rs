//! # Feed Pagination
//!
//! Deterministic page-slicing shared by the four feed views. Mirrors the
//! forgiving paginator contract the templates rely on: a page request never
//! errors, it clamps.

/// Fixed page size for every feed view.
pub const POSTS_PER_PAGE: i64 = 10;

/// Resolves raw `?page=` input plus a total row count into a concrete slice.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    per_page: i64,
}

/// A resolved page: which page, how many exist, and the LIMIT/OFFSET to
/// hand the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: i64,
    pub num_pages: i64,
    pub limit: i64,
    pub offset: i64,
}

impl Paginator {
    pub fn new(per_page: i64) -> Self {
        debug_assert!(per_page > 0);
        Self { per_page }
    }

    /// Clamping rules:
    /// - absent or non-numeric page → page 1
    /// - numeric but below 1, or past the end → last page
    /// - an empty feed still has exactly one (empty) page
    pub fn resolve(&self, raw_page: Option<&str>, total: i64) -> PageRequest {
        let num_pages = ((total + self.per_page - 1) / self.per_page).max(1);
        let number = match raw_page.map(str::trim).filter(|s| !s.is_empty()) {
            None => 1,
            Some(raw) => match raw.parse::<i64>() {
                Err(_) => 1,
                Ok(n) if n < 1 => num_pages,
                Ok(n) => n.min(num_pages),
            },
        };
        PageRequest {
            number,
            num_pages,
            limit: self.per_page,
            offset: (number - 1) * self.per_page,
        }
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(POSTS_PER_PAGE)
    }
}

impl PageRequest {
    pub fn into_page<T>(self, items: Vec<T>) -> Page<T> {
        Page {
            items,
            number: self.number,
            num_pages: self.num_pages,
        }
    }
}

/// One rendered page of a feed. `T` is whatever row shape the view layer
/// wants to display.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: i64,
    pub num_pages: i64,
}

impl<T> Page<T> {
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn previous_number(&self) -> i64 {
        self.number - 1
    }

    pub fn next_number(&self) -> i64 {
        self.number + 1
    }
}
