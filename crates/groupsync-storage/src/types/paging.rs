//! Offset paging shared by every listing.

pub const DEFAULT_PER_PAGE: u32 = 60;
pub const MAX_PER_PAGE: u32 = 200;

/// Zero-based page request. `per_page` is always within `1..=MAX_PER_PAGE`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Page {
    page: u32,
    per_page: u32,
}

impl Page {
    /// Out-of-range `per_page` values are clamped; zero falls back to the default.
    pub fn new(page: u32, per_page: u32) -> Self {
        let per_page = match per_page {
            0 => DEFAULT_PER_PAGE,
            n => n.min(MAX_PER_PAGE),
        };
        Self { page, per_page }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.per_page)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.per_page)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(0, DEFAULT_PER_PAGE)
    }
}
