//! This modules defines the common functionality for paging data.

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of transactions per page when not specified in a request.
    pub default_page_size: u64,
    /// The largest page size a client may request.
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

impl PaginationConfig {
    /// Get the page number to fetch, falling back to the default page.
    ///
    /// Pages start from 1, so a requested page of 0 is treated as page 1.
    pub fn page(&self, requested: Option<u64>) -> u64 {
        requested.unwrap_or(self.default_page).max(1)
    }

    /// Get the page size to use, falling back to the default page size and
    /// clamping it to `1..=max_page_size`.
    pub fn page_size(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size.max(1))
    }
}
