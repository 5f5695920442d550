//! List query parameters shared by every admin collection.

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page the backend serves.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Pagination, keyword search and extra filters for a list call.
///
/// Out-of-range values are clamped rather than rejected: `page` is 1-based,
/// `page_size` is kept within `1..=MAX_PAGE_SIZE`, and a blank keyword is
/// dropped from the query string entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    page: u32,
    page_size: u32,
    keyword: Option<String>,
    filters: Vec<(String, String)>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            keyword: None,
            filters: Vec::new(),
        }
    }
}

impl ListQuery {
    /// First page, default size, no search.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a 1-based page.
    #[must_use]
    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Rows per page.
    #[must_use]
    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Free-text search.
    #[must_use]
    pub fn keyword(mut self, keyword: impl AsRef<str>) -> Self {
        let keyword = keyword.as_ref().trim();
        self.keyword = (!keyword.is_empty()).then(|| keyword.to_owned());
        self
    }

    /// Add an endpoint-specific filter, e.g. `("role_id", "3")`.
    ///
    /// Blank values are ignored, matching an unset filter control.
    #[must_use]
    pub fn filter(mut self, key: impl Into<String>, value: impl AsRef<str>) -> Self {
        let value = value.as_ref().trim();
        if !value.is_empty() {
            self.filters.push((key.into(), value.to_owned()));
        }
        self
    }

    /// Current 1-based page.
    #[must_use]
    pub fn current_page(&self) -> u32 {
        self.page
    }

    /// Current page size.
    #[must_use]
    pub fn current_page_size(&self) -> u32 {
        self.page_size
    }

    /// The query for the page after this one.
    #[must_use]
    pub fn next_page(&self) -> Self {
        let mut next = self.clone();
        next.page = self.page.saturating_add(1);
        next
    }

    /// Query string pairs, in a stable order.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_owned(), self.page.to_string()),
            ("page_size".to_owned(), self.page_size.to_string()),
        ];
        if let Some(ref keyword) = self.keyword {
            pairs.push(("keyword".to_owned(), keyword.clone()));
        }
        pairs.extend(self.filters.iter().cloned());
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_owned(), v.to_owned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(
            ListQuery::new().to_pairs(),
            vec![pair("page", "1"), pair("page_size", "20")]
        );
    }

    #[test]
    fn test_clamping() {
        let q = ListQuery::new().page(0).page_size(500);
        assert_eq!(q.current_page(), 1);
        assert_eq!(q.current_page_size(), MAX_PAGE_SIZE);
        assert_eq!(ListQuery::new().page_size(0).current_page_size(), 1);
    }

    #[test]
    fn test_keyword_trimmed_and_blank_omitted() {
        let q = ListQuery::new().keyword("  admin ");
        assert!(q.to_pairs().contains(&pair("keyword", "admin")));

        let q = q.keyword("   ");
        assert!(q.to_pairs().iter().all(|(k, _)| k != "keyword"));
    }

    #[test]
    fn test_filters_follow_paging() {
        let q = ListQuery::new()
            .page(3)
            .filter("role_id", "7")
            .filter("is_active", " ");
        assert_eq!(
            q.to_pairs(),
            vec![pair("page", "3"), pair("page_size", "20"), pair("role_id", "7")]
        );
        assert_eq!(q.next_page().current_page(), 4);
    }
}
