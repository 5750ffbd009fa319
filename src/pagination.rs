//! Page arithmetic and keyword matching for listing endpoints.

/// Number of restaurants returned per page.
pub const DEFAULT_PAGE_SIZE: i64 = 2;

/// PageRequest
///
/// A 1-based page of fixed size. Construction never fails: anything that is not a
/// positive integer collapses to page 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    /// Builds a request from the raw `page` query parameter.
    pub fn from_query(page: Option<&str>) -> Self {
        let page = page
            .and_then(|p| p.trim().parse::<i64>().ok())
            .unwrap_or(1);
        Self::new(page, DEFAULT_PAGE_SIZE)
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        self.page_size.saturating_mul(self.page - 1)
    }

    /// Applies the window to an already ordered sequence.
    pub fn slice<T, I>(&self, items: I) -> Vec<T>
    where
        I: IntoIterator<Item = T>,
    {
        items
            .into_iter()
            .skip(usize::try_from(self.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(self.limit()).unwrap_or(0))
            .collect()
    }
}

/// Case-insensitive substring match used by keyword search.
pub fn matches_keyword(name: &str, keyword: Option<&str>) -> bool {
    match keyword {
        None => true,
        Some(k) => name.to_lowercase().contains(&k.to_lowercase()),
    }
}

/// Builds an `ILIKE` pattern that matches `keyword` literally anywhere in the value.
pub fn like_pattern(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len() + 2);
    escaped.push('%');
    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Normalizes the raw `keyword` parameter; blank means no filter. Any other
/// keyword is matched verbatim, surrounding whitespace included.
pub fn normalize_keyword(keyword: Option<String>) -> Option<String> {
    keyword.filter(|k| !k.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults_and_garbage() {
        assert_eq!(PageRequest::from_query(None), PageRequest::default());
        assert_eq!(PageRequest::from_query(Some("abc")).page, 1);
        assert_eq!(PageRequest::from_query(Some("0")).page, 1);
        assert_eq!(PageRequest::from_query(Some("-4")).page, 1);
        assert_eq!(PageRequest::from_query(Some("3")).page, 3);
    }

    #[test]
    fn test_offsets() {
        let p = PageRequest::new(3, 2);
        assert_eq!(p.offset(), 4);
        assert_eq!(p.limit(), 2);
    }

    #[test]
    fn test_slice_windows() {
        let records = vec![1, 2, 3, 4, 5];
        assert_eq!(PageRequest::new(1, 2).slice(records.clone()), vec![1, 2]);
        assert_eq!(PageRequest::new(3, 2).slice(records.clone()), vec![5]);
        assert!(PageRequest::new(4, 2).slice(records).is_empty());
    }

    #[test]
    fn test_keyword_matching() {
        assert!(matches_keyword("Burger Palace", Some("burger")));
        assert!(matches_keyword("Burger Palace", Some("PAL")));
        assert!(!matches_keyword("Burger Palace", Some("pizza")));
        assert!(matches_keyword("anything", None));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("cafe"), "%cafe%");
        assert_eq!(like_pattern("100%_off"), "%100\\%\\_off%");
    }

    #[test]
    fn test_blank_keyword_is_none() {
        assert_eq!(normalize_keyword(Some("   ".to_string())), None);
        assert_eq!(normalize_keyword(None), None);
        assert_eq!(normalize_keyword(Some(" x ".to_string())), Some(" x ".to_string()));
    }
}
