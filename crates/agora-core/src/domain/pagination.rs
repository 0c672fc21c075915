//! Offset pagination arithmetic shared by all listings.

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

/// A validated page request (1-based page number).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    per_page: u64,
}

impl PageRequest {
    /// Build a request, rejecting `page < 1` and sizes outside `1..=100`.
    pub fn new(page: Option<u64>, per_page: Option<u64>) -> Result<Self, String> {
        let page = page.unwrap_or(1);
        let per_page = per_page.unwrap_or(DEFAULT_PAGE_SIZE);
        if page < 1 {
            return Err("page must be greater than or equal to 1".to_string());
        }
        if !(1..=MAX_PAGE_SIZE).contains(&per_page) {
            return Err(format!("page size must be between 1 and {MAX_PAGE_SIZE}"));
        }
        Ok(Self { page, per_page })
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results plus the metadata needed to navigate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page(),
            per_page: request.per_page(),
        }
    }

    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.per_page)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let req = PageRequest::new(None, None).unwrap();
        assert_eq!(req.page(), 1);
        assert_eq!(req.per_page(), DEFAULT_PAGE_SIZE);
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn test_bounds_rejected() {
        assert!(PageRequest::new(Some(0), None).is_err());
        assert!(PageRequest::new(None, Some(0)).is_err());
        assert!(PageRequest::new(None, Some(101)).is_err());
        assert!(PageRequest::new(None, Some(100)).is_ok());
    }

    #[test]
    fn test_total_pages_is_ceiling() {
        let req = PageRequest::new(Some(1), Some(20)).unwrap();
        assert_eq!(Page::<()>::new(vec![], 0, req).total_pages(), 0);
        assert_eq!(Page::<()>::new(vec![], 20, req).total_pages(), 1);
        assert_eq!(Page::<()>::new(vec![], 21, req).total_pages(), 2);
    }

    #[test]
    fn test_navigation_flags() {
        let req = PageRequest::new(Some(2), Some(10)).unwrap();
        assert_eq!(req.offset(), 10);

        let page = Page::<()>::new(vec![], 25, req);
        assert!(page.has_prev());
        assert!(page.has_next());

        let past_end = Page::<()>::new(vec![], 25, PageRequest::new(Some(9), Some(10)).unwrap());
        assert!(!past_end.has_next());
        assert_eq!(past_end.total_pages(), 3);
    }
}
