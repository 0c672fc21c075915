//! Response envelopes shared by every endpoint.

use serde::{Deserialize, Serialize};

use agora_core::domain::Page;

/// Standard envelope: `{success, message, data, error}`.
///
/// `errors` lists individual problems of a failed validation and is omitted
/// otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
            errors: Vec::new(),
        }
    }
}

impl ApiResponse<()> {
    /// Success without a payload (`data: null`).
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            error: None,
            errors: Vec::new(),
        }
    }

    pub fn failure(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error: Some(error.into()),
            errors: Vec::new(),
        }
    }

    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = errors;
        self
    }
}

/// Comment listings: the envelope with flat pagination fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Vec<T>,
    pub error: Option<String>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn from_page<S>(page: Page<S>, message: impl Into<String>) -> Self
    where
        T: From<S>,
    {
        Self {
            success: true,
            message: message.into(),
            total: page.total,
            page: page.page,
            page_size: page.per_page,
            total_pages: page.total_pages(),
            data: page.items.into_iter().map(T::from).collect(),
            error: None,
        }
    }
}

/// Pagination block of post listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

/// `data` of post listings: `{items, pagination}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostPage<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> PostPage<T> {
    pub fn from_page<S>(page: Page<S>) -> Self
    where
        T: From<S>,
    {
        let pagination = Pagination {
            total: page.total,
            page: page.page,
            limit: page.per_page,
            total_pages: page.total_pages(),
            has_next: page.has_next(),
            has_prev: page.has_prev(),
        };
        Self {
            items: page.items.into_iter().map(T::from).collect(),
            pagination,
        }
    }
}

/// `data` wrapper for plain, unpaginated lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Items<T> {
    pub items: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::domain::PageRequest;

    #[test]
    fn test_envelope_shape() {
        let json = serde_json::to_value(ApiResponse::ok(3, "Done")).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Done");
        assert_eq!(json["data"], 3);
        assert!(json["error"].is_null());
        assert!(json.get("errors").is_none());

        let failure = ApiResponse::failure("Validation failed", "bad")
            .with_errors(vec!["a".into(), "b".into()]);
        let json = serde_json::to_value(failure).unwrap();
        assert_eq!(json["success"], false);
        assert!(json["data"].is_null());
        assert_eq!(json["errors"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_post_page_pagination() {
        let req = PageRequest::new(Some(2), Some(2)).unwrap();
        let page = Page::new(vec![1u32, 2], 5, req);
        let out: PostPage<u32> = PostPage::from_page(page);

        assert_eq!(
            out.pagination,
            Pagination {
                total: 5,
                page: 2,
                limit: 2,
                total_pages: 3,
                has_next: true,
                has_prev: true,
            }
        );
    }

    #[test]
    fn test_comment_page_is_flat() {
        let page = Page::new(Vec::<u32>::new(), 0, PageRequest::default());
        let json = serde_json::to_value(PaginatedResponse::<u32>::from_page(page, "ok")).unwrap();
        assert_eq!(json["total"], 0);
        assert_eq!(json["page_size"], 20);
        assert_eq!(json["total_pages"], 0);
        assert_eq!(json["data"].as_array().map(Vec::len), Some(0));
    }
}
