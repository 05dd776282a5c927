mod network;
mod scan;
mod system;

pub use network::*;
pub use scan::*;
pub use system::*;

use serde::{Deserialize, Serialize};

use crate::models::Page;

/// Success envelope: the payload's fields are flattened next to `"success": true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error class, e.g. `invalid_argument`
    pub kind: String,
    /// HTTP status code
    pub code: u16,
    /// Human-readable description
    pub message: String,
    /// Correlates an internal error with the server log
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_id: Option<String>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorBody,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> From<&Page<T>> for Pagination {
    fn from(page: &Page<T>) -> Self {
        Self {
            page: page.page,
            per_page: page.per_page,
            total: page.total,
            pages: page.pages(),
            has_next: page.has_next(),
            has_prev: page.has_prev(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Serialize)]
    struct Payload {
        value: u32,
    }

    #[test]
    fn test_envelope_flattens_payload() {
        let json = serde_json::to_value(ApiResponse::ok(Payload { value: 7 })).unwrap();
        assert_eq!(json, json!({ "success": true, "value": 7 }));
    }

    #[test]
    fn test_error_id_omitted_when_absent() {
        let body = ErrorResponse {
            success: false,
            error: ErrorBody {
                kind: "not_found".into(),
                code: 404,
                message: "missing".into(),
                error_id: None,
            },
        };
        let json = serde_json::to_value(body).unwrap();
        assert!(json["error"].get("error_id").is_none());
        assert_eq!(json["success"], false);
    }

    #[test]
    fn test_pagination_from_page() {
        let page = Page::slice(vec![1, 2, 3, 4, 5], 1, 2);
        let pagination = Pagination::from(&page);
        assert_eq!(pagination.pages, 3);
        assert!(pagination.has_next);
        assert!(!pagination.has_prev);
    }
}
