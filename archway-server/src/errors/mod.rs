pub mod api;
pub mod query;
pub mod registry;
pub mod scan;

pub use api::ApiError;
pub use query::QueryError;
pub use registry::RegistryError;
pub use scan::ScanError;

use archway_api::restful::{ErrorBody, ErrorResponse};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

fn internal(detail: &dyn std::fmt::Display) -> (StatusCode, &'static str, String, Option<String>) {
    let error_id = Uuid::new_v4();
    tracing::error!(error_id = ?error_id, "Internal error: {}", detail);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal",
        "Internal server error".to_string(),
        Some(error_id.to_string()),
    )
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message, error_id) = match self {
            ApiError::ScanError(e @ ScanError::Internal(_)) => internal(&e),
            ApiError::ScanError(e) => (e.status_code(), e.kind(), e.to_string(), None),
            ApiError::RegistryError(e) => (e.status_code(), e.kind(), e.to_string(), None),
            ApiError::QueryError(e) => (e.status_code(), e.kind(), e.to_string(), None),
            ApiError::DatabaseError(e) => internal(&format!("database: {e}")),
            ApiError::InternalError(e) => internal(&e),
        };

        if status.is_client_error() {
            tracing::debug!("Rejected request ({kind}): {message}");
        }

        let body = Json(ErrorResponse {
            success: false,
            error: ErrorBody {
                kind: kind.to_string(),
                code: status.as_u16(),
                message,
                error_id,
            },
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::Value;

    use super::*;

    async fn render(error: ApiError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_taxonomy_maps_to_status_and_kind() {
        let cases = [
            (ApiError::from(ScanError::InvalidArgument("x".into())), 400, "invalid_argument"),
            (ApiError::from(ScanError::AlreadyRunning(Uuid::nil())), 409, "already_running"),
            (ApiError::from(ScanError::AdapterUnavailable("wlan0".into())), 503, "adapter_unavailable"),
            (ApiError::from(ScanError::Timeout), 504, "timeout"),
            (ApiError::from(RegistryError::InterfaceNotFound("wlan9".into())), 404, "not_found"),
            (ApiError::from(QueryError::invalid("page", "must be >= 1")), 400, "invalid_argument"),
        ];

        for (error, code, kind) in cases {
            let (status, json) = render(error).await;
            assert_eq!(status.as_u16(), code);
            assert_eq!(json["success"], false);
            assert_eq!(json["error"]["kind"], kind);
            assert_eq!(json["error"]["code"], code);
            assert!(json["error"].get("error_id").is_none());
        }
    }

    #[tokio::test]
    async fn test_internal_errors_hide_detail() {
        let (status, json) = render(ApiError::from(anyhow::anyhow!("secret detail"))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"]["kind"], "internal");
        assert_eq!(json["error"]["message"], "Internal server error");
        assert!(json["error"]["error_id"].is_string());
    }
}
