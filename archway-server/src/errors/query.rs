use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter { name: &'static str, message: String },

    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

impl QueryError {
    pub fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        QueryError::InvalidParameter {
            name,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    pub fn kind(&self) -> &'static str {
        "invalid_argument"
    }
}
