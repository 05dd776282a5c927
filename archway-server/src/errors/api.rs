use super::{QueryError, RegistryError, ScanError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Scan error: {0}")]
    ScanError(#[from] ScanError),

    #[error("Registry error: {0}")]
    RegistryError(#[from] RegistryError),

    #[error("Query error: {0}")]
    QueryError(#[from] QueryError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}
