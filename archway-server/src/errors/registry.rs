use archway_api::models::MacAddress;
use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Network {0} not found")]
    NetworkNotFound(MacAddress),

    #[error("Client {0} not found")]
    ClientNotFound(MacAddress),

    #[error("Interface '{0}' not found")]
    InterfaceNotFound(String),
}

impl RegistryError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::NOT_FOUND
    }

    pub fn kind(&self) -> &'static str {
        "not_found"
    }
}
