use thiserror::Error;

/// Uniform failure shape for both catalog request kinds.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The caller cancelled the request. Never shown to the user.
    #[error("request cancelled")]
    Cancelled,

    /// The catalog answered and reported no match. The message is the catalog's own text.
    #[error("{0}")]
    NotFound(String),

    /// Non-2xx status, undecodable body, or a payload missing required fields.
    #[error("invalid catalog response: {0}")]
    InvalidResponse(String),

    /// The catalog could not be reached (connect error, timeout, reset).
    #[error("catalog unreachable: {0}")]
    NetworkFailure(String),
}

impl CatalogError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CatalogError::Cancelled)
    }

    /// A business outcome rather than a transport failure; retrying will not help.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound(_))
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        // Request URLs carry the api key
        let e = e.without_url();
        if e.is_decode() || e.is_body() {
            CatalogError::InvalidResponse(e.to_string())
        } else {
            CatalogError::NetworkFailure(e.to_string())
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::InvalidResponse(e.to_string())
    }
}
