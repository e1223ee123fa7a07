use popcorn_catalog::CatalogError;
use serde::Serialize;
use thiserror::Error;

/// What a failed fetch leaves behind in a state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum FetchFailure {
    /// The catalog answered "no match"; the message is shown verbatim.
    #[error("{0}")]
    NotFound(String),

    /// Transport or payload problem. Shown as a generic message, the detail is only logged.
    #[error("Something went wrong while fetching movies")]
    Transport { detail: String },
}

impl FetchFailure {
    pub const GENERIC_MESSAGE: &'static str = "Something went wrong while fetching movies";

    /// `None` for [`CatalogError::Cancelled`], which never becomes a visible failure.
    pub fn from_catalog_error(error: CatalogError) -> Option<Self> {
        match error {
            CatalogError::Cancelled => None,
            CatalogError::NotFound(message) => Some(FetchFailure::NotFound(message)),
            other => Some(FetchFailure::Transport { detail: other.to_string() }),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            FetchFailure::NotFound(message) => message,
            FetchFailure::Transport { .. } => Self::GENERIC_MESSAGE,
        }
    }

    /// Transport failures may succeed on a new attempt; "not found" will not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchFailure::Transport { .. })
    }
}
