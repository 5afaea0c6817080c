use axum::http::StatusCode;
use thiserror::Error;
use todo_core::ValidationErrors;
use tracing::{debug, error};

use crate::db::{ConnectionError, StoreError};
use crate::envelope::Operation;

/// Everything a request can fail with once it reaches a handler.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Malformed JSON body: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("Invalid todo data: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Todo not found")]
    NotFound,

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedJson(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Connection(_) | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The envelope message. Server-side detail is logged, never returned.
    pub fn public_message(&self, operation: Operation) -> &'static str {
        match self {
            ApiError::MalformedJson(_) | ApiError::Validation(_) => "Invalid todo data",
            ApiError::NotFound => "Todo not found",
            ApiError::Connection(_) | ApiError::Store(_) => operation.failure_message(),
        }
    }

    pub fn log(&self, operation: Operation) {
        let op = operation.name();
        match self {
            ApiError::Connection(_) | ApiError::Store(_) => {
                error!(op, error = %self, "todo request failed")
            }
            _ => debug!(op, error = %self, "todo request rejected"),
        }
    }
}
