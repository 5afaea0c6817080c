//! Error types for the todo API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the todo does not exist" from "the server refused the request." Every
//! other failure reported by the server lands in `HttpError` carrying the
//! envelope's `message`, which is what the UI shows to the user.

use thiserror::Error;

/// Errors returned by `TodoClient` parse methods and the state container.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404 for the requested todo.
    #[error("Todo not found")]
    NotFound,

    /// The server answered with an unexpected status or `success: false`.
    #[error("HTTP {status}: {message}")]
    HttpError { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The host could not complete the HTTP round-trip.
    #[error("transport failed: {0}")]
    Transport(String),
}

impl ApiError {
    /// Short text suitable for showing next to the control that failed.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::NotFound => "Todo not found".to_string(),
            ApiError::HttpError { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
