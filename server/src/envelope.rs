//! The `{ success, message?, data }` wrapper every API response uses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub data: T,
}

/// The five API operations. Each knows its success status and the messages
/// its envelopes carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Get => "get",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }

    fn success_status(self) -> StatusCode {
        match self {
            Operation::Create => StatusCode::CREATED,
            _ => StatusCode::OK,
        }
    }

    fn success_message(self) -> Option<&'static str> {
        match self {
            Operation::List | Operation::Get => None,
            Operation::Create => Some("Todo created successfully"),
            Operation::Update => Some("Todo updated successfully"),
            Operation::Delete => Some("Todo deleted successfully"),
        }
    }

    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::List => "Failed to retrieve todos",
            Operation::Get => "Failed to retrieve todo",
            Operation::Create => "Failed to create todo",
            Operation::Update => "Failed to update todo",
            Operation::Delete => "Failed to delete todo",
        }
    }

    /// `data` on failure: an empty list for List, `null` otherwise.
    fn empty_data(self) -> Value {
        match self {
            Operation::List => Value::Array(Vec::new()),
            _ => Value::Null,
        }
    }

    /// Turn a handler outcome into the final response. Nothing escapes this
    /// point as an unhandled error.
    pub fn respond<T: Serialize>(self, result: Result<T, ApiError>) -> Response {
        match result {
            Ok(data) => (
                self.success_status(),
                Json(Envelope {
                    success: true,
                    message: self.success_message(),
                    data,
                }),
            )
                .into_response(),
            Err(error) => {
                error.log(self);
                (
                    error.status(),
                    Json(Envelope {
                        success: false,
                        message: Some(error.public_message(self)),
                        data: self.empty_data(),
                    }),
                )
                    .into_response()
            }
        }
    }
}
