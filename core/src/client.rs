//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url`. Each CRUD operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method that
//! consumes an `HttpResponse` and unwraps the `{success, message, data}`
//! envelope. A `success: false` body or an unexpected status becomes an
//! `ApiError` carrying the server's message.

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateTodo, Envelope, Todo, UpdateTodo};

const API_PATH: &str = "/api/todos";

/// Synchronous, stateless client for the todo API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn collection_url(&self) -> String {
        format!("{}{API_PATH}", self.base_url)
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}{API_PATH}/{id}", self.base_url)
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.collection_url(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_get_todo(&self, id: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.item_url(id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: self.collection_url(),
            headers: json_headers(),
            body: Some(body),
        })
    }

    pub fn build_update_todo(&self, id: &str, input: &UpdateTodo) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Put,
            path: self.item_url(id),
            headers: json_headers(),
            body: Some(body),
        })
    }

    pub fn build_delete_todo(&self, id: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.item_url(id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        unwrap_envelope(response, 200, "Failed to retrieve todos")
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        unwrap_envelope(response, 200, "Failed to retrieve todo")
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        unwrap_envelope(response, 201, "Failed to create todo")
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        unwrap_envelope(response, 200, "Failed to update todo")
    }

    /// Returns the document the server removed.
    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        unwrap_envelope(response, 200, "Failed to delete todo")
    }
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

/// Map a response to its payload, or to the matching `ApiError`.
fn unwrap_envelope<T: DeserializeOwned>(
    response: HttpResponse,
    expected: u16,
    fallback: &str,
) -> Result<T, ApiError> {
    if response.status != expected {
        if response.status == 404 {
            return Err(ApiError::NotFound);
        }
        return Err(ApiError::HttpError {
            status: response.status,
            message: envelope_message(&response.body).unwrap_or_else(|| fallback.to_string()),
        });
    }

    let envelope: Envelope<T> = serde_json::from_str(&response.body)
        .map_err(|e| ApiError::DeserializationError(e.to_string()))?;
    if !envelope.success {
        return Err(ApiError::HttpError {
            status: response.status,
            message: envelope.message.unwrap_or_else(|| fallback.to_string()),
        });
    }
    envelope
        .data
        .ok_or_else(|| ApiError::DeserializationError("envelope has no data".to_string()))
}

fn envelope_message(body: &str) -> Option<String> {
    serde_json::from_str::<Envelope<serde_json::Value>>(body)
        .ok()
        .and_then(|envelope| envelope.message)
}
