//! Client core for the todo service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern), and keeps the client-side list
//! state and component view models on top of that.
//!
//! # Design
//! - `TodoClient` is stateless; it holds only `base_url`.
//! - Each CRUD operation is split into `build_*` and `parse_*` so the I/O
//!   boundary is explicit. `TodoContainer` is the one place that crosses it,
//!   through a host-supplied `Transport`.
//! - `validation` holds the field rules and is shared with the server so the
//!   form and the handlers reject exactly the same input.

pub mod client;
pub mod components;
pub mod error;
pub mod http;
pub mod state;
pub mod types;
pub mod validation;

pub use client::TodoClient;
pub use components::{TodoForm, TodoItem, TodoList};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use state::{Change, TodoContainer, TodoState};
pub use types::{CreateTodo, Envelope, Todo, UpdateTodo};
pub use validation::{Description, FieldError, NewTodo, Title, TodoPatch, ValidationErrors};
