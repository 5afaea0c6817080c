//! Storage for the `todos` collection.
//!
//! # Design
//! Handlers never talk to a driver directly. They ask the
//! [`ConnectionPool`] for a connected [`TodoRepository`] and call one of its
//! five operations. Each operation touches exactly one document, so the
//! store's per-document atomicity is the only consistency guarantee needed.
//! "Not found" is `Ok(None)`, never an error.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use todo_core::{NewTodo, TodoPatch};

use crate::model::{Todo, TodoId};

pub mod memory;
pub mod mongo;
pub mod pool;

pub use memory::{MemoryConnector, MemoryTodos};
pub use mongo::{MongoConnector, MongoTodos};
pub use pool::ConnectionPool;

/// Name of the collection holding todo documents.
pub const COLLECTION: &str = "todos";

/// Failure to obtain a connected store.
#[derive(Debug, Clone, Error)]
pub enum ConnectionError {
    #[error("store connection string is not set")]
    MissingUri,

    #[error("failed to connect to store: {0}")]
    Connect(String),
}

/// Failure of an individual store operation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store operation failed: {0}")]
    Operation(String),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Operation(err.to_string())
    }
}

/// Typed accessor over the `todos` collection.
#[async_trait]
pub trait TodoRepository: Send + Sync + 'static {
    /// Every todo, newest `createdAt` first.
    async fn list_all(&self) -> Result<Vec<Todo>, StoreError>;

    async fn get_by_id(&self, id: &TodoId) -> Result<Option<Todo>, StoreError>;

    /// Persist a new todo; `createdAt == updatedAt` on the result.
    async fn create(&self, input: NewTodo) -> Result<Todo, StoreError>;

    /// Merge the supplied fields and refresh `updatedAt`.
    async fn update_by_id(&self, id: &TodoId, patch: TodoPatch) -> Result<Option<Todo>, StoreError>;

    /// Remove and return the document.
    async fn delete_by_id(&self, id: &TodoId) -> Result<Option<Todo>, StoreError>;
}

/// Shared handle to a connected repository.
pub type Todos = Arc<dyn TodoRepository>;

/// Produces a connected repository. Called by the pool at most once per
/// successful connection.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn connect(&self) -> Result<Todos, ConnectionError>;
}
