//! Client-side todo list state.
//!
//! # Design
//! `TodoState` is an ordered map keyed by todo id, newest first. It changes
//! only through [`TodoState::apply`], and the only producer of [`Change`]
//! values is [`TodoContainer`], which emits one after the server has
//! confirmed the mutation. A failed call leaves the state untouched.

use indexmap::IndexMap;
use tracing::error;

use crate::client::TodoClient;
use crate::error::ApiError;
use crate::http::Transport;
use crate::types::{CreateTodo, Todo, UpdateTodo};

/// A mutation the server has confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Created(Todo),
    Updated(Todo),
    Deleted(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoState {
    todos: IndexMap<String, Todo>,
}

impl TodoState {
    /// Seed the state from the list the page was rendered with.
    pub fn new(initial: Vec<Todo>) -> Self {
        Self {
            todos: initial.into_iter().map(|todo| (todo.id.clone(), todo)).collect(),
        }
    }

    /// Seed the state from the JSON array embedded in the rendered page.
    pub fn from_page_data(json: &str) -> Result<Self, ApiError> {
        let initial: Vec<Todo> =
            serde_json::from_str(json).map_err(|e| ApiError::DeserializationError(e.to_string()))?;
        Ok(Self::new(initial))
    }

    pub fn apply(&mut self, change: Change) {
        match change {
            Change::Created(todo) => {
                self.todos.shift_insert(0, todo.id.clone(), todo);
            }
            Change::Updated(todo) => {
                if let Some(slot) = self.todos.get_mut(&todo.id) {
                    *slot = todo;
                }
            }
            Change::Deleted(id) => {
                self.todos.shift_remove(&id);
            }
        }
    }

    /// Pure form of [`TodoState::apply`].
    pub fn reduce(mut self, change: Change) -> Self {
        self.apply(change);
        self
    }

    pub fn get(&self, id: &str) -> Option<&Todo> {
        self.todos.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Todo> {
        self.todos.values()
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }
}

/// Owns the list state and routes every mutation intent through the API.
pub struct TodoContainer<T> {
    client: TodoClient,
    transport: T,
    state: TodoState,
}

impl<T: Transport> TodoContainer<T> {
    pub fn new(client: TodoClient, transport: T, initial: TodoState) -> Self {
        Self {
            client,
            transport,
            state: initial,
        }
    }

    pub fn state(&self) -> &TodoState {
        &self.state
    }

    /// Re-fetch the whole list, replacing local state on success.
    pub fn refresh(&mut self) -> Result<(), ApiError> {
        let request = self.client.build_list_todos();
        let todos = self
            .transport
            .execute(request)
            .and_then(|response| self.client.parse_list_todos(response))
            .inspect_err(|e| error!(error = %e, "error loading todos"))?;
        self.state = TodoState::new(todos);
        Ok(())
    }

    pub fn create(&mut self, title: &str, description: Option<&str>) -> Result<(), ApiError> {
        let input = CreateTodo {
            title: title.to_string(),
            description: description.map(str::to_string),
            completed: false,
        };
        let created = self
            .client
            .build_create_todo(&input)
            .and_then(|request| self.transport.execute(request))
            .and_then(|response| self.client.parse_create_todo(response))
            .inspect_err(|e| error!(error = %e, "error creating todo"))?;
        self.state.apply(Change::Created(created));
        Ok(())
    }

    pub fn toggle_complete(&mut self, id: &str, completed: bool) -> Result<(), ApiError> {
        let input = UpdateTodo {
            completed: Some(completed),
            ..UpdateTodo::default()
        };
        let updated = self
            .client
            .build_update_todo(id, &input)
            .and_then(|request| self.transport.execute(request))
            .and_then(|response| self.client.parse_update_todo(response))
            .inspect_err(|e| error!(error = %e, id, "error updating todo"))?;
        self.state.apply(Change::Updated(updated));
        Ok(())
    }

    pub fn delete(&mut self, id: &str) -> Result<(), ApiError> {
        let request = self.client.build_delete_todo(id);
        self.transport
            .execute(request)
            .and_then(|response| self.client.parse_delete_todo(response))
            .inspect_err(|e| error!(error = %e, id, "error deleting todo"))?;
        self.state.apply(Change::Deleted(id.to_string()));
        Ok(())
    }
}
