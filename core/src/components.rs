//! View models for the list, item and form components.
//!
//! Components hold only local UI state (input text, in-flight flags, the
//! form's error message). Every mutation intent is handed to a caller-supplied
//! callback, normally a `TodoContainer` method.

use chrono::{DateTime, Utc};
use tracing::error;

use crate::error::ApiError;
use crate::state::TodoState;
use crate::types::Todo;
use crate::validation::NewTodo;

pub const EMPTY_LIST_TITLE: &str = "No todos yet";
pub const EMPTY_LIST_HINT: &str = "Create your first todo to get started.";
const SAVE_FAILED: &str = "Failed to save todo";

/// `Jan 2, 2024, 03:04 PM`
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%b %-d, %Y, %I:%M %p").to_string()
}

/// Whether an item shows its "Updated" stamp next to "Created".
pub fn shows_updated(created_at: &DateTime<Utc>, updated_at: &DateTime<Utc>) -> bool {
    (*updated_at - *created_at).num_milliseconds().abs() > 1000
}

/// Title/description entry form.
#[derive(Debug, Clone)]
pub struct TodoForm {
    pub title: String,
    pub description: String,
    error: Option<String>,
    is_submitting: bool,
    editing: Option<String>,
    button_text: String,
}

impl Default for TodoForm {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoForm {
    pub fn new() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            error: None,
            is_submitting: false,
            editing: None,
            button_text: "Add Todo".to_string(),
        }
    }

    /// A form prefilled from an existing todo. Its fields are kept after a
    /// successful submit.
    pub fn editing(todo: &Todo, button_text: &str) -> Self {
        Self {
            title: todo.title.clone(),
            description: todo.description.clone().unwrap_or_default(),
            error: None,
            is_submitting: false,
            editing: Some(todo.id.clone()),
            button_text: button_text.to_string(),
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn button_text(&self) -> &str {
        &self.button_text
    }

    /// Validate locally, then hand the raw input to `on_submit`.
    ///
    /// Only the first validation message is kept. Returns `true` when the
    /// callback succeeded.
    pub fn submit<F>(&mut self, on_submit: F) -> bool
    where
        F: FnOnce(&str, Option<&str>) -> Result<(), ApiError>,
    {
        let description = Some(self.description.as_str()).filter(|d| !d.is_empty());
        if let Err(errors) = NewTodo::new(&self.title, description, false) {
            self.error = Some(errors.first_message().to_string());
            return false;
        }

        self.error = None;
        self.is_submitting = true;
        let description = Some(self.description.as_str()).filter(|d| !d.is_empty());
        let result = on_submit(&self.title, description);
        self.is_submitting = false;

        match result {
            Ok(()) => {
                if self.editing.is_none() {
                    self.title.clear();
                    self.description.clear();
                }
                true
            }
            Err(e) => {
                let message = e.user_message();
                self.error = Some(if message.is_empty() {
                    SAVE_FAILED.to_string()
                } else {
                    message
                });
                false
            }
        }
    }
}

/// One row of the list with its own in-flight flags.
#[derive(Debug, Clone)]
pub struct TodoItem {
    todo: Todo,
    is_updating: bool,
    is_deleting: bool,
}

impl TodoItem {
    pub fn new(todo: Todo) -> Self {
        Self {
            todo,
            is_updating: false,
            is_deleting: false,
        }
    }

    pub fn todo(&self) -> &Todo {
        &self.todo
    }

    pub fn is_updating(&self) -> bool {
        self.is_updating
    }

    pub fn is_deleting(&self) -> bool {
        self.is_deleting
    }

    pub fn created_label(&self) -> String {
        format!("Created: {}", format_timestamp(&self.todo.created_at))
    }

    pub fn updated_label(&self) -> Option<String> {
        shows_updated(&self.todo.created_at, &self.todo.updated_at)
            .then(|| format!("Updated: {}", format_timestamp(&self.todo.updated_at)))
    }

    /// Ask to flip `completed`. Failures are logged, never shown.
    pub fn toggle_complete<F>(&mut self, on_toggle: F) -> bool
    where
        F: FnOnce(&str, bool) -> Result<(), ApiError>,
    {
        self.is_updating = true;
        let result = on_toggle(&self.todo.id, !self.todo.completed);
        self.is_updating = false;
        match result {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, id = %self.todo.id, "failed to update todo");
                false
            }
        }
    }

    /// Ask to delete. The deleting flag stays set on success since the row
    /// is about to disappear.
    pub fn delete<F>(&mut self, on_delete: F) -> bool
    where
        F: FnOnce(&str) -> Result<(), ApiError>,
    {
        self.is_deleting = true;
        match on_delete(&self.todo.id) {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, id = %self.todo.id, "failed to delete todo");
                self.is_deleting = false;
                false
            }
        }
    }
}

/// The rendered list: either the empty placeholder or one item per todo.
#[derive(Debug, Clone)]
pub enum TodoList {
    Empty,
    Items(Vec<TodoItem>),
}

impl TodoList {
    pub fn from_state(state: &TodoState) -> Self {
        if state.is_empty() {
            TodoList::Empty
        } else {
            TodoList::Items(state.iter().cloned().map(TodoItem::new).collect())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, TodoList::Empty)
    }
}
