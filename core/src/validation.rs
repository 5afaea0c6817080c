//! Field rules shared by the server handlers and the client form.
//!
//! # Design
//! Validation is a set of parsers over untyped JSON. `NewTodo::parse` and
//! `TodoPatch::parse` never mutate their input; they either return a typed
//! value whose fields already satisfy every rule, or a non-empty
//! `ValidationErrors` list in field order (`title`, `description`,
//! `completed`). Unknown fields are ignored.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;

const TITLE_REQUIRED: &str = "Title is required";
const TITLE_TOO_LONG: &str = "Title must be less than 100 characters";
const TITLE_NOT_STRING: &str = "Title must be a string";
const DESCRIPTION_TOO_LONG: &str = "Description must be less than 500 characters";
const DESCRIPTION_NOT_STRING: &str = "Description must be a string";
const COMPLETED_NOT_BOOL: &str = "Completed must be a boolean";
const NOT_AN_OBJECT: &str = "Expected an object";

/// A single rule violation for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Non-empty list of field errors, in the order the fields were checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    fn single(error: FieldError) -> Self {
        Self { errors: vec![error] }
    }

    fn from_vec(errors: Vec<FieldError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    pub fn first(&self) -> &FieldError {
        &self.errors[0]
    }

    /// The message a form shows next to the offending field.
    pub fn first_message(&self) -> &'static str {
        self.first().message
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Always `false`: there is at least one error by construction.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first())?;
        if self.errors.len() > 1 {
            write!(f, " (and {} more)", self.errors.len() - 1)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// A trimmed title of 1 to 100 characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Title(String);

impl Title {
    pub fn parse(raw: &str) -> Result<Self, FieldError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(FieldError::new("title", TITLE_REQUIRED));
        }
        if trimmed.chars().count() > TITLE_MAX_CHARS {
            return Err(FieldError::new("title", TITLE_TOO_LONG));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// A trimmed description of at most 500 characters. May be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Description(String);

impl Description {
    pub fn parse(raw: &str) -> Result<Self, FieldError> {
        let trimmed = raw.trim();
        if trimmed.chars().count() > DESCRIPTION_MAX_CHARS {
            return Err(FieldError::new("description", DESCRIPTION_TOO_LONG));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Validated payload for creating a todo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub title: Title,
    pub description: Option<Description>,
    pub completed: bool,
}

impl NewTodo {
    /// Validate already-typed form input.
    pub fn new(
        title: &str,
        description: Option<&str>,
        completed: bool,
    ) -> Result<Self, ValidationErrors> {
        let mut errors = Vec::new();
        let title = Title::parse(title).map_err(|e| errors.push(e)).ok();
        let description = match description {
            Some(raw) => Description::parse(raw).map_err(|e| errors.push(e)).ok(),
            None => None,
        };

        match (title, ValidationErrors::from_vec(errors)) {
            (Some(title), None) => Ok(Self {
                title,
                description,
                completed,
            }),
            (_, Some(errors)) => Err(errors),
            (None, None) => Err(ValidationErrors::single(FieldError::new("title", TITLE_REQUIRED))),
        }
    }

    /// Validate an untyped request body against the create rules.
    pub fn parse(value: &Value) -> Result<Self, ValidationErrors> {
        let object = as_object(value)?;
        let mut errors = Vec::new();

        let title = match object.get("title") {
            None | Some(Value::Null) => {
                errors.push(FieldError::new("title", TITLE_REQUIRED));
                None
            }
            Some(raw) => string_field(raw, "title", TITLE_NOT_STRING, Title::parse, &mut errors),
        };
        let description = optional_string_field(
            object.get("description"),
            "description",
            DESCRIPTION_NOT_STRING,
            Description::parse,
            &mut errors,
        );
        let completed = optional_bool_field(object.get("completed"), &mut errors);

        if let Some(errors) = ValidationErrors::from_vec(errors) {
            return Err(errors);
        }
        match title {
            Some(title) => Ok(Self {
                title,
                description,
                completed: completed.unwrap_or(false),
            }),
            None => Err(ValidationErrors::single(FieldError::new("title", TITLE_REQUIRED))),
        }
    }
}

/// Validated partial update. `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub title: Option<Title>,
    pub description: Option<Description>,
    pub completed: Option<bool>,
}

impl TodoPatch {
    pub fn parse(value: &Value) -> Result<Self, ValidationErrors> {
        let object = as_object(value)?;
        let mut errors = Vec::new();

        let title = optional_string_field(
            object.get("title"),
            "title",
            TITLE_NOT_STRING,
            Title::parse,
            &mut errors,
        );
        let description = optional_string_field(
            object.get("description"),
            "description",
            DESCRIPTION_NOT_STRING,
            Description::parse,
            &mut errors,
        );
        let completed = optional_bool_field(object.get("completed"), &mut errors);

        match ValidationErrors::from_vec(errors) {
            Some(errors) => Err(errors),
            None => Ok(Self {
                title,
                description,
                completed,
            }),
        }
    }

    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }
}

fn as_object(value: &Value) -> Result<&Map<String, Value>, ValidationErrors> {
    value
        .as_object()
        .ok_or_else(|| ValidationErrors::single(FieldError::new("body", NOT_AN_OBJECT)))
}

fn string_field<T>(
    raw: &Value,
    field: &'static str,
    type_message: &'static str,
    parse: fn(&str) -> Result<T, FieldError>,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    match raw.as_str() {
        Some(s) => parse(s).map_err(|e| errors.push(e)).ok(),
        None => {
            errors.push(FieldError::new(field, type_message));
            None
        }
    }
}

fn optional_string_field<T>(
    raw: Option<&Value>,
    field: &'static str,
    type_message: &'static str,
    parse: fn(&str) -> Result<T, FieldError>,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    raw.and_then(|raw| string_field(raw, field, type_message, parse, errors))
}

fn optional_bool_field(raw: Option<&Value>, errors: &mut Vec<FieldError>) -> Option<bool> {
    match raw {
        None => None,
        Some(Value::Bool(b)) => Some(*b),
        Some(_) => {
            errors.push(FieldError::new("completed", COMPLETED_NOT_BOOL));
            None
        }
    }
}
