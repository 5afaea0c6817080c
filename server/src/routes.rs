//! `/api/todos` handlers.
//!
//! Each handler runs parse → validate (mutations only) → ensure connected →
//! one repository call, and hands the outcome to [`Operation::respond`].

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header::CONTENT_TYPE, HeaderMap},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::Value;
use todo_core::{NewTodo, TodoPatch};

use crate::envelope::Operation;
use crate::error::ApiError;
use crate::model::{Todo, TodoId};
use crate::AppState;

pub async fn list_todos(State(state): State<AppState>) -> Response {
    Operation::List.respond(list(&state).await)
}

/// JSON bodies get the envelope. A plain form post from the home page is
/// sent back to `/` once the todo exists.
pub async fn create_todo(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    if !is_form_post(&headers) {
        return Operation::Create.respond(create(&state, &body).await);
    }
    match create_from_form(&state, &body).await {
        Ok(_) => Redirect::to("/").into_response(),
        Err(e) => Operation::Create.respond::<Todo>(Err(e)),
    }
}

pub async fn get_todo(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    Operation::Get.respond(get(&state, &TodoId::from(id)).await)
}

pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    Operation::Update.respond(update(&state, &TodoId::from(id), &body).await)
}

pub async fn delete_todo(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    Operation::Delete.respond(delete(&state, &TodoId::from(id)).await)
}

fn parse_body(body: &Bytes) -> Result<Value, ApiError> {
    Ok(serde_json::from_slice(body)?)
}

async fn list(state: &AppState) -> Result<Vec<Todo>, ApiError> {
    let todos = state.pool.ensure_connected().await?;
    Ok(todos.list_all().await?)
}

async fn create(state: &AppState, body: &Bytes) -> Result<Todo, ApiError> {
    let input = NewTodo::parse(&parse_body(body)?)?;
    let todos = state.pool.ensure_connected().await?;
    Ok(todos.create(input).await?)
}

fn is_form_post(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"))
}

/// Form fields arrive as strings; a blank description means none.
async fn create_from_form(state: &AppState, body: &Bytes) -> Result<Todo, ApiError> {
    let mut title = String::new();
    let mut description = String::new();
    for (key, value) in url::form_urlencoded::parse(body) {
        match key.as_ref() {
            "title" => title = value.into_owned(),
            "description" => description = value.into_owned(),
            _ => {}
        }
    }
    let description = Some(description.as_str()).filter(|d| !d.trim().is_empty());
    let input = NewTodo::new(&title, description, false)?;
    let todos = state.pool.ensure_connected().await?;
    Ok(todos.create(input).await?)
}

async fn get(state: &AppState, id: &TodoId) -> Result<Todo, ApiError> {
    let todos = state.pool.ensure_connected().await?;
    todos.get_by_id(id).await?.ok_or(ApiError::NotFound)
}

async fn update(state: &AppState, id: &TodoId, body: &Bytes) -> Result<Todo, ApiError> {
    let patch = TodoPatch::parse(&parse_body(body)?)?;
    let todos = state.pool.ensure_connected().await?;
    todos.update_by_id(id, patch).await?.ok_or(ApiError::NotFound)
}

async fn delete(state: &AppState, id: &TodoId) -> Result<Todo, ApiError> {
    let todos = state.pool.ensure_connected().await?;
    todos.delete_by_id(id).await?.ok_or(ApiError::NotFound)
}
