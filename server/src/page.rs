//! Server-rendered home page.
//!
//! The page lists every todo newest first and embeds the same list as JSON in
//! `#initial-todos` so a client can seed its state without a second request.
//! A store failure still renders the page, with an inline error panel.

use axum::{extract::State, response::Html};
use html_escape::{encode_double_quoted_attribute, encode_text};
use todo_core::components::{format_timestamp, shows_updated, EMPTY_LIST_HINT, EMPTY_LIST_TITLE};
use todo_core::validation::{DESCRIPTION_MAX_CHARS, TITLE_MAX_CHARS};

use crate::envelope::Operation;
use crate::error::ApiError;
use crate::model::Todo;
use crate::AppState;

const LOAD_FAILED_TITLE: &str = "Error loading todos";
const LOAD_FAILED_HINT: &str = "Please check your database connection and try again.";

/// Wires the form and each row to the JSON API. Without it the form still
/// posts as `application/x-www-form-urlencoded` and the server redirects
/// back here.
const PAGE_SCRIPT: &str = r#"
const api = async (method, path, body) => {
  const init = { method };
  if (body !== undefined) {
    init.headers = { "content-type": "application/json" };
    init.body = JSON.stringify(body);
  }
  const response = await fetch(path, init);
  const envelope = await response.json().catch(() => ({ success: false }));
  if (!envelope.success) throw new Error(envelope.message || "Request failed");
  return envelope.data;
};

const form = document.getElementById("todo-form");
const formError = document.getElementById("form-error");
form.addEventListener("submit", async (event) => {
  event.preventDefault();
  const fields = new FormData(form);
  const body = { title: fields.get("title") };
  const description = fields.get("description");
  if (description && description.trim()) body.description = description;
  const button = form.querySelector("button");
  button.disabled = true;
  try {
    await api("POST", "/api/todos", body);
    location.reload();
  } catch (error) {
    formError.textContent = error.message || "Failed to save todo";
    formError.hidden = false;
  } finally {
    button.disabled = false;
  }
});

document.querySelectorAll("li.todo").forEach((row) => {
  const path = "/api/todos/" + encodeURIComponent(row.dataset.id);
  const toggle = row.querySelector("input.toggle");
  const remove = row.querySelector("button.delete");
  toggle.addEventListener("change", async () => {
    toggle.disabled = true;
    try {
      await api("PUT", path, { completed: toggle.checked });
      row.classList.toggle("completed", toggle.checked);
    } catch (error) {
      console.error("Error updating todo:", error);
      toggle.checked = !toggle.checked;
    } finally {
      toggle.disabled = false;
    }
  });
  remove.addEventListener("click", async () => {
    remove.disabled = true;
    try {
      await api("DELETE", path);
      row.remove();
    } catch (error) {
      console.error("Error deleting todo:", error);
      remove.disabled = false;
    }
  });
});
"#;

pub async fn home_page(State(state): State<AppState>) -> Html<String> {
    let todos = load(&state)
        .await
        .inspect_err(|e| e.log(Operation::List))
        .ok();
    Html(render(todos.as_deref()))
}

async fn load(state: &AppState) -> Result<Vec<Todo>, ApiError> {
    let todos = state.pool.ensure_connected().await?;
    Ok(todos.list_all().await?)
}

/// `None` means the list could not be loaded.
pub fn render(todos: Option<&[Todo]>) -> String {
    let body = match todos {
        Some([]) => notice("empty", EMPTY_LIST_TITLE, EMPTY_LIST_HINT),
        Some(todos) => {
            let items: String = todos.iter().map(render_item).collect();
            format!("<ul class=\"todo-list\">\n{items}</ul>\n")
        }
        None => notice("error", LOAD_FAILED_TITLE, LOAD_FAILED_HINT),
    };

    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n<meta charset=\"utf-8\">\n<title>Todo App</title>\n</head>\n\
         <body>\n<main>\n\
         <h1>Todo App</h1>\n\
         {form}\
         <section id=\"todos\">\n{body}</section>\n\
         <script type=\"application/json\" id=\"initial-todos\">{data}</script>\n\
         <script>{PAGE_SCRIPT}</script>\n\
         </main>\n</body>\n</html>\n",
        form = render_form(),
        data = page_data(todos.unwrap_or_default()),
    )
}

fn notice(class: &str, title: &str, hint: &str) -> String {
    format!(
        "<div class=\"{class}\">\n<h2>{}</h2>\n<p>{}</p>\n</div>\n",
        encode_text(title),
        encode_text(hint)
    )
}

fn render_form() -> String {
    format!(
        "<form id=\"todo-form\" method=\"post\" action=\"/api/todos\">\n\
         <input name=\"title\" placeholder=\"What needs to be done?\" maxlength=\"{TITLE_MAX_CHARS}\" required>\n\
         <textarea name=\"description\" placeholder=\"Description (optional)\" maxlength=\"{DESCRIPTION_MAX_CHARS}\"></textarea>\n\
         <p id=\"form-error\" role=\"alert\" hidden></p>\n\
         <button type=\"submit\">Add Todo</button>\n\
         </form>\n"
    )
}

fn render_item(todo: &Todo) -> String {
    let mut html = format!(
        "<li class=\"todo{}\" data-id=\"{}\">\n",
        if todo.completed { " completed" } else { "" },
        encode_double_quoted_attribute(todo.id.as_str())
    );
    html.push_str(&format!(
        "<input type=\"checkbox\" class=\"toggle\"{}>\n<h3>{}</h3>\n",
        if todo.completed { " checked" } else { "" },
        encode_text(&todo.title)
    ));
    if let Some(description) = todo.description.as_deref().filter(|d| !d.is_empty()) {
        html.push_str(&format!("<p>{}</p>\n", encode_text(description)));
    }
    html.push_str(&format!(
        "<small>Created: {}",
        format_timestamp(&todo.created_at)
    ));
    if shows_updated(&todo.created_at, &todo.updated_at) {
        html.push_str(&format!(" · Updated: {}", format_timestamp(&todo.updated_at)));
    }
    html.push_str("</small>\n<button type=\"button\" class=\"delete\">Delete</button>\n</li>\n");
    html
}

/// JSON for the embedded `<script>`; `</` is escaped so a title cannot close
/// the element early.
fn page_data(todos: &[Todo]) -> String {
    serde_json::to_string(todos)
        .unwrap_or_else(|_| "[]".to_string())
        .replace("</", "<\\/")
}
