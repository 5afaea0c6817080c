use async_trait::async_trait;
use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use todo_server::db::{ConnectionError, Connector, Todos};
use todo_server::{app, AppState};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

async fn send(app: &Router, request: Request<String>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    (status, body_json(resp).await)
}

async fn create(app: &Router, body: &str) -> Value {
    let (status, json) = send(app, json_request("POST", "/api/todos", body)).await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json["data"].clone()
}

struct Unreachable;

#[async_trait]
impl Connector for Unreachable {
    async fn connect(&self) -> Result<Todos, ConnectionError> {
        Err(ConnectionError::Connect("connection refused".to_string()))
    }
}

const MISSING_ID: &str = "65f0c0ffee0000000000abcd";

// --- list ---

#[tokio::test]
async fn list_todos_empty() {
    let app = app(AppState::in_memory());
    let (status, json) = send(&app, empty_request("GET", "/api/todos")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"success": true, "data": []}));
}

#[tokio::test]
async fn list_is_newest_first() {
    let app = app(AppState::in_memory());
    for title in ["A", "B", "C"] {
        create(&app, &json!({ "title": title }).to_string()).await;
    }

    let (_, json) = send(&app, empty_request("GET", "/api/todos")).await;
    let titles: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["C", "B", "A"]);
}

// --- create ---

#[tokio::test]
async fn create_todo_returns_201_with_trimmed_fields() {
    let app = app(AppState::in_memory());
    let (status, json) = send(
        &app,
        json_request(
            "POST",
            "/api/todos",
            r#"{"title":"  Buy milk  ","description":" 2 liters "}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Todo created successfully");
    let todo = &json["data"];
    assert_eq!(todo["title"], "Buy milk");
    assert_eq!(todo["description"], "2 liters");
    assert_eq!(todo["completed"], false);
    assert!(todo["_id"].as_str().is_some_and(|id| !id.is_empty()));
    assert_eq!(todo["createdAt"], todo["updatedAt"]);
}

#[tokio::test]
async fn create_todo_with_completed_true() {
    let app = app(AppState::in_memory());
    let todo = create(&app, r#"{"title":"Already done","completed":true}"#).await;
    assert_eq!(todo["completed"], true);
}

#[tokio::test]
async fn invalid_create_bodies_return_400_and_persist_nothing() {
    let app = app(AppState::in_memory());
    let long_title = "x".repeat(101);
    let bodies = [
        r#"{"title":""}"#.to_string(),
        r#"{"title":"   "}"#.to_string(),
        r#"{"description":"no title"}"#.to_string(),
        r#"{"title":42}"#.to_string(),
        r#"{"title":"ok","completed":"yes"}"#.to_string(),
        json!({ "title": long_title }).to_string(),
        json!({ "title": "ok", "description": "d".repeat(501) }).to_string(),
        "[]".to_string(),
        "{not json".to_string(),
    ];

    for body in &bodies {
        let (status, json) = send(&app, json_request("POST", "/api/todos", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(
            json,
            json!({"success": false, "message": "Invalid todo data", "data": null}),
            "{body}"
        );
    }

    let (_, json) = send(&app, empty_request("GET", "/api/todos")).await;
    assert_eq!(json["data"], json!([]));
}

#[tokio::test]
async fn title_of_exactly_100_chars_is_accepted() {
    let app = app(AppState::in_memory());
    let title = "é".repeat(100);
    let todo = create(&app, &json!({ "title": title }).to_string()).await;
    assert_eq!(todo["title"], title);
}

// --- get / update / delete of missing ids ---

#[tokio::test]
async fn missing_ids_return_404() {
    let app = app(AppState::in_memory());
    let not_found = json!({"success": false, "message": "Todo not found", "data": null});

    for id in [MISSING_ID, "not-an-id"] {
        let uri = format!("/api/todos/{id}");

        let (status, json) = send(&app, empty_request("GET", &uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json, not_found);

        let (status, json) = send(&app, json_request("PUT", &uri, r#"{"completed":true}"#)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json, not_found);

        let (status, json) = send(&app, empty_request("DELETE", &uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json, not_found);
    }
}

#[tokio::test]
async fn invalid_update_is_rejected_before_lookup() {
    let app = app(AppState::in_memory());
    let todo = create(&app, r#"{"title":"Keep me"}"#).await;
    let uri = format!("/api/todos/{}", todo["_id"].as_str().unwrap());

    let (status, json) = send(&app, json_request("PUT", &uri, r#"{"title":""}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Invalid todo data");

    let (_, json) = send(&app, empty_request("GET", &uri)).await;
    assert_eq!(json["data"]["title"], "Keep me");
    assert_eq!(json["data"]["updatedAt"], todo["updatedAt"]);
}

// --- update ---

#[tokio::test]
async fn update_only_completed_keeps_other_fields() {
    let app = app(AppState::in_memory());
    let todo = create(&app, r#"{"title":"Walk dog","description":"park"}"#).await;
    let uri = format!("/api/todos/{}", todo["_id"].as_str().unwrap());

    let (status, json) = send(&app, json_request("PUT", &uri, r#"{"completed":true}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Todo updated successfully");
    let updated = &json["data"];
    assert_eq!(updated["title"], "Walk dog");
    assert_eq!(updated["description"], "park");
    assert_eq!(updated["completed"], true);
    assert_eq!(updated["createdAt"], todo["createdAt"]);
    assert_ne!(updated["updatedAt"], todo["updatedAt"]);
}

// --- full lifecycle ---

#[tokio::test]
async fn crud_lifecycle() {
    let app = app(AppState::in_memory());

    // create
    let created = create(&app, r#"{"title":"Buy milk"}"#).await;
    assert_eq!(created["completed"], false);
    let id = created["_id"].as_str().unwrap().to_string();
    let uri = format!("/api/todos/{id}");

    // list
    let (_, json) = send(&app, empty_request("GET", "/api/todos")).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["_id"], id.as_str());

    // get
    let (status, json) = send(&app, empty_request("GET", &uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"success": true, "data": created}));

    // update
    let (status, json) = send(&app, json_request("PUT", &uri, r#"{"completed":true}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["completed"], true);
    let updated = json["data"].clone();

    // delete returns the removed document
    let (status, json) = send(&app, empty_request("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!({"success": true, "message": "Todo deleted successfully", "data": updated})
    );

    // get after delete
    let (status, _) = send(&app, empty_request("GET", &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // delete again
    let (status, json) = send(&app, empty_request("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Todo not found");

    // list after delete
    let (_, json) = send(&app, empty_request("GET", "/api/todos")).await;
    assert_eq!(json["data"], json!([]));
}

// --- store unavailable ---

#[tokio::test]
async fn unreachable_store_returns_500_envelopes() {
    let app = app(AppState::new(Unreachable));

    let (status, json) = send(&app, empty_request("GET", "/api/todos")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json,
        json!({"success": false, "message": "Failed to retrieve todos", "data": []})
    );

    let (status, json) = send(&app, json_request("POST", "/api/todos", r#"{"title":"x"}"#)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json,
        json!({"success": false, "message": "Failed to create todo", "data": null})
    );

    let uri = format!("/api/todos/{MISSING_ID}");
    let (_, json) = send(&app, empty_request("GET", &uri)).await;
    assert_eq!(json["message"], "Failed to retrieve todo");
    let (_, json) = send(&app, json_request("PUT", &uri, r#"{"completed":true}"#)).await;
    assert_eq!(json["message"], "Failed to update todo");
    let (_, json) = send(&app, empty_request("DELETE", &uri)).await;
    assert_eq!(json["message"], "Failed to delete todo");
}

#[tokio::test]
async fn validation_runs_before_connecting() {
    let app = app(AppState::new(Unreachable));
    let (status, json) = send(&app, json_request("POST", "/api/todos", r#"{"title":""}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Invalid todo data");
}

// --- page ---

fn form_request(body: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri("/api/todos")
        .header(
            http::header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        )
        .body(body.to_string())
        .unwrap()
}

#[tokio::test]
async fn home_page_form_post_creates_and_redirects() {
    let app = app(AppState::in_memory());
    let html = body_text(app.clone().oneshot(empty_request("GET", "/")).await.unwrap()).await;
    assert!(html.contains(r#"<form id="todo-form" method="post" action="/api/todos">"#));

    let resp = app
        .clone()
        .oneshot(form_request("title=Buy+milk&description="))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[http::header::LOCATION], "/");

    let (_, json) = send(&app, empty_request("GET", "/api/todos")).await;
    let todo = &json["data"][0];
    assert_eq!(todo["title"], "Buy milk");
    assert!(todo.get("description").is_none());
    assert_eq!(todo["completed"], false);

    let html = body_text(app.oneshot(empty_request("GET", "/")).await.unwrap()).await;
    assert!(html.contains("<h3>Buy milk</h3>"));
}

#[tokio::test]
async fn invalid_form_post_is_rejected() {
    let app = app(AppState::in_memory());
    let (status, json) = send(&app, form_request("title=+++&description=notes")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Invalid todo data");

    let (_, json) = send(&app, empty_request("GET", "/api/todos")).await;
    assert_eq!(json["data"], json!([]));
}

#[tokio::test]
async fn home_page_renders_empty_state() {
    let app = app(AppState::in_memory());
    let resp = app.oneshot(empty_request("GET", "/")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("Todo App"));
    assert!(html.contains("No todos yet"));
}

#[tokio::test]
async fn home_page_lists_todos() {
    let app = app(AppState::in_memory());
    create(&app, r#"{"title":"First"}"#).await;
    create(&app, r#"{"title":"Second"}"#).await;

    let resp = app.oneshot(empty_request("GET", "/")).await.unwrap();
    let html = body_text(resp).await;
    let first = html.find("<h3>First</h3>").unwrap();
    let second = html.find("<h3>Second</h3>").unwrap();
    assert!(second < first);
    assert!(!html.contains("No todos yet"));
}

#[tokio::test]
async fn home_page_degrades_when_store_is_down() {
    let app = app(AppState::new(Unreachable));
    let resp = app.oneshot(empty_request("GET", "/")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("Error loading todos"));
}
