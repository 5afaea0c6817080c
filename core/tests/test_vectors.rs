//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and either the expected parse result or the expected error. Comparing
//! parsed JSON (not raw strings) avoids false negatives from field-ordering
//! differences.

use serde::de::DeserializeOwned;
use serde_json::Value;
use todo_core::{ApiError, CreateTodo, HttpMethod, HttpRequest, HttpResponse, Todo, TodoClient, UpdateTodo};

const BASE_URL: &str = "http://localhost:3000";

fn client() -> TodoClient {
    TodoClient::new(BASE_URL)
}

fn load(raw: &str) -> Vec<Value> {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn check_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.path, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: path");

    if let Some(headers) = expected.get("headers") {
        let expected_headers: Vec<(String, String)> = headers
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let arr = h.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(req.headers, expected_headers, "{name}: headers");
    }

    match expected.get("body") {
        Some(body) => {
            let req_body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(&req_body, body, "{name}: body");
        }
        None => assert!(req.body.is_none(), "{name}: body should be None"),
    }
}

fn simulated_response(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse::new(
        sim["status"].as_u64().unwrap() as u16,
        sim["body"].as_str().unwrap(),
    )
}

/// Compare a parse outcome against `expected_result` or `expected_error`.
fn check_outcome<T>(name: &str, case: &Value, result: Result<T, ApiError>)
where
    T: DeserializeOwned + PartialEq + std::fmt::Debug,
{
    let Some(expected_error) = case.get("expected_error") else {
        let expected: T = serde_json::from_value(case["expected_result"].clone()).unwrap();
        assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        return;
    };

    let err = result.err().unwrap_or_else(|| panic!("{name}: expected an error"));
    match expected_error["kind"].as_str().unwrap() {
        "NotFound" => assert!(matches!(err, ApiError::NotFound), "{name}: expected NotFound"),
        "HttpError" => match err {
            ApiError::HttpError { status, message } => {
                assert_eq!(u64::from(status), expected_error["status"].as_u64().unwrap(), "{name}: status");
                assert_eq!(message, expected_error["message"].as_str().unwrap(), "{name}: message");
            }
            other => panic!("{name}: expected HttpError, got {other:?}"),
        },
        other => panic!("{name}: unknown expected_error: {other}"),
    }
}

#[test]
fn create_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/create.json")) {
        let name = case["name"].as_str().unwrap();
        let input: CreateTodo = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c.build_create_todo(&input).unwrap();
        check_request(name, &req, &case["expected_request"]);
        check_outcome(name, &case, c.parse_create_todo(simulated_response(&case)));
    }
}

#[test]
fn list_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/list.json")) {
        let name = case["name"].as_str().unwrap();

        check_request(name, &c.build_list_todos(), &case["expected_request"]);
        check_outcome::<Vec<Todo>>(name, &case, c.parse_list_todos(simulated_response(&case)));
    }
}

#[test]
fn get_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/get.json")) {
        let name = case["name"].as_str().unwrap();
        let id = case["input_id"].as_str().unwrap();

        check_request(name, &c.build_get_todo(id), &case["expected_request"]);
        check_outcome(name, &case, c.parse_get_todo(simulated_response(&case)));
    }
}

#[test]
fn update_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/update.json")) {
        let name = case["name"].as_str().unwrap();
        let id = case["input_id"].as_str().unwrap();
        let input: UpdateTodo = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c.build_update_todo(id, &input).unwrap();
        check_request(name, &req, &case["expected_request"]);
        check_outcome(name, &case, c.parse_update_todo(simulated_response(&case)));
    }
}

#[test]
fn delete_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/delete.json")) {
        let name = case["name"].as_str().unwrap();
        let id = case["input_id"].as_str().unwrap();

        check_request(name, &c.build_delete_todo(id), &case["expected_request"]);
        check_outcome(name, &case, c.parse_delete_todo(simulated_response(&case)));
    }
}
