//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results. Comparing parsed JSON (not raw strings) avoids
//! false negatives from field-ordering differences.

use objects_core::{
    ApiError, CreateOrReplaceRequest, DeleteOutcome, HttpMethod, HttpRequest, HttpResponse, ObjectRecord,
    ObjectsClient,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";

fn client() -> ObjectsClient {
    ObjectsClient::with_base_url(BASE_URL)
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
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

/// Compare method, URL and, when the vector names them, headers and body.
fn check_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.url, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: url");

    match expected.get("headers") {
        Some(headers) => {
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
        None => assert!(req.headers.is_empty(), "{name}: headers should be empty"),
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
    let headers = match sim.get("allow").and_then(Value::as_str) {
        Some(allow) => vec![("allow".to_string(), allow.to_string())],
        None => Vec::new(),
    };
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers,
        body: sim["body"].as_str().unwrap().to_string(),
    }
}

fn check_error(name: &str, err: ApiError, case: &Value) {
    match case["expected_error"].as_str().unwrap() {
        "NotFound" => assert!(err.is_not_found(), "{name}: expected 404, got {err:?}"),
        "RequestFailed" => match err {
            ApiError::RequestFailed { status, allow, .. } => {
                let sim = &case["simulated_response"];
                assert_eq!(status as u64, sim["status"].as_u64().unwrap(), "{name}: status");
                assert_eq!(allow.as_deref(), sim["allow"].as_str(), "{name}: allow");
            }
            other => panic!("{name}: expected RequestFailed, got {other:?}"),
        },
        other => panic!("{name}: unknown expected_error: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[test]
fn create_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/create.json")) {
        let name = case["name"].as_str().unwrap();
        let input: CreateOrReplaceRequest = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c.build_create(&input).unwrap();
        check_request(name, &req, &case["expected_request"]);

        let record = c.parse_create(simulated_response(&case)).unwrap();
        let expected: ObjectRecord = serde_json::from_value(case["expected_result"].clone()).unwrap();
        assert_eq!(record, expected, "{name}: parsed result");
        assert_eq!(record.name, input.name, "{name}: name echoes input");
        assert_eq!(record.data, input.data, "{name}: data echoes input");
    }
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[test]
fn list_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/list.json")) {
        let name = case["name"].as_str().unwrap();

        let req = c.build_list_all();
        check_request(name, &req, &case["expected_request"]);

        let result = c.parse_list(simulated_response(&case));
        if case.get("expected_error").is_some() {
            check_error(name, result.unwrap_err(), &case);
        } else {
            let records = result.unwrap();
            let expected: Vec<ObjectRecord> = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(records, expected, "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Get
// ---------------------------------------------------------------------------

#[test]
fn get_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/get.json")) {
        let name = case["name"].as_str().unwrap();
        let id = case["input_id"].as_str().unwrap();

        let req = c.build_get(id);
        check_request(name, &req, &case["expected_request"]);

        let result = c.parse_get(simulated_response(&case));
        if case.get("expected_error").is_some() {
            check_error(name, result.unwrap_err(), &case);
        } else {
            let record = result.unwrap();
            let expected: ObjectRecord = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(record, expected, "{name}: parsed result");
            assert_eq!(record.id, id, "{name}: id");
        }
    }
}

// ---------------------------------------------------------------------------
// Replace
// ---------------------------------------------------------------------------

#[test]
fn replace_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/replace.json")) {
        let name = case["name"].as_str().unwrap();
        let id = case["input_id"].as_str().unwrap();
        let input: CreateOrReplaceRequest = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c.build_replace(id, &input).unwrap();
        check_request(name, &req, &case["expected_request"]);

        let result = c.parse_replace(simulated_response(&case));
        if case.get("expected_error").is_some() {
            check_error(name, result.unwrap_err(), &case);
        } else {
            let record = result.unwrap();
            let expected: ObjectRecord = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(record, expected, "{name}: parsed result");
            assert_eq!(record.id, id, "{name}: identity unchanged");
            assert_eq!(record.data, input.data, "{name}: data replaced wholesale");
            assert!(record.updated_at().is_some(), "{name}: updatedAt");
        }
    }
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[test]
fn delete_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/delete.json")) {
        let name = case["name"].as_str().unwrap();
        let id = case["input_id"].as_str().unwrap();

        let req = c.build_delete(id);
        check_request(name, &req, &case["expected_request"]);

        let result = c.parse_delete(simulated_response(&case));
        if case.get("expected_error").is_some() {
            check_error(name, result.unwrap_err(), &case);
        } else {
            let outcome = result.unwrap();
            let expected = &case["expected_result"];
            assert_eq!(
                outcome,
                DeleteOutcome {
                    status: expected["status"].as_u64().unwrap() as u16,
                    message: expected["message"].as_str().map(str::to_string),
                },
                "{name}: parsed result"
            );
        }
    }
}
