//! HTTP contract tests for the Gemini client against a mock server.
//!
//! These cover the boundary behaviors the panel relies on: answer text
//! extraction, API error JSON mapping, empty responses, and network
//! failure - all as values, never panics.

use httpmock::prelude::*;
use nebula_gemini_client::{GeminiClient, SolveError, DEFAULT_MODEL};

fn client_for(server: &MockServer) -> GeminiClient {
    GeminiClient::new("test-key", DEFAULT_MODEL, 0.2).with_api_base(&server.base_url())
}

#[test]
fn test_solve_returns_answer_text() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path(format!("/v1beta/models/{}:generateContent", DEFAULT_MODEL))
            .header("x-goog-api-key", "test-key")
            .json_body_includes(r#"{"generationConfig": {"temperature": 0.2}}"#);
        then.status(200).json_body(serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [{ "text": "The answer is **4**." }]
                }
            }]
        }));
    });

    let answer = client_for(&server).solve("what is 2+2?").unwrap();
    assert_eq!(answer, "The answer is **4**.");
    mock.assert();
}

#[test]
fn test_request_embeds_question_in_prompt() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .body_includes("User Request: \\\"integrate x^2\\\"");
        then.status(200).json_body(serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "x^3/3 + C" }] }
            }]
        }));
    });

    client_for(&server).solve("integrate x^2").unwrap();
    mock.assert();
}

#[test]
fn test_api_error_json_is_mapped() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST);
        then.status(429).json_body(serde_json::json!({
            "error": { "message": "Resource has been exhausted" }
        }));
    });

    let err = client_for(&server).solve("anything").unwrap_err();
    match err {
        SolveError::Api { status, message } => {
            assert_eq!(status, 429);
            assert!(message.contains("exhausted"));
        }
        other => panic!("Expected Api error, got {:?}", other),
    }
}

#[test]
fn test_non_json_error_body_is_preserved() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST);
        then.status(500).body("upstream blew up");
    });

    let err = client_for(&server).solve("anything").unwrap_err();
    match err {
        SolveError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "upstream blew up");
        }
        other => panic!("Expected Api error, got {:?}", other),
    }
}

#[test]
fn test_no_candidates_is_empty_response() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST);
        then.status(200).json_body(serde_json::json!({ "candidates": [] }));
    });

    let err = client_for(&server).solve("anything").unwrap_err();
    assert!(matches!(err, SolveError::EmptyResponse));
}

#[test]
fn test_whitespace_only_answer_is_empty_response() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST);
        then.status(200).json_body(serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "   \n" }] }
            }]
        }));
    });

    let err = client_for(&server).solve("anything").unwrap_err();
    assert!(matches!(err, SolveError::EmptyResponse));
}

#[test]
fn test_connection_failure_is_network_error() {
    // Port 9 (discard) is not listening; the connect must fail fast
    let client =
        GeminiClient::new("test-key", DEFAULT_MODEL, 0.2).with_api_base("http://127.0.0.1:9");
    let err = client.solve("anything").unwrap_err();
    assert!(matches!(err, SolveError::Network(_)));
}
