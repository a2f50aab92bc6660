//! Verify the converter against JSON test vectors stored in `test-vectors/`.
//!
//! Each build vector names an environment, an action and a model, and the
//! request that must come out. Each parse vector is a raw body and the result
//! that must come out. Bodies are compared as parsed JSON, not raw strings,
//! so field ordering does not matter.

use ems_core::{build_json_request, parse_result, Environment, FailureKind, HttpMethod};
use serde_json::Value;

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "POST" => HttpMethod::Post,
        other => panic!("unknown method: {other}"),
    }
}

fn parse_kind(s: &str) -> FailureKind {
    match s {
        "Parse" => FailureKind::Parse,
        "Remote" => FailureKind::Remote,
        "Http" => FailureKind::Http,
        other => panic!("unknown failure kind: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

#[test]
fn build_request_vectors() {
    let raw = include_str!("../../test-vectors/build_request.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let env: Environment = case["environment"].as_str().unwrap().parse().unwrap();
        let action = case["action"].as_str().unwrap();
        let expected = &case["expected_request"];

        let req = build_json_request(&case["model"], action, env).unwrap();
        assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, expected["url"].as_str().unwrap(), "{name}: url");
        assert!(req.url.starts_with(env.base_url()), "{name}: url prefix");

        let expected_headers: Vec<(String, String)> = expected["headers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let arr = h.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(req.headers, expected_headers, "{name}: headers");

        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, expected["body"], "{name}: body");
        assert_eq!(body, case["model"], "{name}: body reproduces model");
    }
}

// ---------------------------------------------------------------------------
// Parse
// ---------------------------------------------------------------------------

#[test]
fn parse_result_vectors() {
    let raw = include_str!("../../test-vectors/parse_result.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let expected = &case["expected"];
        let result = parse_result(case["body"].as_str().unwrap());

        if expected["success"].as_bool().unwrap() {
            let success = result
                .success()
                .unwrap_or_else(|| panic!("{name}: expected success, got {:?}", result.failure()));
            assert_eq!(success.status.as_str(), expected["status"].as_str().unwrap(), "{name}: status");
            assert_eq!(success.payload, expected["payload"], "{name}: payload");
            if let Some(token) = expected.get("token") {
                assert_eq!(success.token.as_deref(), token.as_str(), "{name}: token");
            }
            if let Some(message) = expected.get("message") {
                assert_eq!(success.short_message.as_deref(), message.as_str(), "{name}: message");
            }
        } else {
            let failure = result
                .failure()
                .unwrap_or_else(|| panic!("{name}: expected failure"));
            assert_eq!(failure.kind, parse_kind(expected["kind"].as_str().unwrap()), "{name}: kind");
            assert!(!failure.short_message.is_empty(), "{name}: message must not be empty");
            if let Some(code) = expected.get("code") {
                assert_eq!(failure.code, code.as_i64(), "{name}: code");
            }
            if let Some(message) = expected.get("message") {
                assert_eq!(failure.short_message, message.as_str().unwrap(), "{name}: message");
            }
            if let Some(long) = expected.get("long_messages") {
                let long: Vec<String> = serde_json::from_value(long.clone()).unwrap();
                assert_eq!(failure.long_messages, long, "{name}: long messages");
            }
        }
    }
}
