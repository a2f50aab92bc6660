//! Stateless JSON request builder and response parser for the EMS API.
//!
//! # Design
//! Every EMS action is a `POST` of a JSON model to `<base url><action>`. The
//! build side fails loudly when the model cannot be encoded, because sending
//! a half-encoded order is worse than sending nothing. The parse side never
//! fails: anything unexpected in the body becomes `EmsResult::Failure`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::encode;
use crate::environment::{Endpoint, Environment};
use crate::error::EmsError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, ACCEPT, APPLICATION_JSON, CONTENT_TYPE, HOST};
use crate::result::{EmsFailure, EmsResult, EmsStatus, EmsSuccess, FailureKind};

/// Longest slice of a non-JSON error body kept in a failure, in characters.
const MAX_BODY_EXCERPT: usize = 512;

/// Build a JSON `POST` of `model` to `action` in `env`.
pub fn build_json_request<T>(model: &T, action: &str, env: Environment) -> Result<HttpRequest, EmsError>
where
    T: Serialize + ?Sized,
{
    build_json_request_for(model, action, &env.endpoint())
}

/// Build a JSON `POST` of `model` to `action` on an explicit endpoint.
pub fn build_json_request_for<T>(model: &T, action: &str, endpoint: &Endpoint) -> Result<HttpRequest, EmsError>
where
    T: Serialize + ?Sized,
{
    let url = action_url(endpoint, action)?;
    let body = encode::to_json(model)?;
    debug!(action, url = %url, bytes = body.len(), "built EMS request");
    Ok(HttpRequest {
        method: HttpMethod::Post,
        url,
        headers: vec![
            (CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string()),
            (ACCEPT.to_string(), APPLICATION_JSON.to_string()),
            (HOST.to_string(), endpoint.host().to_string()),
        ],
        body: Some(body),
    })
}

/// Parse an EMS response body, keeping the payload as raw JSON.
pub fn parse_result(body: &str) -> EmsResult {
    parse_result_as(body)
}

/// Parse an EMS response body into a typed payload.
///
/// The payload is the envelope's `data` member when present, otherwise the
/// whole envelope object.
pub fn parse_result_as<T>(body: &str) -> EmsResult<T>
where
    T: DeserializeOwned,
{
    let result = decode_envelope(body).map_or_else(EmsResult::Failure, classify);
    if let EmsResult::Failure(f) = &result {
        match f.kind {
            FailureKind::Parse => warn!(error = %f.short_message, "could not parse EMS response"),
            _ => debug!(code = ?f.code, message = %f.short_message, "EMS reported an error"),
        }
    }
    result
}

/// Parse a full HTTP response. Non-2xx statuses always fail; an EMS error
/// envelope in the body is kept with the HTTP status attached.
pub fn parse_response_as<T>(response: &HttpResponse) -> EmsResult<T>
where
    T: DeserializeOwned,
{
    let result = parse_result_as(&response.body);
    if response.is_success() {
        return result;
    }
    let failure = match result {
        EmsResult::Failure(mut f) if f.kind == FailureKind::Remote => {
            f.http_status = Some(response.status);
            f
        }
        _ => http_failure(response),
    };
    warn!(status = response.status, "EMS call returned a non-success HTTP status");
    EmsResult::Failure(failure)
}

/// Resolve `action` beneath the endpoint's base path. Leading slashes are
/// dropped so they cannot reset the path; nothing else is rewritten.
fn action_url(endpoint: &Endpoint, action: &str) -> Result<String, EmsError> {
    let relative = action.trim_start_matches('/');
    if relative.trim().is_empty() {
        return Err(EmsError::EmptyAction);
    }
    if relative.trim() != relative {
        return Err(EmsError::InvalidAction(action.to_string()));
    }
    // `./` keeps a colon in the first segment from reading as a scheme.
    let url = endpoint
        .url()
        .join(&format!("./{relative}"))
        .map_err(|_| EmsError::InvalidAction(action.to_string()))?;
    if !url.as_str().starts_with(endpoint.base_url()) {
        return Err(EmsError::InvalidAction(action.to_string()));
    }
    Ok(url.as_str().to_owned())
}

fn decode_envelope(body: &str) -> Result<Map<String, Value>, EmsFailure> {
    if body.trim().is_empty() {
        return Err(EmsFailure::parse("response body is empty"));
    }
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(EmsFailure::parse(format!(
            "expected a JSON object in the response, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(EmsFailure::parse(format!("response is not valid JSON: {e}"))),
    }
}

fn classify<T>(mut envelope: Map<String, Value>) -> EmsResult<T>
where
    T: DeserializeOwned,
{
    let status = envelope.get("status").and_then(Value::as_str).map(EmsStatus::from);
    let succeeded = match (envelope.get("success").and_then(Value::as_bool), &status) {
        (Some(flag), _) => flag,
        (None, Some(s)) => *s != EmsStatus::Error,
        (None, None) => {
            return EmsResult::Failure(EmsFailure::parse("response has neither `success` nor `status`"));
        }
    };
    let short_message = first_string(&envelope, &["shortMessage", "error", "message"]);
    let long_messages = string_list(envelope.get("longMessages"));

    if !succeeded {
        let status = status.unwrap_or(EmsStatus::Error);
        return EmsResult::Failure(EmsFailure {
            kind: FailureKind::Remote,
            code: envelope.get("code").and_then(error_code),
            http_status: None,
            short_message: short_message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| format!("EMS request failed with status {status}")),
            long_messages,
        });
    }

    let status = status.unwrap_or(EmsStatus::Success);
    let token = envelope.get("token").and_then(Value::as_str).map(str::to_string);
    let payload = match envelope.remove("data") {
        Some(data) => data,
        None => Value::Object(envelope),
    };
    match serde_json::from_value(payload) {
        Ok(payload) => EmsResult::Success(EmsSuccess {
            status,
            token,
            short_message,
            long_messages,
            payload,
        }),
        Err(e) => EmsResult::Failure(EmsFailure::parse(format!("response payload has an unexpected shape: {e}"))),
    }
}

fn http_failure(response: &HttpResponse) -> EmsFailure {
    let excerpt: String = response.body.trim().chars().take(MAX_BODY_EXCERPT).collect();
    EmsFailure {
        kind: FailureKind::Http,
        code: None,
        http_status: Some(response.status),
        short_message: format!("EMS returned HTTP {}", response.status),
        long_messages: if excerpt.is_empty() { Vec::new() } else { vec![excerpt] },
    }
}

fn first_string(envelope: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| envelope.get(*k).and_then(Value::as_str))
        .map(str::to_string)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).map(str::to_string).collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// EMS codes are integers, but some gateways send them as strings.
fn error_code(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
