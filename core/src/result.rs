//! Typed outcome of an EMS call.
//!
//! # Design
//! `EmsResult` is a plain value built fresh by the parser: either the EMS
//! accepted the call (`Success`, carrying the decoded payload) or it did not
//! (`Failure`, carrying a diagnostic). Malformed bodies, EMS-reported errors
//! and unexpected HTTP statuses all land in `Failure` so callers have a
//! single place to check.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// The `status` field of an EMS envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmsStatus {
    Success,
    Error,
    InformationNeeded,
    ReviewOrder,
    /// Any status this crate does not know by name, kept verbatim.
    Other(String),
}

impl EmsStatus {
    pub fn as_str(&self) -> &str {
        match self {
            EmsStatus::Success => "SUCCESS",
            EmsStatus::Error => "ERROR",
            EmsStatus::InformationNeeded => "INFORMATION_NEEDED",
            EmsStatus::ReviewOrder => "REVIEW_ORDER",
            EmsStatus::Other(s) => s,
        }
    }
}

/// Known statuses match case-insensitively; anything else is kept verbatim.
impl From<&str> for EmsStatus {
    fn from(s: &str) -> Self {
        [
            EmsStatus::Success,
            EmsStatus::Error,
            EmsStatus::InformationNeeded,
            EmsStatus::ReviewOrder,
        ]
        .into_iter()
        .find(|known| known.as_str().eq_ignore_ascii_case(s))
        .unwrap_or_else(|| EmsStatus::Other(s.to_string()))
    }
}

impl fmt::Display for EmsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a call did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The body was not JSON, or not the envelope shape we expect.
    Parse,
    /// The EMS answered with a well-formed error envelope.
    Remote,
    /// The transport returned a non-2xx status without an EMS error envelope.
    Http,
}

/// Payload and metadata of an accepted call.
#[derive(Debug, Clone, PartialEq)]
pub struct EmsSuccess<T> {
    pub status: EmsStatus,
    pub token: Option<String>,
    pub short_message: Option<String>,
    pub long_messages: Vec<String>,
    pub payload: T,
}

/// Diagnostic for a call that did not succeed. `short_message` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{short_message}")]
pub struct EmsFailure {
    pub kind: FailureKind,
    pub code: Option<i64>,
    pub http_status: Option<u16>,
    pub short_message: String,
    pub long_messages: Vec<String>,
}

impl EmsFailure {
    pub(crate) fn parse(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Parse,
            code: None,
            http_status: None,
            short_message: message.into(),
            long_messages: Vec::new(),
        }
    }
}

/// Outcome of parsing an EMS response. The payload defaults to raw JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum EmsResult<T = Value> {
    Success(EmsSuccess<T>),
    Failure(EmsFailure),
}

impl<T> EmsResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, EmsResult::Success(_))
    }

    pub fn success(&self) -> Option<&EmsSuccess<T>> {
        match self {
            EmsResult::Success(s) => Some(s),
            EmsResult::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&EmsFailure> {
        match self {
            EmsResult::Success(_) => None,
            EmsResult::Failure(f) => Some(f),
        }
    }

    pub fn payload(&self) -> Option<&T> {
        self.success().map(|s| &s.payload)
    }

    /// Status reported by the EMS, if the envelope was readable.
    pub fn status(&self) -> Option<&EmsStatus> {
        self.success().map(|s| &s.status)
    }

    /// The short message of either variant, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            EmsResult::Success(s) => s.short_message.as_deref(),
            EmsResult::Failure(f) => Some(&f.short_message),
        }
    }

    pub fn into_result(self) -> Result<EmsSuccess<T>, EmsFailure> {
        match self {
            EmsResult::Success(s) => Ok(s),
            EmsResult::Failure(f) => Err(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_names_roundtrip() {
        for name in ["SUCCESS", "ERROR", "INFORMATION_NEEDED", "REVIEW_ORDER", "HALTED"] {
            assert_eq!(EmsStatus::from(name).as_str(), name);
        }
        assert_eq!(EmsStatus::from("HALTED"), EmsStatus::Other("HALTED".to_string()));
    }

    #[test]
    fn known_statuses_ignore_case() {
        assert_eq!(EmsStatus::from("error"), EmsStatus::Error);
        assert_eq!(EmsStatus::from("Review_Order"), EmsStatus::ReviewOrder);
        assert_eq!(EmsStatus::from("halted"), EmsStatus::Other("halted".to_string()));
    }

    #[test]
    fn failure_accessors() {
        let result: EmsResult = EmsResult::Failure(EmsFailure::parse("bad body"));
        assert!(!result.is_success());
        assert_eq!(result.message(), Some("bad body"));
        assert!(result.payload().is_none());
        assert_eq!(result.failure().unwrap().kind, FailureKind::Parse);
        assert_eq!(result.into_result().unwrap_err().to_string(), "bad body");
    }

    #[test]
    fn success_accessors() {
        let result = EmsResult::Success(EmsSuccess {
            status: EmsStatus::ReviewOrder,
            token: Some("t".to_string()),
            short_message: None,
            long_messages: Vec::new(),
            payload: 7u32,
        });
        assert!(result.is_success());
        assert_eq!(result.payload(), Some(&7));
        assert_eq!(result.status(), Some(&EmsStatus::ReviewOrder));
        assert_eq!(result.message(), None);
        assert_eq!(result.into_result().unwrap().token.as_deref(), Some("t"));
    }
}
