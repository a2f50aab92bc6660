//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! enums with explicit discriminants. Conversion functions live here to keep
//! `lib.rs` focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use ems_core::{EmsResult, Environment, FailureKind, HttpMethod};
use serde_json::Value;

/// Opaque handle to an `EmsClient`. C callers receive a pointer to this
/// and pass it back into every client function.
pub struct FfiEmsClient {
    pub(crate) inner: ems_core::EmsClient,
}

/// EMS deployment, passed from C as its integer discriminant.
#[repr(C)]
pub enum FfiEnvironment {
    Production = 0,
    Qa = 1,
    Local = 2,
}

impl FfiEnvironment {
    /// Map a raw discriminant from C. Unknown values yield `None` rather than
    /// an invalid enum.
    pub(crate) fn from_raw(raw: u32) -> Option<Environment> {
        match raw {
            x if x == FfiEnvironment::Production as u32 => Some(Environment::Production),
            x if x == FfiEnvironment::Qa as u32 => Some(Environment::Qa),
            x if x == FfiEnvironment::Local as u32 => Some(Environment::Local),
            _ => None,
        }
    }
}

/// Copy `s` into a C string owned by the caller. Interior NUL bytes cannot be
/// represented and are dropped.
pub(crate) fn to_c_string(s: &str) -> *mut c_char {
    CString::new(s.replace('\0', "")).unwrap_or_default().into_raw()
}

fn opt_c_string(s: Option<&str>) -> *mut c_char {
    s.map(to_c_string).unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Post = 0,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Post => FfiHttpMethod::Post,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `ems_build_json_request`. The C caller executes the request and
/// passes the response back through `ems_parse_response`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: ems_core::HttpRequest) -> *mut Self {
        let url = to_c_string(&req.url);
        let body = opt_c_string(req.body.as_deref());

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .iter()
                .map(|(k, v)| FfiHeader {
                    key: to_c_string(k),
                    value: to_c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url,
            headers,
            headers_len,
            body,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing a request and
/// passes a pointer to `ems_parse_response`. The FFI layer reads but does not
/// free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Failure category in `FfiEmsResult`. `None` on success.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiFailureKind {
    None = 0,
    Parse = 1,
    Remote = 2,
    Http = 3,
    NullArg = 4,
    Panic = 5,
}

impl From<FailureKind> for FfiFailureKind {
    fn from(kind: FailureKind) -> Self {
        match kind {
            FailureKind::Parse => FfiFailureKind::Parse,
            FailureKind::Remote => FfiFailureKind::Remote,
            FailureKind::Http => FfiFailureKind::Http,
        }
    }
}

/// Result envelope for parse operations.
///
/// On success `success` is true, `failure_kind` is `None`, and
/// `payload_json` holds the payload re-encoded as JSON. On failure `message`
/// is always a non-null, human-readable C string. `code` is only meaningful
/// when `has_code` is true; `http_status` is 0 when unknown. Every non-null
/// string is owned by the result and released by `ems_free_result`.
#[repr(C)]
pub struct FfiEmsResult {
    pub success: bool,
    pub failure_kind: FfiFailureKind,
    pub has_code: bool,
    pub code: i64,
    pub http_status: u16,
    pub status: *mut c_char,
    pub token: *mut c_char,
    pub message: *mut c_char,
    pub payload_json: *mut c_char,
}

impl FfiEmsResult {
    pub(crate) fn from_core(result: EmsResult<Value>) -> *mut Self {
        let ffi = match result {
            EmsResult::Success(s) => FfiEmsResult {
                success: true,
                failure_kind: FfiFailureKind::None,
                has_code: false,
                code: 0,
                http_status: 0,
                status: to_c_string(s.status.as_str()),
                token: opt_c_string(s.token.as_deref()),
                message: opt_c_string(s.short_message.as_deref()),
                payload_json: to_c_string(&s.payload.to_string()),
            },
            EmsResult::Failure(f) => FfiEmsResult {
                success: false,
                failure_kind: f.kind.into(),
                has_code: f.code.is_some(),
                code: f.code.unwrap_or_default(),
                http_status: f.http_status.unwrap_or_default(),
                status: std::ptr::null_mut(),
                token: std::ptr::null_mut(),
                message: to_c_string(&f.short_message),
                payload_json: std::ptr::null_mut(),
            },
        };
        Box::into_raw(Box::new(ffi))
    }

    /// Build a failure result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::local_failure(FfiFailureKind::NullArg, &format!("null argument: {name}"))
    }

    /// Build a failure result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::local_failure(FfiFailureKind::Panic, msg)
    }

    fn local_failure(kind: FfiFailureKind, msg: &str) -> *mut Self {
        Box::into_raw(Box::new(FfiEmsResult {
            success: false,
            failure_kind: kind,
            has_code: false,
            code: 0,
            http_status: 0,
            status: std::ptr::null_mut(),
            token: std::ptr::null_mut(),
            message: to_c_string(msg),
            payload_json: std::ptr::null_mut(),
        }))
    }
}
