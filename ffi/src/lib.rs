//! C-ABI wrapper around `ems-core`.
//!
//! # Overview
//! Exposes environment resolution, JSON request building and response
//! parsing through `extern "C"` functions, so a native host app (e.g. a
//! mobile trading SDK) can prepare EMS calls and read their results while
//! keeping its own HTTP stack.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Models cross the boundary as JSON text. The text is validated but sent
//!   as written, so numbers beyond `f64`/`u64` reach the EMS unchanged.
//! - A single `FfiEmsResult` envelope conveys success payloads and failures.
//! - The C caller owns all returned pointers and must call the matching
//!   `ems_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;

use ems_core::{Endpoint, HttpResponse};
use serde_json::value::RawValue;

use types::*;

/// Read a non-null C string as UTF-8. Invalid UTF-8 yields `None`.
///
/// # Safety
/// `s` must be non-null and point to a NUL-terminated string.
unsafe fn read_str<'a>(s: *const c_char) -> Option<&'a str> {
    CStr::from_ptr(s).to_str().ok()
}

// ---------------------------------------------------------------------------
// Environment resolution
// ---------------------------------------------------------------------------

/// Base URL for `env` (an `FfiEnvironment` discriminant).
///
/// Returns null for an unknown environment. Free with `ems_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn ems_base_url(env: u32) -> *mut c_char {
    catch_unwind(|| match FfiEnvironment::from_raw(env) {
        Some(env) => to_c_string(env.base_url()),
        None => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Host header value for `env`.
///
/// Returns null for an unknown environment. Free with `ems_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn ems_host(env: u32) -> *mut c_char {
    catch_unwind(|| match FfiEnvironment::from_raw(env) {
        Some(env) => to_c_string(env.host()),
        None => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client bound to the endpoint of `env`.
///
/// Returns null for an unknown environment. Free with `ems_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn ems_client_new(env: u32) -> *mut FfiEmsClient {
    catch_unwind(|| match FfiEnvironment::from_raw(env) {
        Some(env) => Box::into_raw(Box::new(FfiEmsClient {
            inner: ems_core::EmsClient::new(env),
        })),
        None => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Create a client bound to an explicit base URL.
///
/// `host` may be null, in which case the authority of `base_url` is used.
/// Returns null if `base_url` is null or not an `http(s)` URL.
#[unsafe(no_mangle)]
pub extern "C" fn ems_client_with_endpoint(base_url: *const c_char, host: *const c_char) -> *mut FfiEmsClient {
    catch_unwind(|| {
        if base_url.is_null() {
            return std::ptr::null_mut();
        }
        let Some(url) = (unsafe { read_str(base_url) }) else {
            return std::ptr::null_mut();
        };
        let endpoint = if host.is_null() {
            Endpoint::from_url(url)
        } else {
            match unsafe { read_str(host) } {
                Some(host) => Endpoint::new(url, host),
                None => return std::ptr::null_mut(),
            }
        };
        match endpoint {
            Ok(endpoint) => Box::into_raw(Box::new(FfiEmsClient {
                inner: ems_core::EmsClient::with_endpoint(endpoint),
            })),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `ems_client_new` or `ems_client_with_endpoint`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn ems_client_free(client: *mut FfiEmsClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

/// Build a JSON `POST` of `model_json` to `action`.
///
/// Returns null if any argument is null, `model_json` is not valid JSON, or
/// `action` is empty or invalid. Free with `ems_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn ems_build_json_request(
    client: *const FfiEmsClient,
    model_json: *const c_char,
    action: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() || model_json.is_null() || action.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let (Some(model), Some(action)) = (unsafe { read_str(model_json) }, unsafe { read_str(action) }) else {
            return std::ptr::null_mut();
        };
        let model: Box<RawValue> = match serde_json::from_str(model) {
            Ok(v) => v,
            Err(_) => return std::ptr::null_mut(),
        };
        match client.inner.build_json_request(&model, action) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Parse
// ---------------------------------------------------------------------------

/// Parse a bare response body.
///
/// Never returns null. A null `body` yields a `NullArg` failure.
#[unsafe(no_mangle)]
pub extern "C" fn ems_parse_result(body: *const c_char) -> *mut FfiEmsResult {
    catch_unwind(|| {
        if body.is_null() {
            return FfiEmsResult::null_arg("body");
        }
        let body = unsafe { CStr::from_ptr(body) }.to_string_lossy();
        FfiEmsResult::from_core(ems_core::parse_result(&body))
    })
    .unwrap_or_else(|_| FfiEmsResult::panic("panic in ems_parse_result"))
}

/// Parse an HTTP response, taking its status into account.
///
/// Never returns null. A null `body` inside `response` is read as empty.
#[unsafe(no_mangle)]
pub extern "C" fn ems_parse_response(
    client: *const FfiEmsClient,
    response: *const FfiHttpResponse,
) -> *mut FfiEmsResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiEmsResult::null_arg("client");
        }
        if response.is_null() {
            return FfiEmsResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        let body = if resp.body.is_null() {
            String::new()
        } else {
            unsafe { CStr::from_ptr(resp.body) }.to_string_lossy().into_owned()
        };
        let core_resp = HttpResponse {
            status: resp.status,
            headers: Vec::new(),
            body,
        };
        FfiEmsResult::from_core(client.inner.parse_response(core_resp))
    })
    .unwrap_or_else(|_| FfiEmsResult::panic("panic in ems_parse_response"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by `ems_build_json_request`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn ems_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.url);
        free_c_string(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(req.headers, req.headers_len as usize))
            };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    });
}

/// Free an `FfiEmsResult` returned by any `ems_parse_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn ems_free_result(result: *mut FfiEmsResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.status);
        free_c_string(result.token);
        free_c_string(result.message);
        free_c_string(result.payload_json);
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn ems_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| free_c_string(s));
    }
}

fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
