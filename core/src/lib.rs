//! JSON request/response converter for the brokerage EMS API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses response bodies into `EmsResult`
//! values without touching the network (host-does-IO pattern). The caller
//! executes the actual HTTP round-trip, keeping the core deterministic.
//!
//! # Design
//! - `Environment` is a closed set of deployments, each with exactly one base
//!   URL and host; `Endpoint` is the resolved pair, optionally overridden by
//!   `EmsConfig`.
//! - `build_json_request` encodes any `Serialize` model as a JSON `POST` and
//!   refuses values JSON cannot represent.
//! - `parse_result` never fails: malformed or error responses become
//!   `EmsResult::Failure`.
//! - `EmsClient` bundles an endpoint with the converter functions.

pub mod client;
pub mod config;
pub mod converter;
mod encode;
pub mod environment;
pub mod error;
pub mod http;
pub mod models;
pub mod result;

pub use client::EmsClient;
pub use config::EmsConfig;
pub use converter::{
    build_json_request, build_json_request_for, parse_response_as, parse_result, parse_result_as,
};
pub use environment::{Endpoint, Environment};
pub use error::EmsError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use result::{EmsFailure, EmsResult, EmsStatus, EmsSuccess, FailureKind};
