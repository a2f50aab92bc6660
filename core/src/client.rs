//! Endpoint-bound convenience wrapper around the converter functions.
//!
//! # Design
//! `EmsClient` holds only a resolved `Endpoint` and carries no mutable state
//! between calls. Each EMS action is a `build_json_request` that produces an
//! `HttpRequest` and a `parse_response` that consumes the `HttpResponse`; the
//! caller executes the round-trip in between.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::EmsConfig;
use crate::converter;
use crate::environment::{Endpoint, Environment};
use crate::error::EmsError;
use crate::http::{HttpRequest, HttpResponse};
use crate::result::EmsResult;

/// Synchronous, stateless client for one EMS endpoint.
#[derive(Debug, Clone)]
pub struct EmsClient {
    endpoint: Endpoint,
}

impl EmsClient {
    pub fn new(env: Environment) -> Self {
        Self { endpoint: env.endpoint() }
    }

    pub fn with_endpoint(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }

    pub fn from_config(config: &EmsConfig) -> Result<Self, EmsError> {
        Ok(Self {
            endpoint: config.endpoint()?,
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn build_json_request<T>(&self, model: &T, action: &str) -> Result<HttpRequest, EmsError>
    where
        T: Serialize + ?Sized,
    {
        converter::build_json_request_for(model, action, &self.endpoint)
    }

    /// Parse a bare response body. See [`converter::parse_result_as`].
    pub fn parse_result<T>(&self, body: &str) -> EmsResult<T>
    where
        T: DeserializeOwned,
    {
        converter::parse_result_as(body)
    }

    /// Parse a response including its HTTP status.
    pub fn parse_response<T>(&self, response: HttpResponse) -> EmsResult<T>
    where
        T: DeserializeOwned,
    {
        converter::parse_response_as(&response)
    }
}
