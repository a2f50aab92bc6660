//! Environment selection and endpoint overrides.
//!
//! Read from the `[ems]` table of a TOML file:
//!
//! ```toml
//! [ems]
//! environment = "qa"
//! base_url = "http://127.0.0.1:8080/api/v1/"   # optional
//! host = "ems.qa.tradingticket.com"            # optional
//! ```
//!
//! or from `EMS_ENVIRONMENT`, `EMS_BASE_URL` and `EMS_HOST`.

use std::path::Path;

use serde::Deserialize;

use crate::environment::{Endpoint, Environment};
use crate::error::EmsError;

pub const ENV_ENVIRONMENT: &str = "EMS_ENVIRONMENT";
pub const ENV_BASE_URL: &str = "EMS_BASE_URL";
pub const ENV_HOST: &str = "EMS_HOST";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmsConfig {
    pub environment: Environment,
    /// Replaces the environment's base URL when set.
    pub base_url: Option<String>,
    /// Replaces the `Host` header value when set. Without it, an overridden
    /// base URL supplies its own authority as the host.
    pub host: Option<String>,
}

impl Default for EmsConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Production,
            base_url: None,
            host: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    ems: RawEmsConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEmsConfig {
    environment: Option<String>,
    base_url: Option<String>,
    host: Option<String>,
}

impl TryFrom<RawEmsConfig> for EmsConfig {
    type Error = EmsError;

    fn try_from(raw: RawEmsConfig) -> Result<Self, Self::Error> {
        let environment = match raw.environment.as_deref() {
            Some(name) => name.parse()?,
            None => Environment::Production,
        };
        Ok(Self {
            environment,
            base_url: non_empty(raw.base_url),
            host: non_empty(raw.host),
        })
    }
}

impl EmsConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, EmsError> {
        let file: ConfigFile = toml::from_str(content).map_err(|e| EmsError::Config(e.to_string()))?;
        file.ems.try_into()
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EmsError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| EmsError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Read `EMS_ENVIRONMENT`, `EMS_BASE_URL` and `EMS_HOST` from the process
    /// environment. Unset variables fall back to production defaults.
    pub fn from_env() -> Result<Self, EmsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`EmsConfig::from_env`] with a caller-supplied variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, EmsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        RawEmsConfig {
            environment: lookup(ENV_ENVIRONMENT),
            base_url: lookup(ENV_BASE_URL),
            host: lookup(ENV_HOST),
        }
        .try_into()
    }

    /// Resolve the endpoint requests should target.
    pub fn endpoint(&self) -> Result<Endpoint, EmsError> {
        match (self.base_url.as_deref(), self.host.as_deref()) {
            (None, None) => Ok(self.environment.endpoint()),
            (Some(url), Some(host)) => Endpoint::new(url, host),
            (Some(url), None) => Endpoint::from_url(url),
            (None, Some(host)) => Endpoint::new(self.environment.base_url(), host),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
