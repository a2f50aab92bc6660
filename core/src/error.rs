//! Error types for the EMS converter.
//!
//! # Design
//! Only failures that must stop the caller synchronously live here: a model
//! that cannot be encoded, an unusable action, or bad configuration. Problems
//! with a response body never surface as `EmsError`; the parser folds them
//! into a failed `EmsResult` instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmsError {
    /// The request model could not be encoded as JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The action name was empty, so there is nothing to call.
    #[error("action name is empty")]
    EmptyAction,

    /// The action would not resolve to a path beneath the endpoint's base URL.
    #[error("invalid action name: {0:?}")]
    InvalidAction(String),

    /// A configured environment name is not one of the known deployments.
    #[error("unknown EMS environment: {0}")]
    UnknownEnvironment(String),

    /// Configuration could not be read or is invalid.
    #[error("config error: {0}")]
    Config(String),
}
