//! Error types for the auth-bridge crate.
//!
//! These are the Rust-level failures raised along the invocation path. None of
//! them reach the host directly: the runner converts every one of them into an
//! [`ErrorRecord`](crate::ErrorRecord) before serialising.

use thiserror::Error;

/// Errors raised while checking the command-line arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CliError {
    /// The binary was not invoked with exactly `<username> <password>`.
    #[error("expected {expected} arguments (<username> <password>), got {actual}")]
    WrongArgumentCount {
        /// Number of positional arguments required.
        expected: usize,
        /// Number of positional arguments supplied.
        actual: usize,
    },

    /// An argument is not valid Unicode and cannot be sent to the server.
    #[error("argument {position} is not valid Unicode")]
    NotUnicode {
        /// One-based position of the offending argument.
        position: usize,
    },
}

/// Errors raised while resolving the KeyAuth application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The configuration layers could not be loaded.
    #[error("failed to load configuration: {message}")]
    Load {
        /// Description of the loader failure.
        message: String,
    },

    /// A required value is absent from every configuration source.
    #[error("missing required configuration value {key}")]
    Missing {
        /// Environment variable naming the value.
        key: &'static str,
    },

    /// A required value still holds a template placeholder.
    #[error("configuration value {key} is a placeholder: '{value}'")]
    Placeholder {
        /// Environment variable naming the value.
        key: &'static str,
        /// The placeholder text found.
        value: String,
    },

    /// The API endpoint is not a valid URL.
    #[error("invalid API URL '{value}': {message}")]
    InvalidUrl {
        /// Raw value supplied.
        value: String,
        /// Parser error message.
        message: String,
    },

    /// The request timeout is zero.
    #[error("KEYAUTH_TIMEOUT_SECS must be greater than zero")]
    ZeroTimeout,
}

/// Ordinary faults raised by an authentication client.
///
/// Their display text is routed through the classifier exactly like text the
/// client writes to the console before terminating, so the wording matters:
/// keep it aligned with the classifier patterns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientFault {
    /// The HTTP client could not be constructed.
    #[error("failed to initialise authentication client: {message}")]
    Build {
        /// Underlying error message.
        message: String,
    },

    /// The request did not complete before the client timeout.
    #[error("request timed out: {message}")]
    Timeout {
        /// Underlying error message.
        message: String,
    },

    /// The authentication server could not be reached.
    #[error("connection failed: {message}")]
    Connect {
        /// Underlying error message.
        message: String,
    },

    /// Any other transport failure.
    #[error("network error: {message}")]
    Transport {
        /// Underlying error message.
        message: String,
    },

    /// The server replied with something that is not a KeyAuth payload.
    ///
    /// The display text omits `detail`: decoder messages name payload fields
    /// such as `username` and would mislead the classifier.
    #[error("malformed response from authentication server")]
    MalformedResponse {
        /// Decoder error message, for logs only.
        detail: String,
    },

    /// No hardware identifier could be determined for this machine.
    #[error("hwid not found: {message}")]
    Hwid {
        /// Reason the identifier was unavailable.
        message: String,
    },

    /// A fault with free-form text, passed to the classifier unchanged.
    #[error("{message}")]
    Other {
        /// Diagnostic text.
        message: String,
    },
}

/// Errors raised by the side-effect interception layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InterceptError {
    /// An interception scope is already active on this thread.
    #[error("an interception scope is already active")]
    Reentrant,
}
