//! Value types flowing through one authentication attempt.

use std::fmt;

use serde::Serialize;

use crate::classifier::catalog::{
    CONFIGURATION_ERROR, CRITICAL_ERROR, ErrorCategory, ErrorType, INVALID_ARGUMENTS,
};

/// Credentials supplied by the host for a single invocation.
///
/// The password never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthRequest {
    username: String,
    password: String,
}

impl AuthRequest {
    /// Builds a request from raw credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Username as supplied.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Password as supplied.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Returns a copy with surrounding whitespace stripped from the username.
    ///
    /// Passwords are passed through untouched.
    ///
    /// # Example
    ///
    /// ```
    /// use auth_bridge::AuthRequest;
    ///
    /// let request = AuthRequest::new("  alice ", " pw ").normalised();
    /// assert_eq!(request.username(), "alice");
    /// assert_eq!(request.password(), " pw ");
    /// ```
    #[must_use]
    pub fn normalised(&self) -> Self {
        Self {
            username: self.username.trim().to_owned(),
            password: self.password.clone(),
        }
    }
}

impl fmt::Debug for AuthRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Account details returned by the licensing service after a successful login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSnapshot {
    /// Account name.
    pub username: String,
    /// Hardware identifier the session is bound to.
    pub hwid: String,
    /// Address the server saw the login from.
    pub ip: String,
    /// Name of the primary subscription.
    pub subscription: String,
    /// Names of every subscription, in server order.
    pub subscriptions: Vec<String>,
    /// Expiry of the primary subscription.
    pub expires: String,
    /// Account creation timestamp.
    pub createdate: String,
    /// Previous login timestamp.
    pub lastlogin: String,
}

/// Classified failure reported to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    /// Stable numeric code.
    pub code: u16,
    /// Machine-readable type.
    pub error_type: ErrorType,
    /// Display message for the host UI.
    pub message: String,
    /// Diagnostic text as produced, empty only when nothing was captured.
    pub original_diagnostic: String,
}

impl ErrorRecord {
    /// Builds a record from a catalogue entry using its message template.
    #[must_use]
    pub fn from_category(category: &ErrorCategory, original_diagnostic: impl Into<String>) -> Self {
        Self {
            code: category.code,
            error_type: category.error_type,
            message: category.message.to_owned(),
            original_diagnostic: original_diagnostic.into(),
        }
    }

    /// Record for a malformed invocation that never reached the client.
    #[must_use]
    pub fn invalid_arguments(detail: impl Into<String>) -> Self {
        Self::from_category(&INVALID_ARGUMENTS, detail)
    }

    /// Record for absent or placeholder configuration.
    #[must_use]
    pub fn configuration(detail: impl Into<String>) -> Self {
        Self::from_category(&CONFIGURATION_ERROR, detail)
    }

    /// Record for a fault nothing else accounted for.
    #[must_use]
    pub fn critical(detail: impl Into<String>) -> Self {
        Self::from_category(&CRITICAL_ERROR, detail)
    }

    /// Text worth showing for this failure: the diagnostic when one was
    /// captured, else the display message.
    #[must_use]
    pub fn summary(&self) -> &str {
        if self.original_diagnostic.is_empty() {
            &self.message
        } else {
            &self.original_diagnostic
        }
    }
}

/// Result of one authentication attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The client returned account details.
    Success(UserSnapshot),
    /// The attempt failed and was classified.
    Failure(ErrorRecord),
}

/// Result of one online-user count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnlineOutcome {
    /// Number of users KeyAuth reports as online.
    Online(usize),
    /// The count failed and was classified.
    Failure(ErrorRecord),
}
