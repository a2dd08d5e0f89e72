//! Result document construction and emission.
//!
//! This is the only place that writes to the host-visible channel.

use std::io::{self, Write};
use std::process::ExitCode;

use serde::Serialize;
use tracing::error;

use crate::classifier::catalog::ErrorType;
use crate::model::{AuthOutcome, ErrorRecord, OnlineOutcome, UserSnapshot};

/// Message carried by every success document.
pub const SUCCESS_MESSAGE: &str = "Autenticação realizada com sucesso";

/// A document the host reads from stdout, with the exit status that goes
/// with it.
pub trait HostDocument: Serialize {
    /// Process exit status: 0 for success, 1 for any failure.
    fn exit_status(&self) -> u8;
}

/// The single JSON document emitted per login invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResultDocument {
    /// `{"success":true,...}`
    Success(SuccessDocument),
    /// `{"success":false,...}`
    Failure(FailureDocument),
}

/// Body of a success document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessDocument {
    success: bool,
    message: String,
    user_data: UserSnapshot,
}

/// Body of a failure document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureDocument {
    success: bool,
    error_code: u16,
    error_type: ErrorType,
    message: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    original_error: String,
}

impl ResultDocument {
    /// Document for an authentication outcome.
    #[must_use]
    pub fn from_outcome(outcome: AuthOutcome) -> Self {
        match outcome {
            AuthOutcome::Success(snapshot) => Self::Success(SuccessDocument {
                success: true,
                message: SUCCESS_MESSAGE.to_owned(),
                user_data: snapshot,
            }),
            AuthOutcome::Failure(record) => Self::from_error(record),
        }
    }

    /// Document for a classified failure.
    #[must_use]
    pub fn from_error(record: ErrorRecord) -> Self {
        Self::Failure(FailureDocument {
            success: false,
            error_code: record.code,
            error_type: record.error_type,
            message: record.message,
            original_error: record.original_diagnostic,
        })
    }

    /// Value of the `success` field.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Process exit status: 0 for success, 1 for any failure.
    #[must_use]
    pub const fn exit_status(&self) -> u8 {
        if self.is_success() { 0 } else { 1 }
    }
}

impl HostDocument for ResultDocument {
    fn exit_status(&self) -> u8 {
        Self::exit_status(self)
    }
}

/// The document emitted by the online-user count.
///
/// Shaped `{"success":true,"count":3}` or
/// `{"success":false,"count":0,"error":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OnlineCountDocument {
    success: bool,
    count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl OnlineCountDocument {
    /// Document for a count outcome.
    #[must_use]
    pub fn from_outcome(outcome: OnlineOutcome) -> Self {
        match outcome {
            OnlineOutcome::Online(count) => Self {
                success: true,
                count,
                error: None,
            },
            OnlineOutcome::Failure(record) => Self::from_error(&record),
        }
    }

    /// Document for a classified failure.
    #[must_use]
    pub fn from_error(record: &ErrorRecord) -> Self {
        Self {
            success: false,
            count: 0,
            error: Some(record.summary().to_owned()),
        }
    }

    /// Value of the `success` field.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.success
    }

    /// Value of the `count` field.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }
}

impl HostDocument for OnlineCountDocument {
    fn exit_status(&self) -> u8 {
        if self.success { 0 } else { 1 }
    }
}

/// Writes `document` as one newline-terminated JSON line and flushes.
///
/// # Errors
///
/// Returns any I/O or serialisation error from `out`.
///
/// # Example
///
/// ```
/// use auth_bridge::{ErrorRecord, ResultDocument, write_document};
///
/// let document = ResultDocument::from_error(ErrorRecord::invalid_arguments("got 1"));
/// let mut out = Vec::new();
/// write_document(&document, &mut out).expect("write to vec");
///
/// let text = String::from_utf8(out).expect("utf-8");
/// assert!(text.starts_with(r#"{"success":false,"errorCode":90"#));
/// assert!(text.ends_with('\n'));
/// ```
pub fn write_document<D, W>(document: &D, out: &mut W) -> io::Result<()>
where
    D: HostDocument,
    W: Write,
{
    serde_json::to_writer(&mut *out, document)?;
    out.write_all(b"\n")?;
    out.flush()
}

/// Writes `document` to `out` and returns the matching exit code.
///
/// A write failure is logged and yields a failure exit code.
pub fn emit<D, W>(document: &D, mut out: W) -> ExitCode
where
    D: HostDocument,
    W: Write,
{
    if let Err(err) = write_document(document, &mut out) {
        error!(error = %err, "failed to write result document");
        return ExitCode::FAILURE;
    }
    ExitCode::from(document.exit_status())
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use serde_json::{Value, json};

    fn render<D: HostDocument>(document: &D) -> String {
        let mut out = Vec::new();
        write_document(document, &mut out).expect("write to vec");
        String::from_utf8(out).expect("utf-8")
    }

    fn parse(line: &str) -> Value {
        serde_json::from_str(line.trim_end()).expect("valid json")
    }

    #[rstest]
    fn success_document_carries_full_snapshot() {
        let snapshot = UserSnapshot {
            username: "alice".to_owned(),
            hwid: "4c4c".to_owned(),
            ip: "203.0.113.7".to_owned(),
            subscription: "premium".to_owned(),
            subscriptions: vec!["premium".to_owned(), "addon".to_owned()],
            expires: "1767225600".to_owned(),
            createdate: "1700000000".to_owned(),
            lastlogin: "1700000500".to_owned(),
        };
        let document = ResultDocument::from_outcome(AuthOutcome::Success(snapshot));

        let line = render(&document);

        assert_eq!(
            parse(&line),
            json!({
                "success": true,
                "message": SUCCESS_MESSAGE,
                "userData": {
                    "username": "alice",
                    "hwid": "4c4c",
                    "ip": "203.0.113.7",
                    "subscription": "premium",
                    "subscriptions": ["premium", "addon"],
                    "expires": "1767225600",
                    "createdate": "1700000000",
                    "lastlogin": "1700000500"
                }
            })
        );
        assert_eq!(document.exit_status(), 0);
    }

    #[rstest]
    fn failure_document_uses_taxonomy_fields() {
        let record = ErrorRecord {
            code: 3,
            error_type: ErrorType::InvalidPassword,
            message: "Senha incorreta".to_owned(),
            original_diagnostic: "Incorrect password".to_owned(),
        };
        let document = ResultDocument::from_error(record);

        let line = render(&document);

        assert_eq!(
            parse(&line),
            json!({
                "success": false,
                "errorCode": 3,
                "errorType": "INVALID_PASSWORD",
                "message": "Senha incorreta",
                "originalError": "Incorrect password"
            })
        );
        assert_eq!(document.exit_status(), 1);
    }

    #[rstest]
    fn empty_diagnostic_omits_original_error() {
        let document = ResultDocument::from_error(crate::classify(""));

        let value = parse(&render(&document));

        assert!(value.get("originalError").is_none());
        assert_eq!(value["errorType"], "NO_DIAGNOSTIC");
    }

    #[rstest]
    fn output_is_exactly_one_line() {
        let document = ResultDocument::from_error(ErrorRecord::critical("multi\nline\nfault"));

        let line = render(&document);

        assert_eq!(line.matches('\n').count(), 1);
        assert!(line.ends_with('\n'));
    }

    #[rstest]
    fn exit_status_tracks_success_field() {
        let documents = [
            ResultDocument::from_outcome(AuthOutcome::Success(UserSnapshot::default())),
            ResultDocument::from_error(ErrorRecord::configuration("missing")),
        ];

        for document in documents {
            let value = parse(&render(&document));
            let success = value["success"].as_bool().expect("success flag");
            assert_eq!(document.exit_status() == 0, success);
        }
    }

    #[rstest]
    #[case(OnlineOutcome::Online(3), json!({"success": true, "count": 3}), 0)]
    #[case(
        OnlineOutcome::Failure(ErrorRecord::critical("session expired")),
        json!({"success": false, "count": 0, "error": "session expired"}),
        1
    )]
    fn online_count_document_matches_host_shape(
        #[case] outcome: OnlineOutcome,
        #[case] expected: Value,
        #[case] status: u8,
    ) {
        let document = OnlineCountDocument::from_outcome(outcome);

        assert_eq!(parse(&render(&document)), expected);
        assert_eq!(document.exit_status(), status);
    }

    #[rstest]
    fn silent_online_failure_reports_display_message() {
        let document = OnlineCountDocument::from_error(&crate::classify(""));

        let value = parse(&render(&document));

        assert_eq!(value["error"], crate::catalog::NO_DIAGNOSTIC.message);
    }
}
