//! Command-line argument handling.
//!
//! The host always spawns the bridge as `auth-bridge <username> <password>`.
//! Arguments are positional and taken verbatim, so passwords beginning with
//! `-` are not mistaken for flags. They are read as OS strings: the count is
//! checked before any Unicode conversion.

use std::ffi::OsString;

use crate::error::CliError;
use crate::model::AuthRequest;

const EXPECTED_ARGUMENTS: usize = 2;

/// Parses the arguments following the program name.
///
/// # Errors
///
/// Returns [`CliError::WrongArgumentCount`] unless exactly two arguments are
/// supplied, and [`CliError::NotUnicode`] when either of them is not valid
/// Unicode.
///
/// # Example
///
/// ```
/// use auth_bridge::cli::parse_args;
///
/// let request = parse_args(["alice".to_owned(), "--secret".to_owned()]).expect("two args");
/// assert_eq!(request.password(), "--secret");
///
/// assert!(parse_args(["alice".to_owned()]).is_err());
/// ```
pub fn parse_args<I, S>(args: I) -> Result<AuthRequest, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let collected: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let actual = collected.len();
    let mut values = collected.into_iter();
    match (values.next(), values.next(), values.next()) {
        (Some(username), Some(password), None) => Ok(AuthRequest::new(
            unicode(username, 1)?,
            unicode(password, 2)?,
        )),
        _ => Err(CliError::WrongArgumentCount {
            expected: EXPECTED_ARGUMENTS,
            actual,
        }),
    }
}

fn unicode(value: OsString, position: usize) -> Result<String, CliError> {
    value
        .into_string()
        .map_err(|_| CliError::NotUnicode { position })
}
