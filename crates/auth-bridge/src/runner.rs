//! One complete bridge invocation, from raw arguments to a result document.
//!
//! [`run`] never panics and never returns without a document: argument and
//! configuration problems map to reserved records, client failures go through
//! the classifier, and any panic is caught and reported as critical.
//! [`run_online_count`] follows the same rules for the online-user count.

use std::any::Any;
use std::ffi::OsString;
use std::panic::{self, AssertUnwindSafe};

use tracing::{error, info, warn};

use crate::adapter::{ClientAdapter, authenticate, count_online};
use crate::classifier::classify;
use crate::cli::parse_args;
use crate::client::{AuthClient, OnlineUsersClient};
use crate::config::{AppCredentials, BridgeSettings};
use crate::console::Console;
use crate::error::{ClientFault, ConfigError};
use crate::model::ErrorRecord;
use crate::serializer::{OnlineCountDocument, ResultDocument};

/// Runs one invocation against the process stdout console.
///
/// `load_settings` is only called once the arguments are valid, and
/// `build_client` only once the configuration is.
pub fn run<A, S, L, B, C>(args: A, load_settings: L, build_client: B) -> ResultDocument
where
    A: IntoIterator<Item = S>,
    S: Into<OsString>,
    L: FnOnce() -> Result<BridgeSettings, ConfigError>,
    B: FnOnce(&AppCredentials) -> Result<C, ClientFault>,
    C: AuthClient,
{
    let mut console = Console::stdout();
    run_with_console(&mut console, args, load_settings, build_client)
}

/// [`run`] with an explicit console.
///
/// # Example
///
/// ```
/// use auth_bridge::{BridgeSettings, Console, FixtureAuthClient, runner::run_with_console};
///
/// let mut console = Console::stdout();
/// let document = run_with_console(
///     &mut console,
///     ["alice"],
///     || Ok(BridgeSettings::default()),
///     |_credentials| Ok(FixtureAuthClient::terminating("unused")),
/// );
///
/// assert_eq!(document.exit_status(), 1);
/// ```
pub fn run_with_console<A, S, L, B, C>(
    console: &mut Console,
    args: A,
    load_settings: L,
    build_client: B,
) -> ResultDocument
where
    A: IntoIterator<Item = S>,
    S: Into<OsString>,
    L: FnOnce() -> Result<BridgeSettings, ConfigError>,
    B: FnOnce(&AppCredentials) -> Result<C, ClientFault>,
    C: AuthClient,
{
    let guarded = panic::catch_unwind(AssertUnwindSafe(|| {
        attempt(console, args, load_settings, build_client)
    }));
    guarded.unwrap_or_else(|payload| ResultDocument::from_error(critical(payload.as_ref())))
}

/// Counts the users currently online against the process stdout console.
pub fn run_online_count<L, B, C>(load_settings: L, build_client: B) -> OnlineCountDocument
where
    L: FnOnce() -> Result<BridgeSettings, ConfigError>,
    B: FnOnce(&AppCredentials) -> Result<C, ClientFault>,
    C: OnlineUsersClient,
{
    let mut console = Console::stdout();
    run_online_count_with_console(&mut console, load_settings, build_client)
}

/// [`run_online_count`] with an explicit console.
pub fn run_online_count_with_console<L, B, C>(
    console: &mut Console,
    load_settings: L,
    build_client: B,
) -> OnlineCountDocument
where
    L: FnOnce() -> Result<BridgeSettings, ConfigError>,
    B: FnOnce(&AppCredentials) -> Result<C, ClientFault>,
    C: OnlineUsersClient,
{
    let guarded = panic::catch_unwind(AssertUnwindSafe(|| {
        let (credentials, mut client) = match connect(load_settings, build_client) {
            Ok(prepared) => prepared,
            Err(record) => return OnlineCountDocument::from_error(&record),
        };
        info!(app = %credentials.name(), "online user count");
        match count_online(console, &mut client) {
            Ok(outcome) => OnlineCountDocument::from_outcome(outcome),
            Err(err) => OnlineCountDocument::from_error(&ErrorRecord::critical(err.to_string())),
        }
    }));
    guarded.unwrap_or_else(|payload| OnlineCountDocument::from_error(&critical(payload.as_ref())))
}

fn attempt<A, S, L, B, C>(
    console: &mut Console,
    args: A,
    load_settings: L,
    build_client: B,
) -> ResultDocument
where
    A: IntoIterator<Item = S>,
    S: Into<OsString>,
    L: FnOnce() -> Result<BridgeSettings, ConfigError>,
    B: FnOnce(&AppCredentials) -> Result<C, ClientFault>,
    C: AuthClient,
{
    let request = match parse_args(args) {
        Ok(request) => request,
        Err(err) => {
            warn!(error = %err, "rejecting invocation");
            return ResultDocument::from_error(ErrorRecord::invalid_arguments(err.to_string()));
        }
    };

    let (credentials, client) = match connect(load_settings, build_client) {
        Ok(prepared) => prepared,
        Err(record) => return ResultDocument::from_error(record),
    };

    info!(
        username = %request.username(),
        app = %credentials.name(),
        "authentication attempt"
    );
    let mut adapter = ClientAdapter::new(client);
    match authenticate(console, &mut adapter, &request) {
        Ok(outcome) => ResultDocument::from_outcome(outcome),
        Err(err) => ResultDocument::from_error(ErrorRecord::critical(err.to_string())),
    }
}

fn connect<L, B, C>(load_settings: L, build_client: B) -> Result<(AppCredentials, C), ErrorRecord>
where
    L: FnOnce() -> Result<BridgeSettings, ConfigError>,
    B: FnOnce(&AppCredentials) -> Result<C, ClientFault>,
{
    let credentials = load_settings()
        .and_then(|settings| settings.resolve())
        .map_err(|err| {
            warn!(error = %err, "configuration unusable");
            ErrorRecord::configuration(err.to_string())
        })?;

    let client = build_client(&credentials).map_err(|fault| {
        warn!(error = %fault, "authentication client unavailable");
        classify(&fault.to_string())
    })?;
    Ok((credentials, client))
}

fn critical(payload: &(dyn Any + Send)) -> ErrorRecord {
    let detail = panic_detail(payload);
    error!(detail = %detail, "unexpected fault during authentication");
    ErrorRecord::critical(detail)
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_owned()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unexpected fault".to_owned()
    }
}
