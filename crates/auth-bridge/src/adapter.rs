//! Adapter that drives one authentication call and classifies its result.

use tracing::{info, warn};

use crate::classifier::classify;
use crate::client::{AuthClient, OnlineUsersClient};
use crate::console::Console;
use crate::error::{ClientFault, InterceptError};
use crate::intercept::{Intercepted, intercept};
use crate::model::{AuthOutcome, AuthRequest, ErrorRecord, OnlineOutcome, UserSnapshot};

/// Wraps an [`AuthClient`] with input normalisation.
#[derive(Debug)]
pub struct ClientAdapter<C> {
    client: C,
}

impl<C: AuthClient> ClientAdapter<C> {
    /// Wraps `client`.
    pub const fn new(client: C) -> Self {
        Self { client }
    }

    /// Borrows the wrapped client.
    pub const fn client(&self) -> &C {
        &self.client
    }

    /// Makes exactly one call to the client with a normalised request.
    ///
    /// Must run inside an interception scope: the client may terminate
    /// through `console`.
    ///
    /// # Errors
    ///
    /// Propagates the client's [`ClientFault`].
    pub fn login(
        &mut self,
        console: &mut Console,
        request: &AuthRequest,
    ) -> Result<UserSnapshot, ClientFault> {
        let normalised = request.normalised();
        self.client.login(console, &normalised)
    }
}

/// Runs one intercepted login and folds every result into an [`AuthOutcome`].
///
/// Terminations and faults are both classified from their text.
///
/// # Errors
///
/// Returns [`InterceptError::Reentrant`] when called from inside another
/// interception scope.
///
/// # Example
///
/// ```
/// use auth_bridge::{AuthOutcome, AuthRequest, ClientAdapter, Console, FixtureAuthClient, authenticate};
///
/// let mut console = Console::stdout();
/// let mut adapter = ClientAdapter::new(FixtureAuthClient::terminating("Incorrect password"));
///
/// let outcome = authenticate(&mut console, &mut adapter, &AuthRequest::new("alice", "nope"))
///     .expect("no scope is active");
///
/// let AuthOutcome::Failure(record) = outcome else {
///     panic!("expected failure");
/// };
/// assert_eq!(record.code, 3);
/// ```
pub fn authenticate<C: AuthClient>(
    console: &mut Console,
    adapter: &mut ClientAdapter<C>,
    request: &AuthRequest,
) -> Result<AuthOutcome, InterceptError> {
    let intercepted = intercept(console, |console| adapter.login(console, request))?;

    let outcome = match classified(intercepted) {
        Ok(snapshot) => {
            info!(username = %snapshot.username, "authentication succeeded");
            AuthOutcome::Success(snapshot)
        }
        Err(record) => AuthOutcome::Failure(record),
    };
    Ok(outcome)
}

/// Runs one intercepted online-user count and classifies any failure.
///
/// # Errors
///
/// Returns [`InterceptError::Reentrant`] when called from inside another
/// interception scope.
pub fn count_online<C: OnlineUsersClient>(
    console: &mut Console,
    client: &mut C,
) -> Result<OnlineOutcome, InterceptError> {
    let intercepted = intercept(console, |console| client.online_users(console))?;

    let outcome = match classified(intercepted) {
        Ok(count) => {
            info!(count, "online users counted");
            OnlineOutcome::Online(count)
        }
        Err(record) => OnlineOutcome::Failure(record),
    };
    Ok(outcome)
}

fn classified<T>(intercepted: Intercepted<Result<T, ClientFault>>) -> Result<T, ErrorRecord> {
    match intercepted {
        Intercepted::Returned(Ok(value)) => Ok(value),
        Intercepted::Returned(Err(fault)) => {
            warn!(error = %fault, "authentication client fault");
            Err(classify(&fault.to_string()))
        }
        Intercepted::Terminated(captured) => {
            warn!(
                exit_code = captured.exit_code(),
                "authentication client terminated"
            );
            Err(classify(captured.text()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ErrorType;
    use crate::client::{FixtureAuthClient, MockAuthClient, MockOnlineUsersClient};

    use rstest::rstest;
    use serial_test::serial;

    fn snapshot() -> UserSnapshot {
        UserSnapshot {
            username: "alice".to_owned(),
            subscription: "premium".to_owned(),
            subscriptions: vec!["premium".to_owned()],
            ..UserSnapshot::default()
        }
    }

    #[rstest]
    #[serial(panic_hook)]
    fn success_is_passed_through() {
        let mut console = Console::stdout();
        let mut adapter = ClientAdapter::new(FixtureAuthClient::succeeding(snapshot()));

        let outcome = authenticate(&mut console, &mut adapter, &AuthRequest::new("alice", "pw"))
            .expect("scope should open");

        assert_eq!(outcome, AuthOutcome::Success(snapshot()));
        assert_eq!(adapter.client().calls(), 1);
    }

    #[rstest]
    #[serial(panic_hook)]
    #[case(FixtureAuthClient::terminating("HWID Doesn't match."), ErrorType::HwidMismatch)]
    #[case(FixtureAuthClient::faulting("request timed out: deadline"), ErrorType::Timeout)]
    #[case(FixtureAuthClient::terminating(""), ErrorType::NoDiagnostic)]
    fn failures_are_classified(#[case] client: FixtureAuthClient, #[case] expected: ErrorType) {
        let mut console = Console::stdout();
        let mut adapter = ClientAdapter::new(client);

        let outcome = authenticate(&mut console, &mut adapter, &AuthRequest::new("alice", "pw"))
            .expect("scope should open");

        let AuthOutcome::Failure(record) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(record.error_type, expected);
        assert_eq!(adapter.client().calls(), 1);
    }

    #[rstest]
    #[serial(panic_hook)]
    fn username_is_trimmed_before_the_call() {
        let mut client = MockAuthClient::new();
        client
            .expect_login()
            .times(1)
            .returning(|_console, request| {
                Ok(UserSnapshot {
                    username: request.username().to_owned(),
                    ..UserSnapshot::default()
                })
            });
        let mut console = Console::stdout();
        let mut adapter = ClientAdapter::new(client);

        let outcome = authenticate(
            &mut console,
            &mut adapter,
            &AuthRequest::new("  alice\n", "pw"),
        )
        .expect("scope should open");

        let AuthOutcome::Success(user) = outcome else {
            panic!("expected success");
        };
        assert_eq!(user.username, "alice");
    }

    #[rstest]
    #[serial(panic_hook)]
    fn online_count_is_passed_through() {
        let mut console = Console::stdout();
        let mut client = FixtureAuthClient::succeeding(snapshot()).with_online_users(4);

        let outcome = count_online(&mut console, &mut client).expect("scope should open");

        assert_eq!(outcome, OnlineOutcome::Online(4));
        assert_eq!(client.calls(), 1);
    }

    #[rstest]
    #[serial(panic_hook)]
    fn terminated_online_count_is_classified() {
        let mut console = Console::stdout();
        let mut client = MockOnlineUsersClient::new();
        client.expect_online_users().times(1).returning(|console| {
            console.write_line("Connection refused by keyauth.win");
            console.terminate(1)
        });

        let outcome = count_online(&mut console, &mut client).expect("scope should open");

        let OnlineOutcome::Failure(record) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(record.error_type, ErrorType::ConnectionError);
        assert_eq!(record.original_diagnostic, "Connection refused by keyauth.win");
    }
}
