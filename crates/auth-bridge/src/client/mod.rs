//! Authentication client port and its implementations.
//!
//! Clients behave like a licensing SDK: on failure they either return a
//! [`ClientFault`] or write a human-readable message to the [`Console`] and
//! call [`Console::terminate`]. Callers must run them inside an interception
//! scope.

pub mod hwid;
pub mod keyauth;

use crate::console::Console;
use crate::error::ClientFault;
use crate::model::{AuthRequest, UserSnapshot};

/// Port for the external authentication call.
#[cfg_attr(test, mockall::automock)]
pub trait AuthClient {
    /// Logs in with `request`, returning the account snapshot on success.
    ///
    /// # Errors
    ///
    /// Returns [`ClientFault`] for failures the client reports as values.
    /// Failures reported by termination never return.
    fn login(
        &mut self,
        console: &mut Console,
        request: &AuthRequest,
    ) -> Result<UserSnapshot, ClientFault>;
}

/// Port for counting the application's online users.
#[cfg_attr(test, mockall::automock)]
pub trait OnlineUsersClient {
    /// Returns how many users KeyAuth reports as online.
    ///
    /// # Errors
    ///
    /// Returns [`ClientFault`] for failures the client reports as values.
    /// Failures reported by termination never return.
    fn online_users(&mut self, console: &mut Console) -> Result<usize, ClientFault>;
}

/// Scripted behaviour for [`FixtureAuthClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureBehaviour {
    /// Return the snapshot, or the configured online count.
    Succeed(UserSnapshot),
    /// Write the text to the console, then terminate with exit code 1.
    Terminate(String),
    /// Return [`ClientFault::Other`] with the text.
    Fault(String),
    /// Panic with the text.
    Panic(String),
}

/// In-memory client replaying a fixed behaviour, for tests and demos.
///
/// # Example
///
/// ```
/// use auth_bridge::{AuthClient, AuthRequest, Console, FixtureAuthClient, UserSnapshot};
///
/// let mut client = FixtureAuthClient::succeeding(UserSnapshot {
///     username: "alice".to_owned(),
///     ..UserSnapshot::default()
/// });
/// let mut console = Console::capturing();
/// let snapshot = client
///     .login(&mut console, &AuthRequest::new("alice", "pw"))
///     .expect("fixture succeeds");
///
/// assert_eq!(snapshot.username, "alice");
/// assert_eq!(client.calls(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct FixtureAuthClient {
    behaviour: FixtureBehaviour,
    online: usize,
    calls: usize,
}

impl FixtureAuthClient {
    /// Client with an arbitrary behaviour.
    #[must_use]
    pub const fn new(behaviour: FixtureBehaviour) -> Self {
        Self {
            behaviour,
            online: 0,
            calls: 0,
        }
    }

    /// Client that returns `snapshot`.
    #[must_use]
    pub const fn succeeding(snapshot: UserSnapshot) -> Self {
        Self::new(FixtureBehaviour::Succeed(snapshot))
    }

    /// Client that prints `text` and terminates.
    pub fn terminating(text: impl Into<String>) -> Self {
        Self::new(FixtureBehaviour::Terminate(text.into()))
    }

    /// Client that returns a fault carrying `text`.
    pub fn faulting(text: impl Into<String>) -> Self {
        Self::new(FixtureBehaviour::Fault(text.into()))
    }

    /// Client that panics with `text`.
    pub fn panicking(text: impl Into<String>) -> Self {
        Self::new(FixtureBehaviour::Panic(text.into()))
    }

    /// Sets the count a succeeding client reports for online users.
    #[must_use]
    pub fn with_online_users(self, online: usize) -> Self {
        Self { online, ..self }
    }

    /// Number of `login` and `online_users` calls made so far.
    #[must_use]
    pub const fn calls(&self) -> usize {
        self.calls
    }
}

impl AuthClient for FixtureAuthClient {
    fn login(
        &mut self,
        console: &mut Console,
        _request: &AuthRequest,
    ) -> Result<UserSnapshot, ClientFault> {
        self.calls += 1;
        match &self.behaviour {
            FixtureBehaviour::Succeed(snapshot) => Ok(snapshot.clone()),
            FixtureBehaviour::Terminate(text) => {
                console.write_line(text);
                console.terminate(1)
            }
            FixtureBehaviour::Fault(text) => Err(ClientFault::Other {
                message: text.clone(),
            }),
            FixtureBehaviour::Panic(text) => panic!("{text}"),
        }
    }
}

impl OnlineUsersClient for FixtureAuthClient {
    fn online_users(&mut self, console: &mut Console) -> Result<usize, ClientFault> {
        self.calls += 1;
        match &self.behaviour {
            FixtureBehaviour::Succeed(_) => Ok(self.online),
            FixtureBehaviour::Terminate(text) => {
                console.write_line(text);
                console.terminate(1)
            }
            FixtureBehaviour::Fault(text) => Err(ClientFault::Other {
                message: text.clone(),
            }),
            FixtureBehaviour::Panic(text) => panic!("{text}"),
        }
    }
}
