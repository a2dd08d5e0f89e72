//! Result normalisation bridge between a desktop shell and the KeyAuth
//! licensing service.
//!
//! The host spawns the `auth-bridge` binary with a username and password and
//! reads back exactly one JSON document on stdout. The vendor client reports
//! most failures by printing a message and terminating the process; this crate
//! intercepts those terminations, classifies the captured text against a fixed
//! catalogue, and always answers with a structured result.
//!
//! # Overview
//!
//! - [`Console`] is the capability a client writes to and terminates through
//! - [`intercept`] runs one client call with that capability neutralised
//! - [`classify`] maps diagnostic text to an [`ErrorRecord`]
//! - [`authenticate`] combines the two around an [`AuthClient`]
//! - [`run`] handles a whole invocation, from arguments to [`ResultDocument`]
//! - [`run_online_count`] answers the online-user query with an
//!   [`OnlineCountDocument`]
//!
//! # Example
//!
//! ```
//! use auth_bridge::{AuthOutcome, AuthRequest, ClientAdapter, Console, FixtureAuthClient};
//! use auth_bridge::{ResultDocument, authenticate, write_document};
//!
//! let mut console = Console::stdout();
//! let mut adapter = ClientAdapter::new(FixtureAuthClient::terminating("Incorrect password"));
//! let outcome = authenticate(&mut console, &mut adapter, &AuthRequest::new("alice", "nope"))
//!     .expect("no scope is active");
//!
//! let document = ResultDocument::from_outcome(outcome);
//! let mut out = Vec::new();
//! write_document(&document, &mut out).expect("write to vec");
//!
//! let line = String::from_utf8(out).expect("utf-8");
//! assert!(line.contains(r#""errorType":"INVALID_PASSWORD""#));
//! ```

mod adapter;
mod classifier;
pub mod cli;
mod client;
pub mod config;
mod console;
mod error;
mod intercept;
mod lenient;
mod model;
pub mod runner;
mod serializer;

pub use adapter::{ClientAdapter, authenticate, count_online};
pub use classifier::{catalog, classify};
pub use client::hwid::{HwidExtractor, HwidSource};
pub use client::keyauth::KeyAuthClient;
pub use client::{AuthClient, FixtureAuthClient, FixtureBehaviour, OnlineUsersClient};
pub use config::{AppCredentials, BridgeSettings};
pub use console::{Console, OutputDestination, TerminationBehaviour, TerminationSignal};
pub use error::{ClientFault, CliError, ConfigError, InterceptError};
pub use intercept::{CapturedDiagnostic, Intercepted, intercept};
pub use model::{AuthOutcome, AuthRequest, ErrorRecord, OnlineOutcome, UserSnapshot};
pub use runner::{run, run_online_count};
pub use serializer::{
    HostDocument, OnlineCountDocument, ResultDocument, SUCCESS_MESSAGE, emit, write_document,
};
