//! Online-user count for the desktop shell's status bar.
//!
//! Usage: `auth-bridge-online`. Prints `{"success":true,"count":N}` or a
//! failure document with `count` 0; logs go to stderr as JSON lines filtered
//! by `RUST_LOG`.

use std::io;
use std::panic;
use std::process::ExitCode;

use auth_bridge::{BridgeSettings, KeyAuthClient, emit, run_online_count};
use tracing::{error, warn};
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> ExitCode {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
    panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|location| format!("{}:{}", location.file(), location.line()))
            .unwrap_or_default();
        error!(location = %location, "panic in online count");
    }));

    let document = run_online_count(BridgeSettings::load_from_env, KeyAuthClient::new);
    emit(&document, io::stdout().lock())
}
