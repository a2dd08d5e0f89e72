//! KeyAuth login bridge spawned by the desktop shell.
//!
//! Usage: `auth-bridge <username> <password>`. Exactly one JSON document is
//! written to stdout; logs go to stderr as JSON lines filtered by `RUST_LOG`.

use std::env;
use std::io;
use std::panic;
use std::process::ExitCode;

use auth_bridge::{BridgeSettings, KeyAuthClient, emit, run};
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
    install_panic_logger();

    let document = run(
        env::args_os().skip(1),
        BridgeSettings::load_from_env,
        KeyAuthClient::new,
    );
    emit(&document, io::stdout().lock())
}

// Panics are reported in the result document; keep stderr structured.
fn install_panic_logger() {
    panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|location| format!("{}:{}", location.file(), location.line()))
            .unwrap_or_default();
        error!(location = %location, "panic in auth bridge");
    }));
}
