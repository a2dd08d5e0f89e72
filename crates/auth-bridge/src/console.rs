//! Console capability handed to authentication clients.
//!
//! Licensing SDKs report failures by printing to the console and exiting the
//! process. Clients here receive a [`Console`] instead of touching stdout and
//! `std::process::exit` directly, which lets the interception layer redirect
//! both for the duration of one call.

use std::io::{self, Write};
use std::panic;
use std::process;

use tracing::warn;

/// Where console output currently goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputDestination {
    /// The process standard output.
    Stdout,
    /// An in-memory buffer.
    Capture(Vec<u8>),
}

/// What [`Console::terminate`] does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationBehaviour {
    /// End the process with the requested exit code.
    Exit,
    /// Unwind with a [`TerminationSignal`] payload.
    Signal,
}

/// Panic payload raised by [`Console::terminate`] under
/// [`TerminationBehaviour::Signal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminationSignal {
    /// Exit code the client asked for.
    pub code: i32,
}

/// Output stream and termination hook shared with authentication clients.
#[derive(Debug)]
pub struct Console {
    destination: OutputDestination,
    termination: TerminationBehaviour,
}

impl Console {
    /// Console bound to the real stdout and process exit.
    #[must_use]
    pub const fn stdout() -> Self {
        Self {
            destination: OutputDestination::Stdout,
            termination: TerminationBehaviour::Exit,
        }
    }

    /// Console that buffers output and signals instead of exiting.
    #[must_use]
    pub const fn capturing() -> Self {
        Self {
            destination: OutputDestination::Capture(Vec::new()),
            termination: TerminationBehaviour::Signal,
        }
    }

    /// Current output destination.
    #[must_use]
    pub const fn destination(&self) -> &OutputDestination {
        &self.destination
    }

    /// Current termination behaviour.
    #[must_use]
    pub const fn termination(&self) -> TerminationBehaviour {
        self.termination
    }

    /// Writes one line of human-readable text.
    ///
    /// Failures to reach stdout are logged and otherwise ignored, like a
    /// `print` to a closed pipe.
    pub fn write_line(&mut self, text: &str) {
        match &mut self.destination {
            OutputDestination::Stdout => {
                let mut out = io::stdout().lock();
                if let Err(err) = writeln!(out, "{text}") {
                    warn!(error = %err, "console write failed");
                }
            }
            OutputDestination::Capture(buffer) => {
                buffer.extend_from_slice(text.as_bytes());
                buffer.push(b'\n');
            }
        }
    }

    /// Ends the client's run with `code`.
    ///
    /// Exits the process, or unwinds with a [`TerminationSignal`] when
    /// termination is being intercepted. Never returns either way.
    pub fn terminate(&mut self, code: i32) -> ! {
        match self.termination {
            TerminationBehaviour::Exit => {
                if let Err(err) = io::stdout().lock().flush() {
                    warn!(error = %err, "stdout flush before exit failed");
                }
                process::exit(code)
            }
            TerminationBehaviour::Signal => panic::panic_any(TerminationSignal { code }),
        }
    }

    /// Text written to the capture buffer so far, surrounding whitespace
    /// trimmed. Empty when writing to stdout.
    #[must_use]
    pub fn captured_text(&self) -> String {
        match &self.destination {
            OutputDestination::Stdout => String::new(),
            OutputDestination::Capture(buffer) => {
                String::from_utf8_lossy(buffer).trim().to_owned()
            }
        }
    }

    /// Installs a new destination and behaviour, returning the previous ones.
    pub(crate) fn redirect(
        &mut self,
        destination: OutputDestination,
        termination: TerminationBehaviour,
    ) -> (OutputDestination, TerminationBehaviour) {
        let previous_destination = std::mem::replace(&mut self.destination, destination);
        let previous_termination = std::mem::replace(&mut self.termination, termination);
        (previous_destination, previous_termination)
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::stdout()
    }
}
