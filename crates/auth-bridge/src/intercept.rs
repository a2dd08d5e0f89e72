//! Side-effect interception around a single client call.
//!
//! [`intercept`] redirects a [`Console`] into a private buffer, turns its
//! termination into a [`TerminationSignal`] unwind, and silences the panic
//! hook for that signal. Whatever way the operation ends, the console and the
//! hook are put back before `intercept` returns or resumes unwinding.
//!
//! Only one scope may be active per thread. The panic hook is process-wide,
//! so concurrent scopes on different threads are unsupported.

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe, PanicHookInfo};
use std::sync::Arc;
use std::thread;

use tracing::debug;

use crate::console::{Console, OutputDestination, TerminationBehaviour, TerminationSignal};
use crate::error::InterceptError;

type PanicHook = Box<dyn Fn(&PanicHookInfo<'_>) + Send + Sync + 'static>;

thread_local! {
    static SCOPE_ACTIVE: Cell<bool> = const { Cell::new(false) };
}

/// Console text captured up to a client's termination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedDiagnostic {
    text: String,
    exit_code: i32,
}

impl CapturedDiagnostic {
    /// Captured text with surrounding whitespace trimmed.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Exit code the client asked for.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.exit_code
    }
}

/// How an intercepted operation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intercepted<T> {
    /// The operation returned normally.
    Returned(T),
    /// The operation called [`Console::terminate`].
    Terminated(CapturedDiagnostic),
}

/// Runs `operation` with `console` redirected and termination neutralised.
///
/// Panics other than the termination signal are re-raised after the console
/// and panic hook have been restored.
///
/// # Errors
///
/// Returns [`InterceptError::Reentrant`] without running `operation` when a
/// scope is already active on this thread.
///
/// # Example
///
/// ```
/// use auth_bridge::{Console, Intercepted, intercept};
///
/// let mut console = Console::stdout();
/// let outcome = intercept(&mut console, |console| -> () {
///     console.write_line("Incorrect password");
///     console.terminate(1);
/// })
/// .expect("no scope is active");
///
/// let Intercepted::Terminated(captured) = outcome else {
///     panic!("expected termination");
/// };
/// assert_eq!(captured.text(), "Incorrect password");
/// ```
pub fn intercept<T, F>(console: &mut Console, operation: F) -> Result<Intercepted<T>, InterceptError>
where
    F: FnOnce(&mut Console) -> T,
{
    let mut scope = InterceptionScope::enter(console)?;
    let result = panic::catch_unwind(AssertUnwindSafe(|| operation(scope.console())));

    match result {
        Ok(value) => {
            let discarded = scope.console().captured_text();
            if !discarded.is_empty() {
                debug!(output = %discarded, "discarding client output after normal return");
            }
            Ok(Intercepted::Returned(value))
        }
        Err(payload) => match payload.downcast::<TerminationSignal>() {
            Ok(signal) => {
                let text = scope.console().captured_text();
                debug!(exit_code = signal.code, "client termination intercepted");
                Ok(Intercepted::Terminated(CapturedDiagnostic {
                    text,
                    exit_code: signal.code,
                }))
            }
            Err(other) => {
                drop(scope);
                panic::resume_unwind(other)
            }
        },
    }
}

/// Saved console and hook state, restored on drop.
struct InterceptionScope<'a> {
    console: &'a mut Console,
    saved_destination: Option<OutputDestination>,
    saved_termination: TerminationBehaviour,
    saved_hook: Option<Arc<PanicHook>>,
}

impl<'a> InterceptionScope<'a> {
    fn enter(console: &'a mut Console) -> Result<Self, InterceptError> {
        if SCOPE_ACTIVE.with(|active| active.replace(true)) {
            return Err(InterceptError::Reentrant);
        }

        let (saved_destination, saved_termination) = console.redirect(
            OutputDestination::Capture(Vec::new()),
            TerminationBehaviour::Signal,
        );

        let previous: Arc<PanicHook> = Arc::new(panic::take_hook());
        let delegate = Arc::clone(&previous);
        panic::set_hook(Box::new(move |info| {
            if info.payload().downcast_ref::<TerminationSignal>().is_none() {
                (**delegate)(info);
            }
        }));

        Ok(Self {
            console,
            saved_destination: Some(saved_destination),
            saved_termination,
            saved_hook: Some(previous),
        })
    }

    fn console(&mut self) -> &mut Console {
        &mut *self.console
    }
}

impl Drop for InterceptionScope<'_> {
    fn drop(&mut self) {
        if let Some(destination) = self.saved_destination.take() {
            self.console.redirect(destination, self.saved_termination);
        }

        // The hook API panics on a panicking thread; the scope is always
        // dropped after `catch_unwind` has returned, so this only guards
        // against misuse.
        if let Some(previous) = self.saved_hook.take() {
            if !thread::panicking() {
                drop(panic::take_hook());
                match Arc::try_unwrap(previous) {
                    Ok(hook) => panic::set_hook(hook),
                    Err(shared) => panic::set_hook(Box::new(move |info| (**shared)(info))),
                }
            }
        }

        SCOPE_ACTIVE.with(|active| active.set(false));
    }
}
