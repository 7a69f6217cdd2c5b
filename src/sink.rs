//! Log sinks.
//!
//! The interceptor formats complete lines and hands them to one of three
//! sinks. By default each sink emits a `tracing` event under the `tether`
//! target, so whichever subscriber the host installs decides where lines go.

use std::fmt;
use std::sync::Arc;

/// A line-oriented log function.
pub type LogFn = Arc<dyn Fn(&str) + Send + Sync + 'static>;

/// The three sinks a [`LogDecorator`](crate::LogDecorator) writes to.
#[derive(Clone)]
pub struct Sinks {
    pub info: LogFn,
    pub error: LogFn,
    pub debug: LogFn,
}

impl Sinks {
    /// `tracing` events at info / error / debug level.
    pub fn tracing() -> Self {
        Self {
            info: Arc::new(|line: &str| tracing::info!(target: "tether", "{line}")),
            error: Arc::new(|line: &str| tracing::error!(target: "tether", "{line}")),
            debug: Arc::new(|line: &str| tracing::debug!(target: "tether", "{line}")),
        }
    }

    /// Raw stream writes: info and debug to stdout, error to stderr.
    pub fn stdio() -> Self {
        Self {
            info: Arc::new(|line: &str| println!("{line}")),
            error: Arc::new(|line: &str| eprintln!("{line}")),
            debug: Arc::new(|line: &str| println!("{line}")),
        }
    }
}

impl Default for Sinks {
    fn default() -> Self { Self::tracing() }
}

impl fmt::Debug for Sinks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sinks").finish_non_exhaustive()
    }
}
