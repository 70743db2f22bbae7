//! Process termination requests
//!
//! SIGTERM, SIGINT and SIGQUIT (plus SIGHUP on unix) set a shared flag instead
//! of killing the process. The session polls the flag and leaves through its
//! normal stop-and-join path, so a capture in flight finishes first.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{GameSaveError, GameSaveResult};

/// Flag raised when the process is asked to terminate
#[derive(Debug, Clone, Default)]
pub struct TerminationSignal {
    requested: Arc<AtomicBool>,
}

impl TerminationSignal {
    /// A flag not connected to any OS signal
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the termination signals against a fresh flag.
    ///
    /// Registration lasts for the rest of the process.
    pub fn install() -> GameSaveResult<Self> {
        let signal = Self::new();
        for &sig in termination_signals() {
            signal_hook::flag::register(sig, Arc::clone(&signal.requested)).map_err(|e| {
                GameSaveError::Session(format!("Failed to register signal {}: {}", sig, e))
            })?;
        }
        debug!("termination handlers installed");
        Ok(signal)
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Raise the flag by hand
    pub fn request(&self) {
        if !self.requested.swap(true, Ordering::SeqCst) {
            info!("termination requested");
        }
    }
}

#[cfg(unix)]
fn termination_signals() -> &'static [i32] {
    use signal_hook::consts::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
    const SIGNALS: &[i32] = &[SIGTERM, SIGINT, SIGQUIT, SIGHUP];
    SIGNALS
}

#[cfg(not(unix))]
fn termination_signals() -> &'static [i32] {
    signal_hook::consts::TERM_SIGNALS
}
