//! Monitoring sessions
//!
//! A session watches one profile: scheduled Auto backups run in the
//! background while the foreground handles manual backup and restore
//! triggers from an [`EventSource`].

pub mod event;
pub mod monitor;
pub mod signal;

pub use event::{EventSource, KeyboardEvents, ScriptedEvents, TriggerKind};
pub use monitor::{MonitorSession, SessionSummary};
pub use signal::TerminationSignal;
