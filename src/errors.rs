//! Error types for the poller.
//!
//! This module defines errors that may occur while configuring, starting or running
//! a [`Poller`](crate::Poller). Configuration and start-time errors are returned to the
//! caller directly; poll-unit failures are contained to the worker that hit them and are
//! reported through logging and the optional error hook.

use std::any::Any;

/// A boxed error returned by a fallible poll unit.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Represents errors that can occur in the poller.
#[derive(Debug, thiserror::Error)]
pub enum PollerError {
    /// The configuration cannot produce a working pool (e.g. zero workers).
    #[error("invalid poller configuration: {0}")]
    InvalidConfig(String),

    /// `start` was called while a previous run has not fully finished.
    #[error("poller is already running")]
    AlreadyRunning,

    /// A poll unit returned an error or panicked. Only the affected worker stops.
    #[error("poll unit failed on worker {worker} after {polls} polls: {source}")]
    PollUnit {
        worker: usize,
        polls: usize,
        #[source]
        source: BoxError,
    },

    /// `compute_poll_type` or `custom_rate` panicked after a successful poll.
    /// Only the affected worker stops.
    #[error("poll rate callback failed on worker {worker} after {polls} polls: {source}")]
    RatePolicy {
        worker: usize,
        polls: usize,
        #[source]
        source: BoxError,
    },

    /// A lifecycle hook panicked.
    #[error("{hook} hook panicked: {message}")]
    HookPanicked { hook: &'static str, message: String },

    /// The operating system refused to create a worker thread.
    #[error("failed to spawn worker thread {worker}: {source}")]
    Spawn {
        worker: usize,
        #[source]
        source: std::io::Error,
    },

    /// A poll rate name did not match any known tier.
    #[error("unknown poll rate `{0}`")]
    UnknownPollRate(String),
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
