//! Static configuration of a poller.

use crate::errors::PollerError;

/// Number of workers used when the builder is not told otherwise.
pub const DEFAULT_WORKERS: usize = 4;

/// Prefix used to name worker threads.
pub const DEFAULT_THREAD_NAME: &str = "poller";

/// Settings fixed at construction and left untouched by every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerConfig {
    /// Number of worker threads started on each run. Must be at least 1.
    pub worker_count: usize,
    /// Total polls per run across all workers. `0` means unlimited.
    pub max_polls: usize,
    /// Worker threads are named `{thread_name}-{index}`.
    pub thread_name: String,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKERS,
            max_polls: 0,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }
}

impl PollerConfig {
    pub fn new(worker_count: usize) -> Self {
        Self {
            worker_count,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), PollerError> {
        if self.worker_count == 0 {
            return Err(PollerError::InvalidConfig(
                "worker count must be at least 1".to_string(),
            ));
        }
        if self.thread_name.is_empty() {
            return Err(PollerError::InvalidConfig(
                "thread name prefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn worker_thread_name(&self, index: usize) -> String {
        format!("{}-{}", self.thread_name, index)
    }
}
