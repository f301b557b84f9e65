//! Metrics collection for the poller.
//!
//! This module defines the `MetricsCollector` trait for collecting metrics about the
//! poller's activity, as well as a default implementation backed by atomic counters.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A trait for collecting metrics from the poller.
///
/// Implementations receive a callback for every run, poll and worker lifecycle event.
/// Callbacks run on worker threads (or on the thread calling `start`) and must be cheap.
pub trait MetricsCollector: Send + Sync {
    /// Called once per run, after `before_all` and before any worker starts.
    fn on_run_started(&self, workers: usize);
    /// Called after a poll unit returned successfully.
    fn on_poll_completed(&self);
    /// Called when a poll unit returned an error or panicked. A failing rate
    /// callback stops its worker without counting as a failed poll.
    fn on_poll_failed(&self);
    /// Called when a worker thread enters its loop.
    fn on_worker_started(&self);
    /// Called when a worker thread leaves its loop.
    fn on_worker_stopped(&self);
    /// Called once per run, by the last worker, after `after_all`.
    fn on_run_finished(&self);
}

/// Stores metrics for the poller using atomic counters.
#[derive(Debug, Default)]
pub struct PollerMetrics {
    /// Number of runs started.
    pub runs_started: AtomicUsize,
    /// Number of runs that reached the end-of-run barrier.
    pub runs_finished: AtomicUsize,
    /// Total number of successful polls over every run.
    pub completed_polls: AtomicUsize,
    /// Total number of failed polls over every run.
    pub failed_polls: AtomicUsize,
    /// Number of worker threads currently inside their loop.
    pub active_threads: AtomicUsize,
}

impl PollerMetrics {
    /// Creates a new `PollerMetrics` instance with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }
}

/// A default implementation of `MetricsCollector` using atomic counters.
///
/// It is backed by an `Arc<PollerMetrics>` so the counters can be read while the
/// poller is running.
pub struct AtomicMetricsCollector {
    /// Shared metrics storage.
    pub metrics: Arc<PollerMetrics>,
}

impl AtomicMetricsCollector {
    pub fn new(metrics: Arc<PollerMetrics>) -> Self {
        Self { metrics }
    }
}

impl MetricsCollector for AtomicMetricsCollector {
    fn on_run_started(&self, _workers: usize) {
        self.metrics.runs_started.fetch_add(1, Ordering::SeqCst);
    }

    fn on_poll_completed(&self) {
        self.metrics.completed_polls.fetch_add(1, Ordering::SeqCst);
    }

    fn on_poll_failed(&self) {
        self.metrics.failed_polls.fetch_add(1, Ordering::SeqCst);
    }

    fn on_worker_started(&self) {
        self.metrics.active_threads.fetch_add(1, Ordering::SeqCst);
    }

    fn on_worker_stopped(&self) {
        self.metrics.active_threads.fetch_sub(1, Ordering::SeqCst);
    }

    fn on_run_finished(&self) {
        self.metrics.runs_finished.fetch_add(1, Ordering::SeqCst);
    }
}
