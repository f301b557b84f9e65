//! # Macros for `pollpool`
//!
//! Shortcuts for building pollers and reporting their metrics.

/// Builds a poller from a worker count, a poll unit and optional settings.
///
/// Expands to a [`PollerBuilder`](crate::PollerBuilder) chain and returns the
/// `Result` of `build`.
///
/// # Examples
/// ```rust
/// use pollpool::{create_poller, PollRate};
///
/// let poller = create_poller!(workers: 2, poll: || {}).unwrap();
/// poller.shutdown();
///
/// let bounded = create_poller!(
///     workers: 1,
///     poll: || {},
///     rate: PollRate::Unlimited,
///     max_polls: 3
/// )
/// .unwrap();
/// bounded.start().unwrap();
/// bounded.join();
/// assert_eq!(bounded.last_report().unwrap().polls_executed, 3);
/// ```
#[macro_export]
macro_rules! create_poller {
    (workers: $num:expr, poll: $poll:expr) => {
        $crate::PollerBuilder::new()
            .num_workers($num)
            .poll($poll)
            .build()
    };
    (workers: $num:expr, poll: $poll:expr, rate: $rate:expr) => {
        $crate::PollerBuilder::new()
            .num_workers($num)
            .poll($poll)
            .poll_rate($rate)
            .build()
    };
    (workers: $num:expr, poll: $poll:expr, rate: $rate:expr, max_polls: $max:expr) => {
        $crate::PollerBuilder::new()
            .num_workers($num)
            .poll($poll)
            .poll_rate($rate)
            .max_polls($max)
            .build()
    };
}

/// Logs a snapshot of [`PollerMetrics`](crate::metrics::PollerMetrics) at `info` level.
///
/// # Example
/// ```rust
/// use pollpool::{log_metrics, metrics::PollerMetrics};
///
/// let metrics = PollerMetrics::new();
/// log_metrics!(metrics);
/// ```
#[macro_export]
macro_rules! log_metrics {
    ($metrics:expr) => {
        $crate::__private::tracing::info!(
            runs_started = $metrics
                .runs_started
                .load(::std::sync::atomic::Ordering::SeqCst),
            runs_finished = $metrics
                .runs_finished
                .load(::std::sync::atomic::Ordering::SeqCst),
            completed_polls = $metrics
                .completed_polls
                .load(::std::sync::atomic::Ordering::SeqCst),
            failed_polls = $metrics
                .failed_polls
                .load(::std::sync::atomic::Ordering::SeqCst),
            active_threads = $metrics
                .active_threads
                .load(::std::sync::atomic::Ordering::SeqCst),
            "poller metrics"
        )
    };
}
