//! # pollpool
//!
//! `pollpool` runs a fixed-size pool of worker threads that each call the same poll
//! unit over and over, resting between calls according to a [`PollRate`], until the
//! pool is stopped or a poll budget is used up.
//!
//! ## Features
//! - Configurable number of workers and an optional total poll budget per run.
//! - Named rate tiers, recomputed after every poll, plus a caller-defined custom rate.
//! - `before_all` runs once before any poll; `after_all` runs once, on the last worker
//!   to exit, after every poll of the run.
//! - Stopping wakes sleeping workers immediately.
//! - A failing or panicking poll unit stops only its own worker.
//! - The same poller can be started again after a run finished.
//! - Metrics collection for monitoring poller activity.
//!
//! ## Usage
//!
//! ### Bounded run
//! ```rust
//! use pollpool::{PollRate, PollerBuilder};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let calls = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&calls);
//!
//! let poller = PollerBuilder::new()
//!     .num_workers(1)
//!     .max_polls(5)
//!     .poll_rate(PollRate::UltraHigh)
//!     .poll(move || {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!     })
//!     .build()
//!     .unwrap();
//!
//! poller.start().unwrap();
//! poller.join();
//!
//! assert_eq!(calls.load(Ordering::SeqCst), 5);
//! assert_eq!(poller.polls_executed(), 0);
//! ```
//!
//! ### Stopping from inside a poll
//! ```rust
//! use crossbeam::queue::SegQueue;
//! use pollpool::{PollRate, PollerBuilder};
//! use std::sync::Arc;
//!
//! let source = Arc::new(SegQueue::new());
//! let sink = Arc::new(SegQueue::new());
//!
//! let builder = PollerBuilder::new().num_workers(4).poll_rate(PollRate::Unlimited);
//! let stopper = builder.stop_handle();
//!
//! let (src, dst) = (Arc::clone(&source), Arc::clone(&sink));
//! let fill = Arc::clone(&source);
//! let poller = builder
//!     .before_all(move || (0..100).for_each(|i| fill.push(i)))
//!     .poll(move || match src.pop() {
//!         Some(item) => dst.push(item),
//!         None => stopper.stop(),
//!     })
//!     .build()
//!     .unwrap();
//!
//! poller.start().unwrap();
//! poller.join();
//! assert_eq!(sink.len(), 100);
//! ```
//!
//! ### Collecting Metrics
//! ```rust
//! use pollpool::{metrics::{AtomicMetricsCollector, PollerMetrics}, PollRate, PollerBuilder};
//! use std::sync::atomic::Ordering;
//! use std::sync::Arc;
//!
//! let metrics = Arc::new(PollerMetrics::new());
//! let collector = Arc::new(AtomicMetricsCollector::new(metrics.clone()));
//!
//! let poller = PollerBuilder::new()
//!     .num_workers(2)
//!     .max_polls(10)
//!     .poll_rate(PollRate::Unlimited)
//!     .with_metrics_collector(collector)
//!     .build()
//!     .unwrap();
//!
//! poller.start().unwrap();
//! poller.join();
//!
//! assert!(metrics.completed_polls.load(Ordering::SeqCst) >= 10);
//! assert_eq!(metrics.runs_finished.load(Ordering::SeqCst), 1);
//! ```

pub mod config;
mod errors;
mod macros;
pub mod metrics;
pub mod pool;
pub mod rate;

pub use config::PollerConfig;
pub use errors::{BoxError, PollerError};
pub use pool::state::RunReport;
pub use pool::{Poller, PollerBuilder, StopHandle};
pub use rate::{rate_for, PollRate};

#[doc(hidden)]
pub mod __private {
    pub use tracing;
}
