//! Worker logic for the poller

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{Receiver, RecvTimeoutError};

use super::hooks::Hooks;
use super::state::{ExitCause, RunState};
use crate::errors::PollerError;
use crate::metrics::MetricsCollector;

pub struct WorkerHandle {
    id: usize,
    thread: Option<thread::JoinHandle<()>>,
}

impl WorkerHandle {
    pub fn new(id: usize, thread: thread::JoinHandle<()>) -> Self {
        Self {
            id,
            thread: Some(thread),
        }
    }

    /// Waits for the worker thread to exit. A worker never joins itself; when called
    /// from its own thread (e.g. inside `after_all`) the handle is just released.
    pub fn join(&mut self) {
        if let Some(handle) = self.thread.take() {
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                tracing::warn!(worker_id = self.id, "worker thread panicked");
            }
        }
    }
}

/// Internal control signal of the loop. Never leaves this module.
enum LoopSignal {
    Continue,
    Cancel(ExitCause),
}

enum WorkerState {
    Running,
    Exiting(ExitCause),
    Exited,
}

/// Everything one worker thread needs for a run.
pub(crate) struct WorkerContext {
    pub id: usize,
    pub max_polls: usize,
    pub state: Arc<RunState>,
    pub hooks: Arc<Hooks>,
    pub wake: Receiver<()>,
    pub metrics_collector: Option<Arc<dyn MetricsCollector>>,
}

/// Worker thread main loop
pub(crate) fn worker_loop(ctx: WorkerContext) {
    tracing::debug!(worker_id = ctx.id, "worker started");
    if let Some(m) = ctx.metrics_collector.as_ref() {
        m.on_worker_started();
    }

    let mut state = WorkerState::Running;
    loop {
        state = match state {
            WorkerState::Running => match ctx.step() {
                LoopSignal::Continue => WorkerState::Running,
                LoopSignal::Cancel(cause) => WorkerState::Exiting(cause),
            },
            WorkerState::Exiting(cause) => {
                ctx.exit(cause);
                WorkerState::Exited
            }
            WorkerState::Exited => break,
        };
    }
}

impl WorkerContext {
    fn step(&self) -> LoopSignal {
        if let Some(cause) = self.state.stop_cause(self.max_polls) {
            return LoopSignal::Cancel(cause);
        }

        if let Err(source) = self.hooks.poll() {
            if let Some(m) = self.metrics_collector.as_ref() {
                m.on_poll_failed();
            }
            let polls = self.state.polls();
            return self.fail(PollerError::PollUnit {
                worker: self.id,
                polls,
                source,
            });
        }
        let polls = self.state.record_poll();
        if let Some(m) = self.metrics_collector.as_ref() {
            m.on_poll_completed();
        }

        let delay = match self.hooks.next_delay() {
            Ok(delay) => delay,
            Err(source) => {
                return self.fail(PollerError::RatePolicy {
                    worker: self.id,
                    polls,
                    source,
                })
            }
        };

        // Budget used up: skip the rest and let sleeping siblings see it too.
        if self.max_polls > 0 && polls >= self.max_polls {
            self.state.wake_all();
        } else {
            self.rest(delay);
        }
        LoopSignal::Continue
    }

    fn rest(&self, delay: Duration) {
        if delay.is_zero() {
            thread::yield_now();
            return;
        }
        match self.wake.recv_timeout(delay) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                tracing::trace!(worker_id = self.id, "rest cut short");
            }
        }
    }

    fn fail(&self, err: PollerError) -> LoopSignal {
        tracing::error!(worker_id = self.id, error = %err, "stopping worker after failure");
        self.state.mark_failed();
        self.hooks.report(&err);
        LoopSignal::Cancel(ExitCause::WorkerFailed)
    }

    fn exit(&self, cause: ExitCause) {
        tracing::debug!(worker_id = self.id, ?cause, "worker exiting");
        if let Some(m) = self.metrics_collector.as_ref() {
            m.on_worker_stopped();
        }
        if self.state.release(1) {
            complete_run(&self.state, &self.hooks, self.metrics_collector.as_deref());
        }
    }
}

/// Runs the end-of-run barrier work. Must only be called by the caller whose
/// [`RunState::release`] returned `true`.
pub(crate) fn complete_run(
    state: &RunState,
    hooks: &Hooks,
    metrics_collector: Option<&dyn MetricsCollector>,
) {
    let report = state.reset_after_barrier();
    hooks.after_all();
    if let Some(m) = metrics_collector {
        m.on_run_finished();
    }
    tracing::info!(
        polls = report.polls_executed,
        failed_workers = report.failed_workers,
        "poller run finished"
    );
    state.finish();
}
