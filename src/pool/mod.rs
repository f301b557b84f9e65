pub(crate) mod hooks;
pub(crate) mod state;
mod worker;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use crate::config::PollerConfig;
use crate::errors::{BoxError, PollerError};
use crate::metrics::MetricsCollector;
use crate::rate::PollRate;
use hooks::Hooks;
use state::{RunReport, RunState};
use worker::{complete_run, worker_loop, WorkerContext, WorkerHandle};

/// A fixed-size pool of workers that repeatedly run one poll unit.
///
/// The same poller can be started again once a run has fully finished, i.e. once
/// `after_all` has returned. Dropping the poller stops the current run and waits for it.
pub struct Poller {
    config: PollerConfig,
    hooks: Arc<Hooks>,
    state: Arc<RunState>,
    workers: Mutex<Vec<WorkerHandle>>,
    metrics_collector: Option<Arc<dyn MetricsCollector>>,
}

impl Poller {
    pub fn builder() -> PollerBuilder {
        PollerBuilder::new()
    }

    /// Creates a poller with `worker_count` workers running `poll` at the default rate.
    pub fn new<F>(worker_count: usize, poll: F) -> Result<Self, PollerError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        PollerBuilder::new().num_workers(worker_count).poll(poll).build()
    }

    /// Runs `before_all`, then launches every worker.
    ///
    /// Fails with [`PollerError::AlreadyRunning`] if the previous run has not finished.
    pub fn start(&self) -> Result<(), PollerError> {
        self.state.try_begin()?;

        // Threads left from the previous run have already passed the barrier.
        let mut handles = self.lock_workers();
        for handle in handles.iter_mut() {
            handle.join();
        }
        handles.clear();

        let wake = self.state.arm();
        if let Err(err) = self.hooks.before_all() {
            tracing::warn!(error = %err, "before_all failed, run aborted");
            self.state.abort_begin();
            return Err(err);
        }

        let workers = self.config.worker_count;
        self.state.set_active(workers);
        tracing::info!(workers, max_polls = self.config.max_polls, "starting poller run");
        if let Some(m) = self.metrics_collector.as_ref() {
            m.on_run_started(workers);
        }

        for id in 0..workers {
            let ctx = WorkerContext {
                id,
                max_polls: self.config.max_polls,
                state: Arc::clone(&self.state),
                hooks: Arc::clone(&self.hooks),
                wake: wake.clone(),
                metrics_collector: self.metrics_collector.clone(),
            };
            let spawned = thread::Builder::new()
                .name(self.config.worker_thread_name(id))
                .spawn(move || worker_loop(ctx));

            match spawned {
                Ok(handle) => handles.push(WorkerHandle::new(id, handle)),
                Err(source) => {
                    tracing::error!(worker_id = id, error = %source, "failed to spawn worker");
                    self.state.request_stop();
                    if self.state.release_unspawned(workers, id) {
                        complete_run(
                            &self.state,
                            &self.hooks,
                            self.metrics_collector.as_deref(),
                        );
                    }
                    return Err(PollerError::Spawn { worker: id, source });
                }
            }
        }
        Ok(())
    }

    /// Asks every worker to stop. Returns immediately; sleeping workers wake up at once,
    /// a poll in progress is allowed to finish.
    pub fn stop(&self) {
        tracing::debug!("stop requested");
        self.state.request_stop();
    }

    /// Blocks until every worker of the current run has exited, which includes
    /// `after_all` having returned. Concurrent callers all wait for the same run.
    ///
    /// Must not be called from a hook while another thread is joining.
    pub fn join(&self) {
        let mut handles = self.lock_workers();
        for handle in handles.iter_mut() {
            handle.join();
        }
        handles.clear();
    }

    /// Stops the current run and waits for it to finish.
    pub fn shutdown(self) {
        self.stop();
        self.join();
    }

    /// A handle that can stop this poller from anywhere, including its own hooks.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            state: Arc::clone(&self.state),
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn is_stop_requested(&self) -> bool {
        self.state.is_stop_requested()
    }

    /// Polls executed so far in the current run. Reset to 0 when a run finishes.
    pub fn polls_executed(&self) -> usize {
        self.state.polls()
    }

    pub fn active_workers(&self) -> usize {
        self.state.active_workers()
    }

    /// Summary of the most recently finished run.
    pub fn last_report(&self) -> Option<RunReport> {
        self.state.last_report()
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    fn lock_workers(&self) -> MutexGuard<'_, Vec<WorkerHandle>> {
        self.workers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
        self.join();
    }
}

/// Cloneable handle used to stop a poller or peek at its progress.
#[derive(Clone)]
pub struct StopHandle {
    state: Arc<RunState>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.state.request_stop();
    }

    pub fn is_stop_requested(&self) -> bool {
        self.state.is_stop_requested()
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn polls_executed(&self) -> usize {
        self.state.polls()
    }
}

/// Builder for [`Poller`].
pub struct PollerBuilder {
    config: PollerConfig,
    hooks: Hooks,
    metrics_collector: Option<Arc<dyn MetricsCollector>>,
    state: Arc<RunState>,
}

impl Default for PollerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PollerBuilder {
    pub fn new() -> Self {
        Self {
            config: PollerConfig::default(),
            hooks: Hooks::default(),
            metrics_collector: None,
            state: Arc::new(RunState::new()),
        }
    }

    pub fn with_config(mut self, config: PollerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn num_workers(mut self, n: usize) -> Self {
        self.config.worker_count = n;
        self
    }

    /// Total polls per run across all workers; `0` (the default) means unlimited.
    pub fn max_polls(mut self, n: usize) -> Self {
        self.config.max_polls = n;
        self
    }

    pub fn thread_name(mut self, prefix: impl Into<String>) -> Self {
        self.config.thread_name = prefix.into();
        self
    }

    /// Uses the same rate tier for every poll.
    pub fn poll_rate(self, rate: PollRate) -> Self {
        self.compute_poll_type(move || rate)
    }

    /// Picks the rate tier after every poll, so the pace can follow the caller's load.
    pub fn compute_poll_type<F>(mut self, f: F) -> Self
    where
        F: Fn() -> PollRate + Send + Sync + 'static,
    {
        self.hooks.compute_poll_type = Some(Box::new(f));
        self
    }

    /// Delay used whenever the rate tier is [`PollRate::Custom`].
    pub fn custom_rate<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Duration + Send + Sync + 'static,
    {
        self.hooks.custom_rate = Some(Box::new(f));
        self
    }

    pub fn before_all<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.hooks.before_all = Some(Box::new(f));
        self
    }

    pub fn after_all<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.hooks.after_all = Some(Box::new(f));
        self
    }

    pub fn poll<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.hooks.poll = Box::new(move || -> Result<(), BoxError> {
            f();
            Ok(())
        });
        self
    }

    /// Like [`poll`](Self::poll), but an `Err` stops the worker that returned it.
    pub fn try_poll<F, E>(mut self, f: F) -> Self
    where
        F: Fn() -> Result<(), E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.hooks.poll = Box::new(move || -> Result<(), BoxError> { f().map_err(Into::into) });
        self
    }

    /// Called with every poll failure, on the failing worker's thread.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&PollerError) + Send + Sync + 'static,
    {
        self.hooks.on_error = Some(Box::new(f));
        self
    }

    pub fn with_metrics_collector(mut self, collector: Arc<dyn MetricsCollector>) -> Self {
        self.metrics_collector = Some(collector);
        self
    }

    /// A stop handle for the poller this builder will produce. Available before
    /// `build` so hooks can capture it.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            state: Arc::clone(&self.state),
        }
    }

    pub fn build(self) -> Result<Poller, PollerError> {
        self.config.validate()?;
        Ok(Poller {
            workers: Mutex::new(Vec::with_capacity(self.config.worker_count)),
            config: self.config,
            hooks: Arc::new(self.hooks),
            state: self.state,
            metrics_collector: self.metrics_collector,
        })
    }
}
