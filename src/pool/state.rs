//! Shared run state and the end-of-run barrier.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crossbeam::channel::{bounded, Receiver, Sender};

use crate::errors::PollerError;

/// Summary of a finished run, captured just before the poll counter is reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// Polls that completed successfully during the run.
    pub polls_executed: usize,
    /// Workers that stopped because their poll unit or rate callback failed.
    pub failed_workers: usize,
}

/// Why a worker left its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExitCause {
    StopRequested,
    MaxPollsReached,
    WorkerFailed,
}

/// Counters and flags shared by the pool manager and every worker.
///
/// `active_workers` only goes down during a run. The worker that takes it to zero
/// resets both counters and fires `after_all`.
#[derive(Default)]
pub(crate) struct RunState {
    polls: AtomicUsize,
    active_workers: AtomicUsize,
    failed_workers: AtomicUsize,
    stop_requested: AtomicBool,
    running: AtomicBool,
    // Dropping the sender wakes every sleeping worker of the current run.
    wake: Mutex<Option<Sender<()>>>,
    last_report: Mutex<Option<RunReport>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the pool for a new run.
    pub fn try_begin(&self) -> Result<(), PollerError> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_| PollerError::AlreadyRunning)
    }

    /// Gives the pool back without running any worker.
    pub fn abort_begin(&self) {
        self.wake_all();
        self.running.store(false, Ordering::Release);
    }

    /// Clears the stop flag and returns the wake-up channel for this run's workers.
    pub fn arm(&self) -> Receiver<()> {
        let (tx, rx) = bounded(0);
        self.failed_workers.store(0, Ordering::SeqCst);
        self.stop_requested.store(false, Ordering::SeqCst);
        *lock(&self.wake) = Some(tx);
        rx
    }

    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
        self.wake_all();
    }

    /// Cuts every pending rest of the current run short.
    pub fn wake_all(&self) {
        lock(&self.wake).take();
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Evaluates the stop condition at the top of a worker iteration.
    pub fn stop_cause(&self, max_polls: usize) -> Option<ExitCause> {
        if self.is_stop_requested() {
            Some(ExitCause::StopRequested)
        } else if max_polls > 0 && self.polls() >= max_polls {
            Some(ExitCause::MaxPollsReached)
        } else {
            None
        }
    }

    /// Counts a completed poll and returns the new total.
    pub fn record_poll(&self) -> usize {
        self.polls.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn mark_failed(&self) {
        self.failed_workers.fetch_add(1, Ordering::SeqCst);
    }

    pub fn set_active(&self, workers: usize) {
        self.active_workers.store(workers, Ordering::SeqCst);
    }

    pub fn active_workers(&self) -> usize {
        self.active_workers.load(Ordering::SeqCst)
    }

    /// Removes `workers` from the active count. Returns `true` for exactly one caller
    /// per run: the one whose subtraction reached zero.
    pub fn release(&self, workers: usize) -> bool {
        self.active_workers.fetch_sub(workers, Ordering::AcqRel) == workers
    }

    /// Gives back the slots of workers that were never spawned because spawning
    /// worker `spawned` failed. Same contract as [`release`](Self::release).
    pub fn release_unspawned(&self, workers: usize, spawned: usize) -> bool {
        self.release(workers - spawned)
    }

    /// Resets the counters once the barrier has fired and records the run summary.
    pub fn reset_after_barrier(&self) -> RunReport {
        let report = RunReport {
            polls_executed: self.polls.swap(0, Ordering::SeqCst),
            failed_workers: self.failed_workers.load(Ordering::SeqCst),
        };
        self.active_workers.store(0, Ordering::SeqCst);
        *lock(&self.last_report) = Some(report);
        report
    }

    /// Marks the pool idle. Called after `after_all` returns.
    pub fn finish(&self) {
        self.wake_all();
        self.running.store(false, Ordering::Release);
    }

    pub fn last_report(&self) -> Option<RunReport> {
        *lock(&self.last_report)
    }
}
