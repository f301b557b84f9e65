//! Caller-supplied callbacks run by the poller.

use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use crate::errors::{panic_message, BoxError, PollerError};
use crate::rate::{rate_for, PollRate, DEFAULT_CUSTOM_RATE};

pub type HookFn = Box<dyn Fn() + Send + Sync + 'static>;
pub type PollFn = Box<dyn Fn() -> Result<(), BoxError> + Send + Sync + 'static>;
pub type PollTypeFn = Box<dyn Fn() -> PollRate + Send + Sync + 'static>;
pub type CustomRateFn = Box<dyn Fn() -> Duration + Send + Sync + 'static>;
pub type ErrorFn = Box<dyn Fn(&PollerError) + Send + Sync + 'static>;

/// The unit of work plus the lifecycle and rate callbacks around it.
///
/// Every callback is shared by all workers, so they must be `Send + Sync`.
pub struct Hooks {
    pub(crate) before_all: Option<HookFn>,
    pub(crate) poll: PollFn,
    pub(crate) after_all: Option<HookFn>,
    pub(crate) compute_poll_type: Option<PollTypeFn>,
    pub(crate) custom_rate: Option<CustomRateFn>,
    pub(crate) on_error: Option<ErrorFn>,
}

impl Default for Hooks {
    fn default() -> Self {
        Self {
            before_all: None,
            poll: Box::new(|| Ok::<(), BoxError>(())),
            after_all: None,
            compute_poll_type: None,
            custom_rate: None,
            on_error: None,
        }
    }
}

impl Hooks {
    pub(crate) fn before_all(&self) -> Result<(), PollerError> {
        match &self.before_all {
            Some(hook) => guard("before_all", hook),
            None => Ok(()),
        }
    }

    /// Runs `after_all`. A panic is logged rather than propagated so the run still completes.
    pub(crate) fn after_all(&self) {
        if let Some(hook) = &self.after_all {
            if let Err(err) = guard("after_all", hook) {
                tracing::warn!(error = %err, "after_all hook failed");
            }
        }
    }

    /// Runs one poll. A panic is turned into an error like any returned failure.
    pub(crate) fn poll(&self) -> Result<(), BoxError> {
        match panic::catch_unwind(AssertUnwindSafe(|| (self.poll)())) {
            Ok(result) => result,
            Err(payload) => {
                Err(format!("poll unit panicked: {}", panic_message(payload.as_ref())).into())
            }
        }
    }

    pub(crate) fn poll_type(&self) -> PollRate {
        self.compute_poll_type
            .as_ref()
            .map_or_else(PollRate::default, |compute| compute())
    }

    /// Delay to sleep after a poll, evaluated fresh on every call.
    pub(crate) fn next_delay(&self) -> Result<Duration, BoxError> {
        panic::catch_unwind(AssertUnwindSafe(|| {
            rate_for(self.poll_type(), || {
                self.custom_rate
                    .as_ref()
                    .map_or(DEFAULT_CUSTOM_RATE, |custom| custom())
            })
        }))
        .map_err(|payload| {
            format!("poll rate callback panicked: {}", panic_message(payload.as_ref())).into()
        })
    }

    pub(crate) fn report(&self, err: &PollerError) {
        if let Some(on_error) = &self.on_error {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| on_error(err))) {
                tracing::warn!(
                    message = %panic_message(payload.as_ref()),
                    "on_error hook panicked"
                );
            }
        }
    }
}

fn guard(hook: &'static str, f: &HookFn) -> Result<(), PollerError> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| PollerError::HookPanicked {
        hook,
        message: panic_message(payload.as_ref()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn defaults_do_nothing_at_medium_rate() {
        let hooks = Hooks::default();
        assert!(hooks.before_all().is_ok());
        assert!(hooks.poll().is_ok());
        hooks.after_all();
        assert_eq!(hooks.next_delay().unwrap(), Duration::from_millis(80));
    }

    #[test]
    fn custom_rate_defaults_to_five_seconds() {
        let hooks = Hooks {
            compute_poll_type: Some(Box::new(|| PollRate::Custom)),
            ..Hooks::default()
        };
        assert_eq!(hooks.next_delay().unwrap(), DEFAULT_CUSTOM_RATE);
    }

    #[test]
    fn poll_type_is_recomputed_every_time() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let hooks = Hooks {
            compute_poll_type: Some(Box::new(move || {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    PollRate::Slow
                } else {
                    PollRate::Unlimited
                }
            })),
            ..Hooks::default()
        };

        assert_eq!(hooks.next_delay().unwrap(), Duration::from_millis(100));
        assert_eq!(hooks.next_delay().unwrap(), Duration::ZERO);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn panicking_poll_becomes_error() {
        let hooks = Hooks {
            poll: Box::new(|| -> Result<(), BoxError> { panic!("queue poisoned") }),
            ..Hooks::default()
        };
        let err = hooks.poll().unwrap_err();
        assert!(err.to_string().contains("queue poisoned"));
    }

    #[test]
    fn panicking_before_all_is_reported() {
        let hooks = Hooks {
            before_all: Some(Box::new(|| panic!("no fixtures"))),
            ..Hooks::default()
        };
        let err = hooks.before_all().unwrap_err();
        assert!(matches!(
            err,
            PollerError::HookPanicked { hook: "before_all", ref message } if message == "no fixtures"
        ));
    }
}
