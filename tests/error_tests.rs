mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use common::{init_tracing, wait_until};
use pollpool::metrics::{AtomicMetricsCollector, PollerMetrics};
use pollpool::{PollRate, PollerBuilder, PollerError};

fn on_worker(name: &str) -> bool {
    thread::current().name() == Some(name)
}

#[test]
fn test_poll_error_stops_only_the_failing_worker() {
    init_tracing();
    let failures = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&failures);
    let after = Arc::new(AtomicUsize::new(0));
    let after_in = Arc::clone(&after);

    let poller = PollerBuilder::new()
        .num_workers(3)
        .poll_rate(PollRate::Quick)
        .try_poll(|| {
            if on_worker("poller-0") {
                Err("storage unavailable")
            } else {
                Ok(())
            }
        })
        .on_error(move |err| {
            if let PollerError::PollUnit { worker, .. } = err {
                seen.lock().unwrap().push(*worker);
            }
        })
        .after_all(move || {
            after_in.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .unwrap();

    poller.start().unwrap();
    assert!(wait_until(Duration::from_secs(2), || poller.active_workers() == 2));

    // The two healthy workers keep polling.
    let polls = poller.polls_executed();
    assert!(wait_until(Duration::from_secs(2), || poller.polls_executed() > polls));
    assert_eq!(after.load(Ordering::SeqCst), 0);

    poller.stop();
    poller.join();

    assert_eq!(*failures.lock().unwrap(), vec![0]);
    assert_eq!(after.load(Ordering::SeqCst), 1);
    assert_eq!(poller.last_report().unwrap().failed_workers, 1);
}

#[test]
fn test_all_workers_failing_still_finishes_run() {
    init_tracing();
    let after = Arc::new(AtomicUsize::new(0));
    let after_in = Arc::clone(&after);

    let poller = PollerBuilder::new()
        .num_workers(4)
        .try_poll(|| Err::<(), _>(std::io::Error::other("broken pipe")))
        .after_all(move || {
            after_in.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .unwrap();

    poller.start().unwrap();
    poller.join();

    let report = poller.last_report().unwrap();
    assert_eq!(report.failed_workers, 4);
    assert_eq!(report.polls_executed, 0);
    assert_eq!(after.load(Ordering::SeqCst), 1);
    assert!(!poller.is_running());
}

#[test]
fn test_panicking_poll_is_contained() {
    init_tracing();
    let messages = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&messages);

    let poller = PollerBuilder::new()
        .num_workers(2)
        .poll_rate(PollRate::Quick)
        .poll(|| {
            if on_worker("poller-1") {
                panic!("corrupt record");
            }
        })
        .on_error(move |err| seen.lock().unwrap().push(err.to_string()))
        .build()
        .unwrap();

    poller.start().unwrap();
    assert!(wait_until(Duration::from_secs(2), || poller.active_workers() == 1));
    poller.stop();
    poller.join();

    let messages = messages.lock().unwrap();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("worker 1"));
    assert!(messages[0].contains("corrupt record"));
    assert_eq!(poller.last_report().unwrap().failed_workers, 1);
}

#[test]
fn test_error_reports_poll_count_at_failure() {
    init_tracing();
    let calls = Arc::new(AtomicUsize::new(0));
    let reported = Arc::new(Mutex::new(None));
    let seen = Arc::clone(&reported);

    let poller = PollerBuilder::new()
        .num_workers(1)
        .poll_rate(PollRate::Unlimited)
        .try_poll(move || {
            if calls.fetch_add(1, Ordering::SeqCst) == 2 {
                Err("third poll fails")
            } else {
                Ok(())
            }
        })
        .on_error(move |err| {
            if let PollerError::PollUnit { polls, .. } = err {
                *seen.lock().unwrap() = Some(*polls);
            }
        })
        .build()
        .unwrap();

    poller.start().unwrap();
    poller.join();

    assert_eq!(*reported.lock().unwrap(), Some(2));
    assert_eq!(poller.last_report().unwrap().polls_executed, 2);
}

#[test]
fn test_rate_callback_panic_is_not_a_failed_poll() {
    init_tracing();
    let metrics = Arc::new(PollerMetrics::new());
    let errors = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&errors);

    let poller = PollerBuilder::new()
        .num_workers(1)
        .compute_poll_type(|| panic!("rate table missing"))
        .on_error(move |err| {
            let is_rate = matches!(err, PollerError::RatePolicy { polls: 1, .. });
            seen.lock().unwrap().push((is_rate, err.to_string()));
        })
        .with_metrics_collector(Arc::new(AtomicMetricsCollector::new(Arc::clone(
            &metrics,
        ))))
        .build()
        .unwrap();

    poller.start().unwrap();
    poller.join();

    let errors = errors.lock().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].0);
    assert!(errors[0].1.contains("rate table missing"));
    assert_eq!(metrics.failed_polls.load(Ordering::SeqCst), 0);
    assert_eq!(metrics.completed_polls.load(Ordering::SeqCst), 1);

    let report = poller.last_report().unwrap();
    assert_eq!(report.failed_workers, 1);
    assert_eq!(report.polls_executed, 1);
}

#[test]
fn test_before_all_panic_aborts_start() {
    init_tracing();
    let polls = Arc::new(AtomicUsize::new(0));
    let polls_in = Arc::clone(&polls);

    let poller = PollerBuilder::new()
        .num_workers(2)
        .before_all(|| panic!("fixtures missing"))
        .poll(move || {
            polls_in.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .unwrap();

    let err = poller.start().unwrap_err();
    assert!(matches!(err, PollerError::HookPanicked { hook: "before_all", .. }));
    assert!(!poller.is_running());
    assert_eq!(poller.active_workers(), 0);

    thread::sleep(Duration::from_millis(50));
    assert_eq!(polls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_after_all_panic_leaves_poller_restartable() {
    init_tracing();
    let runs = Arc::new(AtomicUsize::new(0));
    let runs_in = Arc::clone(&runs);

    let poller = PollerBuilder::new()
        .num_workers(2)
        .max_polls(1)
        .poll_rate(PollRate::Unlimited)
        .after_all(move || {
            runs_in.fetch_add(1, Ordering::SeqCst);
            panic!("report sink closed");
        })
        .build()
        .unwrap();

    poller.start().unwrap();
    poller.join();
    assert!(!poller.is_running());

    poller.start().unwrap();
    poller.join();
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}
