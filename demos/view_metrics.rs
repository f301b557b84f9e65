use pollpool::{
    log_metrics,
    metrics::{AtomicMetricsCollector, PollerMetrics},
    PollRate, PollerBuilder,
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread;
use std::time::Duration;

fn main() {
    tracing_subscriber::fmt::init();

    // Create metrics and collector
    let metrics = Arc::new(PollerMetrics::new());
    let collector = Arc::new(AtomicMetricsCollector::new(metrics.clone()));

    let poller = PollerBuilder::new()
        .num_workers(4)
        .poll_rate(PollRate::Slow)
        .poll(|| thread::sleep(Duration::from_millis(20))) // Simulate work
        .with_metrics_collector(collector)
        .build()
        .unwrap();

    // Create a flag to stop monitoring
    let running = Arc::new(AtomicBool::new(true));

    // Spawn a monitoring thread to display live updates
    let metrics_clone = metrics.clone();
    let running_clone = running.clone();
    let monitor_handle = thread::spawn(move || {
        while running_clone.load(Ordering::Acquire) {
            log_metrics!(metrics_clone);
            thread::sleep(Duration::from_millis(200));
        }
    });

    poller.start().unwrap();
    thread::sleep(Duration::from_millis(1000));
    poller.shutdown();

    // Stop the monitoring thread
    running.store(false, Ordering::Release);
    monitor_handle.join().unwrap();

    println!("\n--- Final Metrics ---");
    println!("Runs finished: {}", metrics.runs_finished.load(Ordering::SeqCst));
    println!("Completed polls: {}", metrics.completed_polls.load(Ordering::SeqCst));
    println!("Failed polls: {}", metrics.failed_polls.load(Ordering::SeqCst));
    println!("Active threads: {}", metrics.active_threads.load(Ordering::SeqCst));
}
