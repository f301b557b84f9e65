#![cfg(target_os = "linux")]

use pollpool::{PollRate, PollerBuilder};

fn count_threads() -> usize {
    use procfs::process::Process;

    let process = Process::myself().expect("Failed to get process info");
    process.tasks().expect("Failed to get task list").count()
}

#[test]
fn test_poller_threads_lifecycle() {
    let initial_thread_count = count_threads();

    let num_workers = 4;
    let poller = PollerBuilder::new()
        .num_workers(num_workers)
        .poll_rate(PollRate::Quick)
        .build()
        .unwrap();

    // No thread exists before the first run.
    assert_eq!(count_threads(), initial_thread_count);

    poller.start().unwrap();
    std::thread::sleep(std::time::Duration::from_millis(100));
    let thread_count_after_start = count_threads();

    assert!(
        thread_count_after_start >= initial_thread_count + num_workers,
        "Expected at least {} threads to be started, found {}",
        num_workers,
        thread_count_after_start - initial_thread_count
    );

    poller.stop();
    poller.join();

    std::thread::sleep(std::time::Duration::from_millis(100));
    let final_thread_count = count_threads();

    assert_eq!(
        final_thread_count, initial_thread_count,
        "Expected all worker threads to terminate after stop"
    );
}
