use pollpool::{create_poller, PollRate};

fn main() {
    let poller = create_poller!(workers: 4, poll: || println!("Polling at the default rate")).unwrap();
    poller.start().unwrap();
    std::thread::sleep(std::time::Duration::from_millis(200));
    poller.shutdown();

    let poller = create_poller!(
        workers: 2,
        poll: || println!("Polling quickly"),
        rate: PollRate::Quick,
        max_polls: 10
    )
    .unwrap();
    poller.start().unwrap();
    poller.join();
}
