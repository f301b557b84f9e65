use pollpool::{PollRate, PollerBuilder};

fn main() {
    let poller = PollerBuilder::new()
        .num_workers(2)
        .max_polls(6)
        .poll_rate(PollRate::Slow)
        .before_all(|| println!("Before polling..."))
        .poll(|| {
            let name = std::thread::current().name().map(str::to_owned);
            println!("Hello from {:?}", name);
        })
        .after_all(|| println!("Polling done"))
        .build()
        .unwrap();

    poller.start().unwrap();
    poller.join();
    println!("Last run: {:?}", poller.last_report());
}
