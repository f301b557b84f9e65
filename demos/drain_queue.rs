use crossbeam::queue::SegQueue;
use pollpool::{PollRate, PollerBuilder};
use std::sync::Arc;

fn main() {
    tracing_subscriber::fmt::init();

    let data = Arc::new(SegQueue::new());
    let trash = Arc::new(SegQueue::new());

    let builder = PollerBuilder::new()
        .num_workers(10)
        .poll_rate(PollRate::Unlimited);
    let stopper = builder.stop_handle();

    let fill = Arc::clone(&data);
    let (src, dst) = (Arc::clone(&data), Arc::clone(&trash));
    let (src_len, dst_len) = (Arc::clone(&data), Arc::clone(&trash));

    let poller = builder
        .before_all(move || {
            for i in 0..12_000 {
                fill.push(i.to_string());
            }
            println!("Before polling...");
        })
        .poll(move || match src.pop() {
            Some(item) => dst.push(item),
            None => stopper.stop(),
        })
        .after_all(move || {
            println!(
                "Polling done...data now has {} items while trash now has {} items",
                src_len.len(),
                dst_len.len()
            );
        })
        .build()
        .unwrap();

    poller.start().unwrap();
    poller.join();
}
