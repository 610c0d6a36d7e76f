//! Producers and consumers sharing a blocking MRI queue.
//!
//! Producers never wait for space: when consumers fall behind, the oldest
//! readings are dropped and consumers always see recent data.
//!
//! Run with: `RUST_LOG=debug cargo run --example basic_blocking`

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use mriqueue::builder::QueueBuilder;

fn main() {
    // Initialize logging (optional)
    env_logger::init();

    let queue = Arc::new(QueueBuilder::new(8).build_blocking::<(usize, u64)>());

    let producers: Vec<_> = (0..3)
        .map(|sensor| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for reading in 0..100 {
                    queue.put((sensor, reading));
                }
            })
        })
        .collect();

    let consumer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            let mut received = 0;
            while let Some((sensor, reading)) = queue.poll_timeout(Duration::from_millis(100)) {
                if reading % 25 == 0 {
                    println!("sensor {} reading {}", sensor, reading);
                }
                received += 1;
            }
            received
        })
    };

    for handle in producers {
        let _ = handle.join();
    }
    let received = consumer.join().unwrap_or(0);
    println!(
        "consumer received {} of 300 readings; the rest were evicted",
        received
    );
}
