//! Stopping a blocked consumer with a `CancelToken`.
//!
//! Run with: `RUST_LOG=debug cargo run --example cancellation`

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use mriqueue::error::Interrupted;
use mriqueue::queue::blocking::BlockingMriQueue;
use mriqueue::sync::CancelToken;

fn main() {
    // Initialize logging (optional)
    env_logger::init();

    let queue: Arc<BlockingMriQueue<String>> = Arc::new(BlockingMriQueue::new(16));
    let shutdown = CancelToken::new();

    let worker = {
        let queue = Arc::clone(&queue);
        let shutdown = shutdown.clone();
        thread::spawn(move || {
            let mut handled = 0;
            loop {
                match queue.take_cancellable(&shutdown) {
                    Ok(job) => {
                        println!("handling {}", job);
                        handled += 1;
                    },
                    Err(Interrupted) => {
                        println!("worker shutting down");
                        return handled;
                    },
                }
            }
        })
    };

    for i in 0..5 {
        queue.offer(format!("job-{}", i));
    }
    while !queue.is_empty() {
        thread::sleep(Duration::from_millis(5));
    }

    shutdown.cancel();
    let handled = worker.join().unwrap_or(0);
    println!("worker handled {} jobs", handled);
}
