//! Single-threaded MRI queue walkthrough.
//!
//! This example demonstrates how to:
//! - Create a bounded queue and watch it evict on overflow
//! - Remove elements while iterating with a cursor
//! - Drain the queue into a collection
//!
//! Run with: `RUST_LOG=trace cargo run --example basic_sequential`

use std::error::Error;

use mriqueue::queue::mri::MriQueue;

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging (optional)
    env_logger::init();

    let mut queue = MriQueue::try_new(3)?;
    for event in ["boot", "login", "open", "save", "close"] {
        if let Some(evicted) = queue.offer_evicting(event) {
            println!("evicted {:<6} to admit {}", evicted, event);
        }
    }
    println!("latest events: {:?}", queue.to_vec());

    let mut cursor = queue.cursor();
    while let Some(&event) = cursor.next() {
        if event == "save" {
            cursor.remove()?;
        }
    }
    println!("after removing saves: {:?}", queue.to_vec());

    let mut drained = Vec::new();
    queue.drain_to(&mut drained, usize::MAX);
    println!("drained {:?}, queue now holds {}", drained, queue.len());

    Ok(())
}
