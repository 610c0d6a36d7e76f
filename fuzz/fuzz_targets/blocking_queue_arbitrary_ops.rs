#![no_main]

use libfuzzer_sys::fuzz_target;
use mriqueue::queue::blocking::BlockingMriQueue;
use mriqueue::queue::mri::MriQueue;

// Fuzz arbitrary operation sequences on BlockingMriQueue
//
// Single-threaded; every observation is compared against MriQueue. Covers
// iterator removal and iteration across dequeues, which exercise the
// retired-link resynchronization path.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let capacity = usize::from(data[0] % 16) + 1;
    let queue: BlockingMriQueue<u8> = BlockingMriQueue::new(capacity);
    let mut oracle: MriQueue<u8> = MriQueue::new(capacity);

    let mut idx = 1;
    while idx + 1 < data.len() {
        let op = data[idx] % 7;
        let value = data[idx + 1];

        match op {
            0 => {
                queue.offer(value);
                oracle.offer(value);
            },
            1 => assert_eq!(queue.poll(), oracle.poll()),
            2 => assert_eq!(queue.peek(), oracle.peek().copied()),
            3 => assert_eq!(queue.remove(&value), oracle.remove(&value)),
            4 => {
                // iterate while polling; every yielded element must exist in
                // the snapshot taken before iteration began
                let before = queue.to_vec();
                let mut iter = queue.iter();
                let polls = usize::from(value % 4);
                while let Some(item) = iter.next() {
                    assert!(before.contains(&item));
                    for _ in 0..polls {
                        assert_eq!(queue.poll(), oracle.poll());
                    }
                }
            },
            5 => {
                let max = usize::from(value % 8);
                let (mut got, mut expected) = (Vec::new(), Vec::new());
                queue.drain_to(&mut got, max);
                oracle.drain_to(&mut expected, max);
                assert_eq!(got, expected);
            },
            6 => {
                queue.clear();
                oracle.clear();
            },
            _ => unreachable!(),
        }

        assert_eq!(queue.len(), oracle.len());
        queue.check_invariants().unwrap();

        idx += 2;
    }

    assert_eq!(queue.to_vec(), oracle.to_vec());
});
