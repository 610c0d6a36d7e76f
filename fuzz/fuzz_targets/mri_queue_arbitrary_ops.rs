#![no_main]

use std::collections::VecDeque;

use libfuzzer_sys::fuzz_target;
use mriqueue::queue::mri::MriQueue;

// Fuzz arbitrary operation sequences on MriQueue
//
// Drives offer, poll, peek, remove, cursor removal, drain, and clear against
// a VecDeque model that evicts from the front when full.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let capacity = usize::from(data[0] % 16) + 1;
    let mut queue: MriQueue<u8> = MriQueue::new(capacity);
    let mut model: VecDeque<u8> = VecDeque::new();

    let mut idx = 1;
    while idx + 1 < data.len() {
        let op = data[idx] % 7;
        let value = data[idx + 1];

        match op {
            0 => {
                // offer
                if model.len() == capacity {
                    model.pop_front();
                }
                model.push_back(value);
                assert!(queue.offer(value));
            },
            1 => {
                // poll
                assert_eq!(queue.poll(), model.pop_front());
            },
            2 => {
                // peek
                assert_eq!(queue.peek(), model.front());
            },
            3 => {
                // targeted remove
                let expected = match model.iter().position(|v| *v == value) {
                    Some(pos) => {
                        model.remove(pos);
                        true
                    },
                    None => false,
                };
                assert_eq!(queue.remove(&value), expected);
            },
            4 => {
                // cursor removal of the n-th element
                let n = usize::from(value);
                let mut cursor = queue.cursor();
                let mut i = 0;
                while cursor.next().is_some() {
                    if i == n {
                        let removed = cursor.remove().unwrap();
                        assert_eq!(model.remove(n), Some(removed));
                        break;
                    }
                    i += 1;
                }
            },
            5 => {
                // drain
                let max = usize::from(value % 8);
                let mut sink = Vec::new();
                let moved = queue.drain_to(&mut sink, max);
                let expected: Vec<u8> = model.drain(..max.min(model.len())).collect();
                assert_eq!(moved, expected.len());
                assert_eq!(sink, expected);
            },
            6 => {
                // clear
                queue.clear();
                model.clear();
            },
            _ => unreachable!(),
        }

        assert_eq!(queue.len(), model.len());
        assert!(queue.len() <= capacity);
        queue.check_invariants().unwrap();

        idx += 2;
    }

    assert!(queue.iter().eq(model.iter()));
});
