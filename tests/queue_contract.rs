// ==============================================
// MRI QUEUE CONTRACT TESTS (integration)
// ==============================================
//
// One behavioral suite run against every variant through the shared traits.
// The sequential queue goes through `Queue`, the shared variants through
// `ConcurrentQueue`.

mod common;

use mriqueue::builder::QueueBuilder;
use mriqueue::queue::mri::MriQueue;
use mriqueue::traits::Queue;

const SIZE: usize = 20;

// ==============================================
// Sequential queue through `Queue`
// ==============================================

mod sequential {
    use super::*;

    fn populated(n: usize) -> MriQueue<usize> {
        let mut queue = MriQueue::new(n);
        for i in 0..n {
            assert!(Queue::offer(&mut queue, i));
        }
        assert_eq!(Queue::len(&queue), n);
        queue
    }

    #[test]
    fn offer_beyond_capacity_keeps_size() {
        common::init_test_logger();
        let mut queue = populated(SIZE);
        for i in SIZE..SIZE * 2 {
            assert!(Queue::offer(&mut queue, i));
            assert_eq!(Queue::len(&queue), SIZE);
            assert_eq!(Queue::remaining_capacity(&queue), 0);
        }
        assert_eq!(Queue::peek(&queue), Some(&SIZE));
    }

    #[test]
    fn poll_drains_in_insertion_order() {
        let mut queue = populated(SIZE);
        for i in 0..SIZE {
            assert_eq!(Queue::poll(&mut queue), Some(i));
        }
        assert_eq!(Queue::poll(&mut queue), None);
        assert!(Queue::is_empty(&queue));
    }

    #[test]
    fn remove_every_other_element() {
        let mut queue = populated(SIZE);
        for i in (1..SIZE).step_by(2) {
            assert!(Queue::remove(&mut queue, &i));
        }
        for i in (0..SIZE).step_by(2) {
            assert!(Queue::remove(&mut queue, &i));
            assert!(!Queue::remove(&mut queue, &(i + 1)));
        }
        assert!(Queue::is_empty(&queue));
        queue.debug_validate_invariants();
    }

    #[test]
    fn clear_then_reuse() {
        let mut queue = populated(SIZE);
        Queue::clear(&mut queue);
        assert!(Queue::is_empty(&queue));
        assert_eq!(Queue::remaining_capacity(&queue), SIZE);
        Queue::offer(&mut queue, 1);
        assert_eq!(Queue::peek(&queue), Some(&1));
    }

    #[test]
    fn builder_constructs_sequential_queue() {
        let mut queue = QueueBuilder::new(3).build_sequential();
        queue.extend(0..5);
        assert_eq!(queue.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
    }
}

// ==============================================
// Shared variants through `ConcurrentQueue`
// ==============================================

#[cfg(feature = "concurrency")]
mod shared {
    use mriqueue::builder::QueueKind;
    use mriqueue::queue::blocking::BlockingMriQueue;
    use mriqueue::queue::locked::LockedMriQueue;
    use mriqueue::traits::ConcurrentQueue;

    use super::*;

    fn variants(capacity: usize) -> Vec<(&'static str, Box<dyn ConcurrentQueue<usize>>)> {
        vec![
            ("locked", Box::new(LockedMriQueue::new(capacity))),
            ("blocking", Box::new(BlockingMriQueue::new(capacity))),
            (
                "any-locked",
                Box::new(QueueBuilder::new(capacity).build::<usize>(QueueKind::Locked)),
            ),
            (
                "any-blocking",
                Box::new(QueueBuilder::new(capacity).build::<usize>(QueueKind::Blocking)),
            ),
        ]
    }

    fn fill(queue: &dyn ConcurrentQueue<usize>, n: usize) {
        for i in 0..n {
            assert!(queue.offer(i));
        }
    }

    #[test]
    fn new_queue_is_empty() {
        common::init_test_logger();
        for (name, queue) in variants(SIZE) {
            assert!(queue.is_empty(), "{name}");
            assert_eq!(queue.len(), 0, "{name}");
            assert_eq!(queue.remaining_capacity(), SIZE, "{name}");
            assert_eq!(queue.poll(), None, "{name}");
            assert_eq!(queue.peek(), None, "{name}");
        }
    }

    #[test]
    fn remaining_capacity_counts_down_then_stays_zero() {
        for (name, queue) in variants(SIZE) {
            for i in 0..SIZE {
                assert_eq!(queue.remaining_capacity(), SIZE - i, "{name}");
                queue.offer(i);
            }
            for i in 0..SIZE {
                queue.offer(SIZE + i);
                assert_eq!(queue.remaining_capacity(), 0, "{name}");
                assert_eq!(queue.len(), SIZE, "{name}");
            }
        }
    }

    #[test]
    fn overflow_evicts_oldest() {
        for (name, queue) in variants(SIZE) {
            fill(queue.as_ref(), SIZE * 2);
            for i in SIZE..SIZE * 2 {
                assert_eq!(queue.peek(), Some(i), "{name}");
                assert_eq!(queue.poll(), Some(i), "{name}");
            }
            assert_eq!(queue.poll(), None, "{name}");
        }
    }

    #[test]
    fn capacity_two_scenario() {
        for (name, queue) in variants(2) {
            queue.offer(10);
            assert_eq!((queue.len(), queue.peek()), (1, Some(10)), "{name}");
            queue.offer(11);
            assert_eq!((queue.len(), queue.peek()), (2, Some(10)), "{name}");
            queue.offer(12);
            assert_eq!((queue.len(), queue.peek()), (2, Some(11)), "{name}");
            assert_eq!(queue.poll(), Some(11), "{name}");
            assert_eq!((queue.len(), queue.peek()), (1, Some(12)), "{name}");
            queue.clear();
            assert_eq!(queue.len(), 0, "{name}");
            assert_eq!(queue.peek(), None, "{name}");
            assert_eq!(queue.poll(), None, "{name}");
        }
    }

    #[test]
    fn targeted_remove() {
        for (name, queue) in variants(SIZE) {
            fill(queue.as_ref(), SIZE);
            for i in (1..SIZE).step_by(2) {
                assert!(queue.remove(&i), "{name}");
            }
            for i in (0..SIZE).step_by(2) {
                assert!(queue.remove(&i), "{name}");
                assert!(!queue.remove(&(i + 1)), "{name}");
            }
            assert!(queue.is_empty(), "{name}");
            // a queue emptied by removal accepts new elements
            queue.offer(99);
            assert_eq!(queue.peek(), Some(99), "{name}");
        }
    }

    #[test]
    fn remove_then_offer_preserves_order() {
        for (name, queue) in variants(4) {
            fill(queue.as_ref(), 4);
            assert!(queue.remove(&3), "{name}");
            queue.offer(4);
            queue.offer(5);
            let mut drained = Vec::new();
            while let Some(v) = queue.poll() {
                drained.push(v);
            }
            assert_eq!(drained, vec![1, 2, 4, 5], "{name}");
        }
    }

    #[test]
    fn clear_resets_capacity() {
        for (name, queue) in variants(SIZE) {
            fill(queue.as_ref(), SIZE);
            queue.clear();
            assert!(queue.is_empty(), "{name}");
            assert_eq!(queue.remaining_capacity(), SIZE, "{name}");
            queue.offer(1);
            assert_eq!(queue.peek(), Some(1), "{name}");
        }
    }

    #[test]
    fn iterators_agree_on_contents() {
        let locked = LockedMriQueue::new(5);
        let blocking = BlockingMriQueue::new(5);
        for i in 0..8 {
            locked.offer(i);
            blocking.offer(i);
        }
        let expected = vec![3, 4, 5, 6, 7];
        assert_eq!(locked.iter().collect::<Vec<_>>(), expected);
        assert_eq!(blocking.iter().collect::<Vec<_>>(), expected);
        assert_eq!(locked.to_vec(), expected);
        assert_eq!(blocking.to_vec(), expected);
    }

    #[test]
    fn iterator_remove_all() {
        let locked = LockedMriQueue::new(SIZE);
        let blocking = BlockingMriQueue::new(SIZE);
        for i in 0..SIZE {
            locked.offer(i);
            blocking.offer(i);
        }

        let mut iter = locked.iter();
        while iter.next().is_some() {
            assert_eq!(iter.remove(), Ok(true));
        }
        let mut iter = blocking.iter();
        while iter.next().is_some() {
            assert_eq!(iter.remove(), Ok(true));
        }

        assert!(locked.is_empty());
        assert!(blocking.is_empty());
        locked.debug_validate_invariants();
        blocking.debug_validate_invariants();
    }
}
