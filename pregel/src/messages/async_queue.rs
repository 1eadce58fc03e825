use super::queue::{DoubleQueues, MIN_CAPACITY};
use crate::memory::{size_of_slice, MemoryRange};
use pregel_api::VID;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A single queue set read while it is written.
///
/// Messages are visible as soon as they are pushed, possibly within the same
/// superstep. Each node's queue is consumed by its owning worker only,
/// tracked by a per-node head.
#[derive(Debug)]
pub struct AsyncQueueMessenger {
    queues: DoubleQueues,
    heads: Vec<AtomicUsize>,
}

impl AsyncQueueMessenger {
    pub fn new(node_count: usize) -> Self {
        Self {
            queues: DoubleQueues::new(node_count, MIN_CAPACITY),
            heads: (0..node_count)
                .into_par_iter()
                .map(|_| AtomicUsize::new(0))
                .collect(),
        }
    }

    /// Reclaim consumed slots before the next superstep.
    pub fn init_iteration(&mut self) {
        self.queues.compact(&mut self.heads);
    }

    pub fn send_to(&self, target: VID, message: f64) {
        self.queues.push(target, message);
    }

    /// Take the next message of `node`.
    ///
    /// Returns `None` once the head reaches a slot whose producer has not finished writing.
    pub fn pop(&self, node: VID) -> Option<f64> {
        let head = &self.heads[node.index()];
        let index = head.load(Ordering::Relaxed);
        let queue = self.queues.queue(node);
        if index >= queue.tail() {
            return None;
        }
        let value = queue.get(index);
        if value.is_nan() {
            return None;
        }
        head.store(index + 1, Ordering::Relaxed);
        Some(value)
    }

    pub fn is_empty(&self, node: VID) -> bool {
        let index = self.heads[node.index()].load(Ordering::Relaxed);
        index >= self.queues.tail(node) || self.queues.get(node, index).is_nan()
    }

    pub fn head(&self, node: VID) -> usize {
        self.heads[node.index()].load(Ordering::Relaxed)
    }

    pub fn tail(&self, node: VID) -> usize {
        self.queues.tail(node)
    }

    pub fn memory_estimation(node_count: usize) -> MemoryRange {
        DoubleQueues::memory_estimation(node_count, MIN_CAPACITY)
            .add(MemoryRange::of(size_of_slice::<AtomicUsize>(node_count)))
    }
}

#[cfg(test)]
mod async_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn messages_are_visible_immediately() {
        let messenger = AsyncQueueMessenger::new(2);
        messenger.send_to(VID(0), 1.0);
        assert!(!messenger.is_empty(VID(0)));
        assert_eq!(messenger.pop(VID(0)), Some(1.0));
        assert_eq!(messenger.pop(VID(0)), None);
        assert!(messenger.is_empty(VID(0)));
    }

    #[test]
    fn compaction_keeps_unread_messages_in_order() {
        let mut messenger = AsyncQueueMessenger::new(1);
        for v in [1.0, 2.0, 3.0] {
            messenger.send_to(VID(0), v);
        }
        assert_eq!(messenger.pop(VID(0)), Some(1.0));
        messenger.init_iteration();

        assert_eq!(messenger.pop(VID(0)), Some(2.0));
        assert_eq!(messenger.pop(VID(0)), Some(3.0));
        assert_eq!(messenger.pop(VID(0)), None);
    }

    #[test]
    fn drained_queue_restarts_at_zero() {
        let mut messenger = AsyncQueueMessenger::new(1);
        messenger.send_to(VID(0), 1.0);
        messenger.pop(VID(0));
        messenger.init_iteration();
        assert_eq!(messenger.head(VID(0)), 0);
        assert_eq!(messenger.tail(VID(0)), 0);

        messenger.send_to(VID(0), 5.0);
        assert_eq!(messenger.pop(VID(0)), Some(5.0));
    }
}
