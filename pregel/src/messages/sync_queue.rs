use super::queue::{DoubleQueues, QueueIter, MIN_CAPACITY};
use crate::memory::MemoryRange;
use pregel_api::VID;
use std::mem;

/// Double-buffered queues: messages sent in superstep `n` are read in superstep `n + 1`.
#[derive(Debug)]
pub struct SyncQueueMessenger {
    current: DoubleQueues,
    previous: DoubleQueues,
}

impl SyncQueueMessenger {
    pub fn new(node_count: usize) -> Self {
        Self {
            current: DoubleQueues::new(node_count, MIN_CAPACITY),
            previous: DoubleQueues::new(node_count, MIN_CAPACITY),
        }
    }

    pub fn init_iteration(&mut self) {
        mem::swap(&mut self.current, &mut self.previous);
        self.current.reset();
    }

    pub fn send_to(&self, target: VID, message: f64) {
        self.current.push(target, message);
    }

    pub fn messages(&self, node: VID) -> QueueIter<'_> {
        self.previous.iter(node)
    }

    pub fn memory_estimation(node_count: usize) -> MemoryRange {
        DoubleQueues::memory_estimation(node_count, MIN_CAPACITY).times(2)
    }
}

#[cfg(test)]
mod sync_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn messages_are_visible_one_superstep_later_only() {
        let mut messenger = SyncQueueMessenger::new(2);
        messenger.init_iteration();
        messenger.send_to(VID(1), 1.0);
        messenger.send_to(VID(1), 2.0);
        assert!(messenger.messages(VID(1)).is_empty());

        messenger.init_iteration();
        assert_eq!(messenger.messages(VID(1)).collect::<Vec<_>>(), vec![1.0, 2.0]);
        // reading does not consume
        assert_eq!(messenger.messages(VID(1)).count(), 2);
        messenger.send_to(VID(0), 3.0);

        messenger.init_iteration();
        assert!(messenger.messages(VID(1)).is_empty());
        assert_eq!(messenger.messages(VID(0)).collect::<Vec<_>>(), vec![3.0]);

        messenger.init_iteration();
        assert!(messenger.messages(VID(0)).is_empty());
    }
}
