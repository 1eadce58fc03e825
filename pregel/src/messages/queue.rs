//! A growable, multi-producer queue of `f64` messages per node.
//!
//! Producers reserve a slot by advancing the node's tail with a CAS. The
//! producer whose reservation overflows the buffer swaps the tail for its
//! negated successor, which blocks further reservations on that node while it
//! reallocates. Writers hold the buffer lock in shared mode for the duration
//! of their store, the grower takes it exclusively, so no store can land in a
//! buffer that is being replaced. Unwritten slots hold [`EMPTY`].

use crate::memory::{size_of_slice, MemoryRange};
use parking_lot::{RwLock, RwLockReadGuard};
use pregel_api::{atomic_extra::AtomicF64, VID};
use rayon::prelude::*;
use std::{
    mem::size_of,
    sync::atomic::{AtomicI64, AtomicUsize, Ordering},
};
use tracing::trace;

/// Initial capacity of every node's buffer.
pub const MIN_CAPACITY: usize = 42;

/// Marks a slot that holds no message.
pub const EMPTY: f64 = f64::NAN;

const SPINS_BEFORE_YIELD: u32 = 64;

#[inline]
fn backoff(attempt: &mut u32) {
    if *attempt < SPINS_BEFORE_YIELD {
        std::hint::spin_loop();
    } else {
        std::thread::yield_now();
    }
    *attempt += 1;
}

fn empty_buffer(capacity: usize) -> Box<[AtomicF64]> {
    (0..capacity).map(|_| AtomicF64::new(EMPTY)).collect()
}

#[derive(Debug)]
pub(crate) struct NodeQueue {
    // next free slot, or `-(slot + 1)` while the buffer is being grown for `slot`
    tail: AtomicI64,
    capacity: AtomicUsize,
    buffer: RwLock<Box<[AtomicF64]>>,
}

impl NodeQueue {
    fn new(capacity: usize) -> Self {
        Self {
            tail: AtomicI64::new(0),
            capacity: AtomicUsize::new(capacity),
            buffer: RwLock::new(empty_buffer(capacity)),
        }
    }

    fn push(&self, value: f64) {
        let mut attempt = 0;
        loop {
            let tail = self.tail.load(Ordering::Acquire);
            if tail < 0 {
                backoff(&mut attempt);
                continue;
            }
            let index = tail as usize;
            if index < self.capacity.load(Ordering::Acquire) {
                if self
                    .tail
                    .compare_exchange_weak(tail, tail + 1, Ordering::AcqRel, Ordering::Relaxed)
                    .is_ok()
                {
                    self.write(index, value);
                    return;
                }
            } else if self
                .tail
                .compare_exchange(tail, -(tail + 1), Ordering::AcqRel, Ordering::Relaxed)
                .is_ok()
            {
                self.grow(index, value);
                return;
            }
        }
    }

    fn write(&self, index: usize, value: f64) {
        let buffer = self.buffer.read();
        buffer[index].store(value, Ordering::Release);
    }

    fn grow(&self, index: usize, value: f64) {
        // waits for every writer still storing into the old buffer
        let mut buffer = self.buffer.write();
        let old_capacity = buffer.len();
        let new_capacity = (old_capacity + (old_capacity >> 1)).max(index + 1);

        let mut grown = Vec::with_capacity(new_capacity);
        grown.extend(
            buffer
                .iter()
                .map(|slot| AtomicF64::new(slot.load(Ordering::Relaxed))),
        );
        grown.resize_with(new_capacity, || AtomicF64::new(EMPTY));
        grown[index].store(value, Ordering::Relaxed);
        *buffer = grown.into_boxed_slice();

        self.capacity.store(new_capacity, Ordering::Release);
        drop(buffer);
        self.tail.store(index as i64 + 1, Ordering::Release);
        trace!(old_capacity, new_capacity, "Grew message queue");
    }

    /// Number of reserved slots. Some of them may not be written yet while producers are active.
    pub(crate) fn tail(&self) -> usize {
        let tail = self.tail.load(Ordering::Acquire);
        if tail < 0 {
            (-tail - 1) as usize
        } else {
            tail as usize
        }
    }

    pub(crate) fn get(&self, index: usize) -> f64 {
        self.buffer.read()[index].load(Ordering::Acquire)
    }

    fn reset(&mut self) {
        *self.tail.get_mut() = 0;
    }

    /// Drop the first `head` slots, returning the new head.
    ///
    /// Only shifts when the queue is drained or more than a quarter of the buffer is consumed.
    pub(crate) fn compact(&mut self, head: usize) -> usize {
        if head == 0 {
            return 0;
        }
        let tail = self.tail();
        let buffer = self.buffer.get_mut();
        if head >= tail {
            buffer[..tail]
                .iter()
                .for_each(|slot| slot.store(EMPTY, Ordering::Relaxed));
            *self.tail.get_mut() = 0;
            0
        } else if head > buffer.len() / 4 {
            let unread = tail - head;
            for i in 0..unread {
                let value = buffer[head + i].load(Ordering::Relaxed);
                buffer[i].store(value, Ordering::Relaxed);
            }
            buffer[unread..tail]
                .iter()
                .for_each(|slot| slot.store(EMPTY, Ordering::Relaxed));
            *self.tail.get_mut() = unread as i64;
            0
        } else {
            head
        }
    }
}

/// Sequential view over the reserved range of one node's buffer.
pub struct QueueIter<'a> {
    buffer: RwLockReadGuard<'a, Box<[AtomicF64]>>,
    position: usize,
    end: usize,
}

impl QueueIter<'_> {
    pub fn is_empty(&self) -> bool {
        self.position >= self.end
    }
}

impl Iterator for QueueIter<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position < self.end {
            let value = self.buffer[self.position].load(Ordering::Acquire);
            self.position += 1;
            Some(value)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end.saturating_sub(self.position);
        (remaining, Some(remaining))
    }
}

/// One growable message queue per node.
///
/// # Examples
///
/// ```
/// use pregel::messages::queue::DoubleQueues;
/// use pregel_api::VID;
///
/// let queues = DoubleQueues::new(2, 1);
/// queues.push(VID(1), 1.0);
/// queues.push(VID(1), 2.0);
/// assert_eq!(queues.iter(VID(1)).collect::<Vec<_>>(), vec![1.0, 2.0]);
/// assert_eq!(queues.tail(VID(0)), 0);
/// ```
#[derive(Debug)]
pub struct DoubleQueues {
    queues: Box<[NodeQueue]>,
}

impl DoubleQueues {
    pub fn new(node_count: usize, initial_capacity: usize) -> Self {
        let queues = (0..node_count)
            .into_par_iter()
            .map(|_| NodeQueue::new(initial_capacity))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self { queues }
    }

    pub fn node_count(&self) -> usize {
        self.queues.len()
    }

    /// Append `value` to the queue of `node`. Safe to call from any number of threads.
    pub fn push(&self, node: VID, value: f64) {
        self.queues[node.index()].push(value)
    }

    pub fn tail(&self, node: VID) -> usize {
        self.queues[node.index()].tail()
    }

    pub fn capacity(&self, node: VID) -> usize {
        self.queues[node.index()].capacity.load(Ordering::Acquire)
    }

    pub fn get(&self, node: VID, index: usize) -> f64 {
        self.queues[node.index()].get(index)
    }

    /// Iterate the slots `0..tail` of `node`.
    pub fn iter(&self, node: VID) -> QueueIter<'_> {
        self.iter_from(node, 0)
    }

    pub(crate) fn iter_from(&self, node: VID, start: usize) -> QueueIter<'_> {
        let queue = &self.queues[node.index()];
        let end = queue.tail();
        QueueIter {
            buffer: queue.buffer.read(),
            position: start,
            end,
        }
    }

    pub(crate) fn queue(&self, node: VID) -> &NodeQueue {
        &self.queues[node.index()]
    }

    /// Empty every queue without releasing its buffer.
    pub fn reset(&mut self) {
        self.queues.par_iter_mut().for_each(NodeQueue::reset);
    }

    pub(crate) fn compact(&mut self, heads: &mut [AtomicUsize]) {
        self.queues
            .par_iter_mut()
            .zip(heads.par_iter_mut())
            .for_each(|(queue, head)| {
                let new_head = queue.compact(*head.get_mut());
                *head.get_mut() = new_head;
            });
    }

    pub fn memory_estimation(node_count: usize, capacity: usize) -> MemoryRange {
        let per_node = size_of::<NodeQueue>() + size_of_slice::<AtomicF64>(capacity);
        MemoryRange::of(size_of::<Box<[NodeQueue]>>() + node_count * per_node)
    }
}

#[cfg(test)]
mod queue_tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn grows_past_initial_capacity() {
        let queues = DoubleQueues::new(1, 2);
        for i in 0..10 {
            queues.push(VID(0), i as f64);
        }
        assert_eq!(queues.tail(VID(0)), 10);
        assert!(queues.capacity(VID(0)) >= 10);
        assert_eq!(
            queues.iter(VID(0)).collect::<Vec<_>>(),
            (0..10).map(|i| i as f64).collect::<Vec<_>>()
        );
        // slots past the tail stay empty
        let capacity = queues.capacity(VID(0));
        assert!((10..capacity).all(|i| queues.get(VID(0), i).is_nan()));
    }

    #[test]
    fn zero_capacity_grows() {
        let queues = DoubleQueues::new(1, 0);
        queues.push(VID(0), 3.0);
        assert_eq!(queues.iter(VID(0)).collect::<Vec<_>>(), vec![3.0]);
    }

    #[test]
    fn reset_empties_all_queues() {
        let mut queues = DoubleQueues::new(3, 4);
        queues.push(VID(0), 1.0);
        queues.push(VID(2), 1.0);
        queues.reset();
        assert!((0..3).all(|n| queues.iter(VID(n)).is_empty()));
    }

    #[test]
    fn concurrent_pushes_keep_every_message() {
        let queues = Arc::new(DoubleQueues::new(2, MIN_CAPACITY));
        let threads: Vec<_> = (0..4)
            .map(|t| {
                let queues = queues.clone();
                std::thread::spawn(move || {
                    for i in 0..5_000 {
                        queues.push(VID(1), (t * 5_000 + i) as f64);
                    }
                })
            })
            .collect();
        for thread in threads {
            thread.join().unwrap();
        }
        let mut values: Vec<_> = queues.iter(VID(1)).map(|v| v as usize).collect();
        values.sort_unstable();
        assert_eq!(values, (0..20_000).collect::<Vec<_>>());
    }

    #[test]
    fn compaction_of_drained_queue_resets() {
        let mut queues = DoubleQueues::new(1, 8);
        (0..3).for_each(|i| queues.push(VID(0), i as f64));
        let mut heads = vec![AtomicUsize::new(3)];
        queues.compact(&mut heads);
        assert_eq!(heads[0].load(Ordering::Relaxed), 0);
        assert_eq!(queues.tail(VID(0)), 0);
        assert!(queues.get(VID(0), 0).is_nan());
    }

    #[test]
    fn compaction_shifts_unread_slots() {
        let mut queues = DoubleQueues::new(1, 8);
        (0..6).for_each(|i| queues.push(VID(0), i as f64));

        // a quarter of the buffer is consumed, not more: nothing moves
        let mut heads = vec![AtomicUsize::new(2)];
        queues.compact(&mut heads);
        assert_eq!(heads[0].load(Ordering::Relaxed), 2);
        assert_eq!(queues.tail(VID(0)), 6);

        heads[0].store(3, Ordering::Relaxed);
        queues.compact(&mut heads);
        assert_eq!(heads[0].load(Ordering::Relaxed), 0);
        assert_eq!(queues.iter(VID(0)).collect::<Vec<_>>(), vec![3.0, 4.0, 5.0]);
        assert!((3..8).all(|i| queues.get(VID(0), i).is_nan()));
    }
}
