use crate::memory::{size_of_slice, MemoryRange};
use pregel_api::VID;
use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};

/// One "voted to halt" flag per node, packed into words.
#[derive(Debug)]
pub(crate) struct VoteBits {
    words: Vec<AtomicU64>,
    len: usize,
}

impl VoteBits {
    pub(crate) fn new(len: usize) -> Self {
        let words = (0..len.div_ceil(64))
            .into_par_iter()
            .map(|_| AtomicU64::new(0))
            .collect();
        Self { words, len }
    }

    #[inline]
    fn word_and_mask(node: VID) -> (usize, u64) {
        (node.index() / 64, 1u64 << (node.index() % 64))
    }

    pub(crate) fn set(&self, node: VID) {
        let (word, mask) = Self::word_and_mask(node);
        self.words[word].fetch_or(mask, Ordering::Relaxed);
    }

    pub(crate) fn clear(&self, node: VID) {
        let (word, mask) = Self::word_and_mask(node);
        self.words[word].fetch_and(!mask, Ordering::Relaxed);
    }

    pub(crate) fn get(&self, node: VID) -> bool {
        let (word, mask) = Self::word_and_mask(node);
        self.words[word].load(Ordering::Relaxed) & mask != 0
    }

    pub(crate) fn all_set(&self) -> bool {
        let full_words = self.len / 64;
        let rest = self.len % 64;
        let full = self.words[..full_words]
            .par_iter()
            .all(|w| w.load(Ordering::Relaxed) == u64::MAX);
        full && (rest == 0 || {
            let mask = (1u64 << rest) - 1;
            self.words[full_words].load(Ordering::Relaxed) & mask == mask
        })
    }

    pub(crate) fn memory_estimation(node_count: usize) -> MemoryRange {
        MemoryRange::of(size_of_slice::<AtomicU64>(node_count.div_ceil(64)))
    }
}

#[cfg(test)]
mod vote_bits_tests {
    use super::*;

    #[test]
    fn set_clear_get() {
        let bits = VoteBits::new(130);
        assert!(!bits.get(VID(129)));
        bits.set(VID(129));
        bits.set(VID(0));
        assert!(bits.get(VID(129)));
        assert!(bits.get(VID(0)));
        assert!(!bits.get(VID(64)));
        bits.clear(VID(129));
        assert!(!bits.get(VID(129)));
        assert!(bits.get(VID(0)));
    }

    #[quickcheck]
    fn all_set_only_when_every_node_voted(len: u16, missing: u16) -> bool {
        let len = len as usize % 300 + 1;
        let bits = VoteBits::new(len);
        (0..len).for_each(|n| bits.set(VID(n)));
        let complete = bits.all_set();
        bits.clear(VID(missing as usize % len));
        complete && !bits.all_set()
    }

    #[test]
    fn empty_is_all_set() {
        assert!(VoteBits::new(0).all_set());
    }
}
