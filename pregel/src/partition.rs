//! Splitting the node-id space into contiguous units of work.

use pregel_api::{compute::par_cum_sum, graph::Graph, VID};
use rayon::prelude::*;
use std::ops::Range;

/// Static partitions never get smaller than this, unless the graph is.
pub const DEFAULT_MIN_BATCH_SIZE: usize = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Partition {
    start: usize,
    node_count: usize,
}

impl Partition {
    pub fn new(start: usize, node_count: usize) -> Self {
        Self { start, node_count }
    }

    pub fn start_node(&self) -> VID {
        VID(self.start)
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.node_count
    }

    pub fn nodes(&self) -> impl Iterator<Item = VID> {
        self.range().map(VID)
    }

    /// Halve the partition, the first half taking the smaller share.
    pub fn split(&self) -> (Partition, Partition) {
        let left = self.node_count / 2;
        (
            Partition::new(self.start, left),
            Partition::new(self.start + left, self.node_count - left),
        )
    }
}

/// Equal-sized ranges of at least `min_batch_size` nodes, at most `concurrency` of them
/// unless the batch size floor forces more.
pub fn range_partitions(
    concurrency: usize,
    node_count: usize,
    min_batch_size: usize,
) -> Vec<Partition> {
    let batch_size = node_count
        .div_ceil(concurrency.max(1))
        .max(min_batch_size)
        .max(1);
    (0..node_count)
        .step_by(batch_size)
        .map(|start| Partition::new(start, batch_size.min(node_count - start)))
        .collect()
}

/// Ranges holding about `relationship_count / concurrency` relationships each.
pub fn degree_partitions<G: Graph>(graph: &G, concurrency: usize) -> Vec<Partition> {
    let node_count = graph.node_count();
    if node_count == 0 {
        return vec![];
    }
    let mut degrees: Vec<usize> = (0..node_count)
        .into_par_iter()
        .map(|node| graph.degree(VID(node)))
        .collect();
    par_cum_sum(&mut degrees);

    let total = degrees[node_count - 1];
    let batch_size = total.div_ceil(concurrency.max(1)).max(1);

    let mut partitions = vec![];
    let mut start = 0;
    while start < node_count {
        let base = if start == 0 { 0 } else { degrees[start - 1] };
        let last = degrees[start..].partition_point(|&d| d - base < batch_size);
        let end = (start + last + 1).min(node_count);
        partitions.push(Partition::new(start, end - start));
        start = end;
    }
    partitions
}
