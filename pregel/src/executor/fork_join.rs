use crate::{
    compute::{
        step::{ComputeStep, Superstep},
        PregelComputation,
    },
    partition::Partition,
};
use pregel_api::graph::Graph;
use rayon::ThreadPool;
use std::sync::Arc;

/// Partitions with more nodes than this are split in two.
pub const SEQUENTIAL_THRESHOLD: usize = 1_000;

/// Recursively halves the node range, letting idle workers steal the halves.
pub(crate) struct ForkJoinExecutor {
    pool: Arc<ThreadPool>,
    node_count: usize,
}

impl ForkJoinExecutor {
    pub(crate) fn new(pool: Arc<ThreadPool>, node_count: usize) -> Self {
        Self { pool, node_count }
    }

    pub(crate) fn run<G: Graph, C: PregelComputation<G>>(&self, superstep: &Superstep<'_, G, C>) {
        let root = ComputeStep::new(Partition::new(0, self.node_count), superstep);
        self.pool.install(|| compute(root));
    }
}

fn compute<G: Graph, C: PregelComputation<G>>(step: ComputeStep<'_, '_, G, C>) {
    let partition = step.partition();
    if partition.node_count() > SEQUENTIAL_THRESHOLD {
        let (left, right) = partition.split();
        let left = step.with_partition(left);
        let right = step.with_partition(right);
        rayon::join(|| compute(left), || compute(right));
    } else {
        step.compute_batch();
    }
}
