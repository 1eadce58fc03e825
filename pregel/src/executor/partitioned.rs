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

/// Runs a fixed set of partitions as one task each per superstep.
pub(crate) struct PartitionedExecutor {
    pool: Arc<ThreadPool>,
    partitions: Vec<Partition>,
}

impl PartitionedExecutor {
    pub(crate) fn new(pool: Arc<ThreadPool>, partitions: Vec<Partition>) -> Self {
        Self { pool, partitions }
    }

    pub(crate) fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    pub(crate) fn run<G: Graph, C: PregelComputation<G>>(&self, superstep: &Superstep<'_, G, C>) {
        self.pool.scope(|scope| {
            for partition in &self.partitions {
                scope.spawn(move |_| ComputeStep::new(*partition, superstep).compute_batch());
            }
        });
    }
}
