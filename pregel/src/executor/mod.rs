//! Drives the compute steps of one superstep across the worker pool.

mod fork_join;
mod partitioned;

use crate::{
    compute::{step::Superstep, PregelComputation},
    config::{Partitioning, PregelConfig},
    custom_pool,
    errors::PregelError,
    partition::{degree_partitions, range_partitions, DEFAULT_MIN_BATCH_SIZE},
};
pub use fork_join::SEQUENTIAL_THRESHOLD;
use fork_join::ForkJoinExecutor;
use partitioned::PartitionedExecutor;
use pregel_api::graph::Graph;
use rayon::ThreadPool;
use std::{fmt, sync::Arc};

pub(crate) enum PregelExecutor {
    ForkJoin(ForkJoinExecutor),
    Partitioned(PartitionedExecutor),
}

impl PregelExecutor {
    /// Static partitions are computed here, once per run.
    ///
    /// Recursive splitting uses every thread of the pool it runs on, so it gets
    /// a pool of its own when the shared one is not `concurrency` wide.
    pub(crate) fn new<G: Graph>(
        graph: &G,
        config: &PregelConfig,
        pool: Arc<ThreadPool>,
    ) -> Result<Self, PregelError> {
        let node_count = graph.node_count();
        let executor = match config.partitioning {
            Partitioning::Auto => {
                let pool = if pool.current_num_threads() == config.concurrency {
                    pool
                } else {
                    custom_pool(config.concurrency)?
                };
                PregelExecutor::ForkJoin(ForkJoinExecutor::new(pool, node_count))
            }
            Partitioning::Range => {
                let partitions =
                    range_partitions(config.concurrency, node_count, DEFAULT_MIN_BATCH_SIZE);
                PregelExecutor::Partitioned(PartitionedExecutor::new(pool, partitions))
            }
            Partitioning::Degree => {
                let partitions = pool.install(|| degree_partitions(graph, config.concurrency));
                PregelExecutor::Partitioned(PartitionedExecutor::new(pool, partitions))
            }
        };
        Ok(executor)
    }

    /// Returns once every node of the superstep has been processed.
    pub(crate) fn run<G: Graph, C: PregelComputation<G>>(&self, superstep: &Superstep<'_, G, C>) {
        match self {
            PregelExecutor::ForkJoin(executor) => executor.run(superstep),
            PregelExecutor::Partitioned(executor) => executor.run(superstep),
        }
    }
}

impl fmt::Display for PregelExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PregelExecutor::ForkJoin(_) => f.write_str("fork-join"),
            PregelExecutor::Partitioned(executor) => {
                write!(f, "{} static partitions", executor.partition_count())
            }
        }
    }
}
