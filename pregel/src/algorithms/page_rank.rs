use crate::{
    compute::{
        context::{ComputeContext, InitContext},
        Outgoing, PregelComputation,
    },
    config::PregelConfig,
    errors::PregelError,
    messages::{Messages, Reducer},
    pregel::{Pregel, PregelResult},
    schema::{PregelSchema, ValueType},
};
use pregel_api::graph::Graph;
use rayon::ThreadPool;
use std::sync::Arc;

pub const PAGE_RANK: &str = "pagerank";

/// Delta-based PageRank.
///
/// Every node starts with rank `1 - damping_factor` and forwards the change of
/// its rank to its neighbours. A node stops forwarding, and votes to halt,
/// once its change drops to `tolerance` or below. Ranks are not normalised,
/// they sum to roughly the node count.
#[derive(Debug, Clone, Copy)]
pub struct PageRank {
    pub damping_factor: f64,
    pub tolerance: f64,
}

impl Default for PageRank {
    fn default() -> Self {
        Self {
            damping_factor: 0.85,
            tolerance: 1e-7,
        }
    }
}

impl<G: Graph> PregelComputation<G> for PageRank {
    type Direction = Outgoing;

    fn schema(&self, _config: &PregelConfig) -> PregelSchema {
        PregelSchema::builder()
            .add(PAGE_RANK, ValueType::Double)
            .build()
    }

    fn init(&self, context: &mut InitContext<'_, G, Outgoing>) {
        context.set_node_value(PAGE_RANK, 1.0 - self.damping_factor);
    }

    fn compute(&self, context: &mut ComputeContext<'_, G, Outgoing>, messages: &mut Messages<'_>) {
        let rank = context.double_node_value(PAGE_RANK);
        let delta = if context.is_initial_superstep() {
            rank
        } else {
            let delta = self.damping_factor * messages.sum::<f64>();
            context.set_node_value(PAGE_RANK, rank + delta);
            delta
        };

        if context.is_initial_superstep() || delta > self.tolerance {
            let degree = context.degree();
            if degree > 0 {
                context.send_to_neighbours(delta / degree as f64);
            }
        } else {
            context.vote_to_halt();
        }
    }

    fn reducer(&self) -> Option<Reducer> {
        Some(Reducer::Sum)
    }
}

/// PageRank of every node, stored under [`PAGE_RANK`].
///
/// # Arguments
///
/// * `graph` - the graph to rank
/// * `config` - run configuration, `max_iterations` bounds the number of propagation rounds
/// * `damping_factor` - share of a node's rank passed on to its neighbours
/// * `tolerance` - a node stops propagating once its rank changes by no more than this
pub fn page_rank<G: Graph>(
    graph: &G,
    config: &PregelConfig,
    pool: Arc<ThreadPool>,
    damping_factor: f64,
    tolerance: f64,
) -> Result<PregelResult, PregelError> {
    let computation = PageRank {
        damping_factor,
        tolerance,
    };
    Pregel::new(graph.concurrent_copy(), config.clone(), computation, pool)?.run()
}

#[cfg(test)]
mod page_rank_tests {
    use super::*;
    use crate::custom_pool;
    use pregel_api::graph::CsrGraph;

    #[test]
    fn cycle_converges_to_one() {
        let graph = CsrGraph::from_edges([(1, 2), (2, 3), (3, 1)]);
        let config = PregelConfig::builder()
            .max_iterations(200)
            .concurrency(2)
            .build();
        let result = page_rank(&graph, &config, custom_pool(2).unwrap(), 0.85, 1e-7).unwrap();

        assert!(result.did_converge());
        for rank in result.node_values().double_properties(PAGE_RANK) {
            assert!((rank - 1.0).abs() < 1e-5, "rank {rank}");
        }
    }

    #[test]
    fn hub_ranks_highest() {
        let graph = CsrGraph::from_edges([(1, 0), (2, 0), (3, 0), (0, 1)]);
        let config = PregelConfig::builder().max_iterations(100).build();
        let result = page_rank(&graph, &config, custom_pool(2).unwrap(), 0.85, 1e-7).unwrap();

        let ranks = result.node_values().double_properties(PAGE_RANK);
        let hub = graph.to_internal_id(0).unwrap().index();
        let leaf = graph.to_internal_id(2).unwrap().index();
        assert!(ranks[hub] > ranks[leaf]);
        assert!((ranks[leaf] - 0.15).abs() < 1e-12);
    }
}
