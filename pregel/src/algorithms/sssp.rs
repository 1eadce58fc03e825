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
use pregel_api::{graph::Graph, VID};
use rayon::ThreadPool;
use std::sync::Arc;

pub const DISTANCE: &str = "distance";

/// Shortest path distances from a single source.
///
/// On weighted runs the distance is the sum of relationship weights,
/// otherwise every relationship counts as one hop. Unreachable nodes keep an
/// infinite distance.
#[derive(Debug, Clone, Copy)]
pub struct SingleSourceShortestPath {
    pub source: VID,
}

impl SingleSourceShortestPath {
    fn forward<G: Graph>(context: &ComputeContext<'_, G, Outgoing>, distance: f64) {
        let weighted = context.config().relationship_weighted && context.has_relationship_property();
        if weighted {
            context.send_to_neighbours(distance);
        } else {
            context.send_to_neighbours(distance + 1.0);
        }
    }
}

impl<G: Graph> PregelComputation<G> for SingleSourceShortestPath {
    type Direction = Outgoing;

    fn schema(&self, _config: &PregelConfig) -> PregelSchema {
        PregelSchema::builder()
            .add(DISTANCE, ValueType::Double)
            .build()
    }

    fn init(&self, context: &mut InitContext<'_, G, Outgoing>) {
        let distance = if context.node_id() == self.source {
            0.0
        } else {
            f64::INFINITY
        };
        context.set_node_value(DISTANCE, distance);
    }

    fn compute(&self, context: &mut ComputeContext<'_, G, Outgoing>, messages: &mut Messages<'_>) {
        if context.is_initial_superstep() {
            if context.node_id() == self.source {
                Self::forward(context, 0.0);
            }
        } else {
            let distance = context.double_node_value(DISTANCE);
            let best = messages.fold(f64::INFINITY, f64::min);
            if best < distance {
                context.set_node_value(DISTANCE, best);
                Self::forward(context, best);
            }
        }
        context.vote_to_halt();
    }

    fn reducer(&self) -> Option<Reducer> {
        Some(Reducer::Min)
    }

    fn apply_relationship_weight(&self, node_value: f64, relationship_weight: f64) -> f64 {
        node_value + relationship_weight
    }
}

/// Distances from the node with original id `source`, stored under [`DISTANCE`].
pub fn sssp<G: Graph>(
    graph: &G,
    source: u64,
    config: &PregelConfig,
    pool: Arc<ThreadPool>,
) -> Result<PregelResult, PregelError> {
    let source = graph
        .to_internal_id(source)
        .ok_or(pregel_api::graph::GraphError::NodeIdError(source))?;
    let computation = SingleSourceShortestPath { source };
    Pregel::new(graph.concurrent_copy(), config.clone(), computation, pool)?.run()
}

#[cfg(test)]
mod sssp_tests {
    use super::*;
    use crate::custom_pool;
    use pregel_api::graph::{CsrGraph, GraphBuilder};
    use pretty_assertions::assert_eq;

    fn weighted() -> pregel_api::graph::CsrGraph {
        let mut builder = GraphBuilder::new();
        builder
            .add_weighted_edge(1, 2, 1.0)
            .add_weighted_edge(2, 3, 2.0)
            .add_weighted_edge(1, 3, 5.0)
            .add_weighted_edge(3, 4, 0.5);
        builder.add_node(5);
        builder.build()
    }

    #[test]
    fn weighted_distances() {
        let graph = weighted();
        let config = PregelConfig::builder().relationship_weighted(true).build();
        let result = sssp(&graph, 1, &config, custom_pool(2).unwrap()).unwrap();
        assert!(result.did_converge());
        assert_eq!(
            result.node_values().double_properties(DISTANCE),
            vec![0.0, 1.0, 3.0, 3.5, f64::INFINITY]
        );
    }

    #[test]
    fn hop_distances_when_unweighted() {
        let graph = weighted();
        let result = sssp(&graph, 1, &PregelConfig::default(), custom_pool(2).unwrap()).unwrap();
        assert_eq!(
            result.node_values().double_properties(DISTANCE),
            vec![0.0, 1.0, 1.0, 2.0, f64::INFINITY]
        );

        let path = CsrGraph::from_edges([(0, 1), (1, 2)]);
        let result = sssp(&path, 2, &PregelConfig::default(), custom_pool(1).unwrap()).unwrap();
        assert_eq!(
            result.node_values().double_properties(DISTANCE),
            vec![f64::INFINITY, f64::INFINITY, 0.0]
        );
    }

    #[test]
    fn unknown_source() {
        let graph = weighted();
        let err = sssp(&graph, 42, &PregelConfig::default(), custom_pool(1).unwrap()).unwrap_err();
        assert!(matches!(err, PregelError::Graph(_)));
    }
}
