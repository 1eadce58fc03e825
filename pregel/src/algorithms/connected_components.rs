use crate::{
    compute::{
        context::{ComputeContext, InitContext},
        Bidirectional, PregelComputation,
    },
    config::PregelConfig,
    errors::PregelError,
    messages::{Messages, Reducer},
    pregel::{Pregel, PregelResult},
    schema::{PregelSchema, ValueType},
};
use pregel_api::graph::Graph;
use rayon::ThreadPool;
use rustc_hash::FxHashMap;
use std::sync::Arc;

pub const COMPONENT: &str = "component";

/// Weakly connected components by minimum label propagation.
///
/// Labels travel along both directions of every relationship, so the graph
/// needs an inverse index.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConnectedComponents;

impl<G: Graph> PregelComputation<G> for ConnectedComponents {
    type Direction = Bidirectional;

    fn schema(&self, _config: &PregelConfig) -> PregelSchema {
        PregelSchema::builder()
            .add(COMPONENT, ValueType::Long)
            .build()
    }

    fn init(&self, context: &mut InitContext<'_, G, Bidirectional>) {
        let id = context.node_id().index() as i64;
        context.set_node_value(COMPONENT, id);
    }

    fn compute(
        &self,
        context: &mut ComputeContext<'_, G, Bidirectional>,
        messages: &mut Messages<'_>,
    ) {
        let component = context.long_node_value(COMPONENT);
        if context.is_initial_superstep() {
            context.send_to_neighbours(component as f64);
            context.send_to_incoming_neighbours(component as f64);
        } else if let Some(smallest) = messages.map(|m| m as i64).min() {
            if smallest < component {
                context.set_node_value(COMPONENT, smallest);
                context.send_to_neighbours(smallest as f64);
                context.send_to_incoming_neighbours(smallest as f64);
            }
        }
        context.vote_to_halt();
    }

    fn reducer(&self) -> Option<Reducer> {
        Some(Reducer::Min)
    }
}

/// Weakly connected components, stored under [`COMPONENT`] as the smallest internal id of each component.
pub fn connected_components<G: Graph>(
    graph: &G,
    config: &PregelConfig,
    pool: Arc<ThreadPool>,
) -> Result<PregelResult, PregelError> {
    Pregel::new(graph.concurrent_copy(), config.clone(), ConnectedComponents, pool)?.run()
}

/// Map every original node id to the original id of its component representative.
pub fn components_by_original_id<G: Graph>(graph: &G, result: &PregelResult) -> FxHashMap<u64, u64> {
    result
        .node_values()
        .long_properties(COMPONENT)
        .into_iter()
        .enumerate()
        .map(|(node, component)| {
            (
                graph.to_original_id(node.into()),
                graph.to_original_id((component as usize).into()),
            )
        })
        .collect()
}
