//! The contract between a user computation and the engine.

pub mod context;
pub(crate) mod step;

use crate::{config::PregelConfig, messages::Messages, messages::Reducer, schema::PregelSchema};
use context::{ComputeContext, InitContext, MasterComputeContext};
use pregel_api::graph::Graph;

/// Which adjacency a computation may traverse.
///
/// Fixed at compile time through [`PregelComputation::Direction`]; the
/// incoming-neighbour methods on the contexts only exist for [`Bidirectional`].
pub trait Direction: Send + Sync + 'static {
    const REQUIRES_INVERSE_INDEX: bool;
}

/// Outgoing relationships only.
#[derive(Debug, Clone, Copy)]
pub enum Outgoing {}

/// Outgoing and incoming relationships. Requires a graph with an inverse index.
#[derive(Debug, Clone, Copy)]
pub enum Bidirectional {}

impl Direction for Outgoing {
    const REQUIRES_INVERSE_INDEX: bool = false;
}

impl Direction for Bidirectional {
    const REQUIRES_INVERSE_INDEX: bool = true;
}

/// A vertex-centric computation.
///
/// `init` runs once per node at the start of the first superstep. `compute`
/// runs for every node that received messages or has not voted to halt.
/// `master_compute` runs on a single thread after every superstep and may end
/// the run by returning `true`.
pub trait PregelComputation<G: Graph>: Send + Sync {
    type Direction: Direction;

    /// The node properties this computation reads and writes.
    fn schema(&self, config: &PregelConfig) -> PregelSchema;

    fn init(&self, _context: &mut InitContext<'_, G, Self::Direction>) {}

    fn compute(
        &self,
        context: &mut ComputeContext<'_, G, Self::Direction>,
        messages: &mut Messages<'_>,
    );

    fn master_compute(&self, _context: &mut MasterComputeContext<'_, G>) -> bool {
        false
    }

    /// Combine messages on arrival instead of queueing them.
    fn reducer(&self) -> Option<Reducer> {
        None
    }

    /// The message sent along a relationship of weight `relationship_weight`
    /// when `send_to_neighbours` is called with `node_value` on a weighted run.
    fn apply_relationship_weight(&self, node_value: f64, _relationship_weight: f64) -> f64 {
        node_value
    }

    /// Called once the run ends without error.
    fn close(&self) {}

    fn name(&self) -> String {
        let type_name = std::any::type_name::<Self>();
        let base = type_name.split('<').next().unwrap_or(type_name);
        base.rsplit("::").next().unwrap_or(base).to_owned()
    }
}
