use super::{
    context::{ComputeContext, InitContext, NodeContext},
    PregelComputation,
};
use crate::{
    config::PregelConfig, messages::Messenger, node_value::NodeValue, partition::Partition,
    progress::ProgressTracker, vote_bits::VoteBits,
};
use pregel_api::graph::Graph;
use std::sync::atomic::{AtomicBool, Ordering};

/// Everything the workers share during one superstep.
pub(crate) struct Superstep<'a, G, C> {
    pub(crate) superstep: usize,
    pub(crate) graph: &'a G,
    pub(crate) computation: &'a C,
    pub(crate) config: &'a PregelConfig,
    pub(crate) node_values: &'a NodeValue,
    pub(crate) messenger: &'a Messenger,
    pub(crate) vote_bits: &'a VoteBits,
    pub(crate) progress: &'a dyn ProgressTracker,
    has_sent_message: AtomicBool,
}

impl<'a, G: Graph, C: PregelComputation<G>> Superstep<'a, G, C> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        superstep: usize,
        graph: &'a G,
        computation: &'a C,
        config: &'a PregelConfig,
        node_values: &'a NodeValue,
        messenger: &'a Messenger,
        vote_bits: &'a VoteBits,
        progress: &'a dyn ProgressTracker,
    ) -> Self {
        Self {
            superstep,
            graph,
            computation,
            config,
            node_values,
            messenger,
            vote_bits,
            progress,
            has_sent_message: AtomicBool::new(false),
        }
    }

    pub(crate) fn has_sent_message(&self) -> bool {
        self.has_sent_message.load(Ordering::Relaxed)
    }
}

/// One partition of one superstep.
pub(crate) struct ComputeStep<'s, 'a, G, C> {
    partition: Partition,
    superstep: &'s Superstep<'a, G, C>,
}

impl<'s, 'a, G: Graph, C: PregelComputation<G>> ComputeStep<'s, 'a, G, C> {
    pub(crate) fn new(partition: Partition, superstep: &'s Superstep<'a, G, C>) -> Self {
        Self {
            partition,
            superstep,
        }
    }

    pub(crate) fn partition(&self) -> Partition {
        self.partition
    }

    pub(crate) fn with_partition(&self, partition: Partition) -> Self {
        Self::new(partition, self.superstep)
    }

    /// Run `init` (first superstep only) and `compute` for every node of the partition.
    pub(crate) fn compute_batch(&self) {
        let step = self.superstep;
        let graph = step.graph.concurrent_copy();
        let computation = step.computation;
        let apply_weight =
            |value: f64, weight: f64| computation.apply_relationship_weight(value, weight);
        let node_context =
            |node| NodeContext::new(node, step.superstep, &graph, step.config, step.node_values);

        for node in self.partition.nodes() {
            if step.superstep == 0 {
                let mut context = InitContext::new(node_context(node));
                computation.init(&mut context);
            }

            let mut messages = step.messenger.messages(node);
            if !messages.is_empty() || !step.vote_bits.get(node) {
                step.vote_bits.clear(node);
                let mut context = ComputeContext::new(
                    node_context(node),
                    step.messenger,
                    step.vote_bits,
                    &step.has_sent_message,
                    &apply_weight,
                );
                computation.compute(&mut context, &mut messages);
            }
        }

        step.progress.log_progress(self.partition.node_count());
    }
}
