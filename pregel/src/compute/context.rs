//! Views handed to the callbacks of a [`PregelComputation`](super::PregelComputation).
//!
//! A context is built by the engine for one node and one callback invocation
//! and only lives for that call. Node values can be written for the current
//! node only, except in [`MasterComputeContext`] which runs single-threaded.

use super::{Bidirectional, Direction};
use crate::{
    config::PregelConfig,
    messages::Messenger,
    node_value::NodeValue,
    schema::Value,
    vote_bits::VoteBits,
};
use itertools::Itertools;
use pregel_api::{
    graph::{Graph, Prop},
    VID,
};
use std::{
    marker::PhantomData,
    ops::{Deref, DerefMut},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

/// What every per-node context can see.
pub struct NodeContext<'a, G> {
    node: VID,
    superstep: usize,
    graph: &'a G,
    config: &'a PregelConfig,
    node_values: &'a NodeValue,
}

impl<'a, G: Graph> NodeContext<'a, G> {
    pub(crate) fn new(
        node: VID,
        superstep: usize,
        graph: &'a G,
        config: &'a PregelConfig,
        node_values: &'a NodeValue,
    ) -> Self {
        Self {
            node,
            superstep,
            graph,
            config,
            node_values,
        }
    }

    pub fn node_id(&self) -> VID {
        self.node
    }

    pub fn superstep(&self) -> usize {
        self.superstep
    }

    pub fn is_initial_superstep(&self) -> bool {
        self.superstep == 0
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn relationship_count(&self) -> usize {
        self.graph.relationship_count()
    }

    pub fn is_multi_graph(&self) -> bool {
        self.graph.is_multi_graph()
    }

    /// Whether relationships carry a weight.
    pub fn has_relationship_property(&self) -> bool {
        self.graph.has_relationship_property()
    }

    pub fn config(&self) -> &PregelConfig {
        self.config
    }

    /// Number of outgoing relationships of the current node.
    pub fn degree(&self) -> usize {
        self.graph.degree(self.node)
    }

    pub fn neighbours(&self) -> impl Iterator<Item = VID> + 'a {
        let graph: &'a G = self.graph;
        graph.neighbours(self.node)
    }

    pub fn for_each_neighbour(&self, f: impl FnMut(VID)) {
        self.neighbours().for_each(f)
    }

    /// Like [`Self::for_each_neighbour`] but visits each target once on multi-graphs.
    pub fn for_each_distinct_neighbour(&self, f: impl FnMut(VID)) {
        if self.graph.is_multi_graph() {
            self.neighbours().unique().for_each(f)
        } else {
            self.neighbours().for_each(f)
        }
    }

    pub fn to_original_id(&self, node: VID) -> u64 {
        self.graph.to_original_id(node)
    }

    pub fn to_internal_id(&self, original_id: u64) -> Option<VID> {
        self.graph.to_internal_id(original_id)
    }

    pub fn long_node_value(&self, key: &str) -> i64 {
        self.node_values.long_value(key, self.node)
    }

    pub fn double_node_value(&self, key: &str) -> f64 {
        self.node_values.double_value(key, self.node)
    }

    pub fn long_array_node_value(&self, key: &str) -> Arc<[i64]> {
        self.node_values.long_array_value(key, self.node)
    }

    pub fn double_array_node_value(&self, key: &str) -> Arc<[f64]> {
        self.node_values.double_array_value(key, self.node)
    }

    /// Overwrite a property of the current node.
    ///
    /// # Panics
    ///
    /// If `key` is not in the schema or `value` has a different type.
    pub fn set_node_value(&mut self, key: &str, value: impl Into<Value>) {
        self.node_values.set(key, self.node, value)
    }

    fn incoming_degree(&self) -> usize {
        self.graph.inverse_degree(self.node)
    }

    fn incoming_neighbours(&self) -> impl Iterator<Item = VID> + 'a {
        let graph: &'a G = self.graph;
        graph.inverse_neighbours(self.node)
    }
}

/// Context of [`PregelComputation::init`](super::PregelComputation::init).
pub struct InitContext<'a, G, D> {
    node: NodeContext<'a, G>,
    _direction: PhantomData<D>,
}

impl<'a, G: Graph, D: Direction> InitContext<'a, G, D> {
    pub(crate) fn new(node: NodeContext<'a, G>) -> Self {
        Self {
            node,
            _direction: PhantomData,
        }
    }

    /// A property stored by the graph for the current node.
    pub fn node_property(&self, key: &str) -> Option<Prop> {
        self.node.graph.node_property(key, self.node.node)
    }
}

impl<'a, G: Graph> InitContext<'a, G, Bidirectional> {
    pub fn incoming_degree(&self) -> usize {
        self.node.incoming_degree()
    }

    pub fn incoming_neighbours(&self) -> impl Iterator<Item = VID> + 'a {
        self.node.incoming_neighbours()
    }

    pub fn for_each_incoming_neighbour(&self, f: impl FnMut(VID)) {
        self.node.incoming_neighbours().for_each(f)
    }
}

impl<'a, G, D> Deref for InitContext<'a, G, D> {
    type Target = NodeContext<'a, G>;

    fn deref(&self) -> &Self::Target {
        &self.node
    }
}

impl<G, D> DerefMut for InitContext<'_, G, D> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.node
    }
}

/// Context of [`PregelComputation::compute`](super::PregelComputation::compute).
pub struct ComputeContext<'a, G, D> {
    node: NodeContext<'a, G>,
    messenger: &'a Messenger,
    vote_bits: &'a VoteBits,
    has_sent_message: &'a AtomicBool,
    apply_weight: &'a dyn Fn(f64, f64) -> f64,
    _direction: PhantomData<D>,
}

impl<'a, G: Graph, D: Direction> ComputeContext<'a, G, D> {
    pub(crate) fn new(
        node: NodeContext<'a, G>,
        messenger: &'a Messenger,
        vote_bits: &'a VoteBits,
        has_sent_message: &'a AtomicBool,
        apply_weight: &'a dyn Fn(f64, f64) -> f64,
    ) -> Self {
        Self {
            node,
            messenger,
            vote_bits,
            has_sent_message,
            apply_weight,
            _direction: PhantomData,
        }
    }

    /// Send `message` to `target`, to be read in the next superstep (or in this
    /// one on an asynchronous run).
    ///
    /// # Panics
    ///
    /// If `message` is NaN, which the message queues use to mark empty slots.
    pub fn send_to(&self, target: VID, message: f64) {
        assert!(
            !message.is_nan(),
            "cannot send NaN to node {}, NaN marks an empty message slot",
            target.0
        );
        self.messenger.send_to(target, message);
        if !self.has_sent_message.load(Ordering::Relaxed) {
            self.has_sent_message.store(true, Ordering::Relaxed);
        }
    }

    /// Send `message` along every outgoing relationship.
    ///
    /// On a weighted run the message is first passed through
    /// [`PregelComputation::apply_relationship_weight`](super::PregelComputation::apply_relationship_weight).
    pub fn send_to_neighbours(&self, message: f64) {
        let graph = self.node.graph;
        if self.node.config.relationship_weighted && graph.has_relationship_property() {
            for (target, weight) in graph.weighted_neighbours(self.node.node, 1.0) {
                self.send_to(target, (self.apply_weight)(message, weight));
            }
        } else {
            for target in graph.neighbours(self.node.node) {
                self.send_to(target, message);
            }
        }
    }

    /// Skip this node in later supersteps until it receives a message.
    pub fn vote_to_halt(&self) {
        self.vote_bits.set(self.node.node);
    }
}

impl<'a, G: Graph> ComputeContext<'a, G, Bidirectional> {
    pub fn incoming_degree(&self) -> usize {
        self.node.incoming_degree()
    }

    pub fn incoming_neighbours(&self) -> impl Iterator<Item = VID> + 'a {
        self.node.incoming_neighbours()
    }

    pub fn for_each_incoming_neighbour(&self, f: impl FnMut(VID)) {
        self.node.incoming_neighbours().for_each(f)
    }

    pub fn send_to_incoming_neighbours(&self, message: f64) {
        for source in self.node.incoming_neighbours() {
            self.send_to(source, message);
        }
    }
}

impl<'a, G, D> Deref for ComputeContext<'a, G, D> {
    type Target = NodeContext<'a, G>;

    fn deref(&self) -> &Self::Target {
        &self.node
    }
}

impl<G, D> DerefMut for ComputeContext<'_, G, D> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.node
    }
}

/// Context of [`PregelComputation::master_compute`](super::PregelComputation::master_compute).
///
/// Runs between supersteps with no worker active, so any node can be read and written.
pub struct MasterComputeContext<'a, G> {
    superstep: usize,
    graph: &'a G,
    config: &'a PregelConfig,
    node_values: &'a NodeValue,
}

impl<'a, G: Graph> MasterComputeContext<'a, G> {
    pub(crate) fn new(
        superstep: usize,
        graph: &'a G,
        config: &'a PregelConfig,
        node_values: &'a NodeValue,
    ) -> Self {
        Self {
            superstep,
            graph,
            config,
            node_values,
        }
    }

    pub fn superstep(&self) -> usize {
        self.superstep
    }

    pub fn is_initial_superstep(&self) -> bool {
        self.superstep == 0
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn relationship_count(&self) -> usize {
        self.graph.relationship_count()
    }

    pub fn config(&self) -> &PregelConfig {
        self.config
    }

    pub fn degree(&self, node: VID) -> usize {
        self.graph.degree(node)
    }

    pub fn to_original_id(&self, node: VID) -> u64 {
        self.graph.to_original_id(node)
    }

    /// Visit nodes in id order until `f` returns `false`.
    pub fn for_each_node(&self, mut f: impl FnMut(VID) -> bool) {
        for node in (0..self.graph.node_count()).map(VID) {
            if !f(node) {
                break;
            }
        }
    }

    pub fn long_node_value(&self, node: VID, key: &str) -> i64 {
        self.node_values.long_value(key, node)
    }

    pub fn double_node_value(&self, node: VID, key: &str) -> f64 {
        self.node_values.double_value(key, node)
    }

    pub fn long_array_node_value(&self, node: VID, key: &str) -> Arc<[i64]> {
        self.node_values.long_array_value(key, node)
    }

    pub fn double_array_node_value(&self, node: VID, key: &str) -> Arc<[f64]> {
        self.node_values.double_array_value(key, node)
    }

    pub fn set_node_value(&mut self, node: VID, key: &str, value: impl Into<Value>) {
        self.node_values.set(key, node, value)
    }
}
