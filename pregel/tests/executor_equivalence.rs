//! Every executor, partitioning and messenger must compute the same values
//! for computations whose result does not depend on message order.

use common::POOL;
use parking_lot::Mutex;
use pregel::prelude::*;
use pregel_api::{
    graph::CsrGraph,
    graphgen::{random_graph, random_graph_with_inverse, RelationshipDistribution},
};
use pretty_assertions::assert_eq;
use std::{
    collections::HashSet,
    sync::Arc,
    thread::{self, ThreadId},
};

mod common;

const NODE_COUNT: usize = 10_000;
const KEY: &str = "value";

/// Integer arithmetic only, so float sums are exact whatever the order.
struct Accumulate {
    reducer: Option<Reducer>,
}

impl<G: Graph> PregelComputation<G> for Accumulate {
    type Direction = Outgoing;

    fn schema(&self, _config: &PregelConfig) -> PregelSchema {
        PregelSchema::builder().add(KEY, ValueType::Long).build()
    }

    fn init(&self, context: &mut InitContext<'_, G, Outgoing>) {
        let seed = (context.node_id().index() % 7) as i64 + 1;
        context.set_node_value(KEY, seed);
    }

    fn compute(&self, context: &mut ComputeContext<'_, G, Outgoing>, messages: &mut Messages<'_>) {
        let received: f64 = messages.sum();
        let value = context.long_node_value(KEY) + received as i64;
        context.set_node_value(KEY, value);
        context.send_to_neighbours((value % 13) as f64);
    }

    fn reducer(&self) -> Option<Reducer> {
        self.reducer
    }
}

/// Minimum label propagation over both directions with plain queues.
struct QueueComponents;

impl<G: Graph> PregelComputation<G> for QueueComponents {
    type Direction = Bidirectional;

    fn schema(&self, _config: &PregelConfig) -> PregelSchema {
        PregelSchema::builder().add(KEY, ValueType::Long).build()
    }

    fn init(&self, context: &mut InitContext<'_, G, Bidirectional>) {
        let id = context.node_id().index() as i64;
        context.set_node_value(KEY, id);
    }

    fn compute(
        &self,
        context: &mut ComputeContext<'_, G, Bidirectional>,
        messages: &mut Messages<'_>,
    ) {
        let current = context.long_node_value(KEY);
        let smallest = messages.fold(current as f64, f64::min) as i64;
        if context.is_initial_superstep() || smallest < current {
            context.set_node_value(KEY, smallest);
            context.send_to_neighbours(smallest as f64);
            context.send_to_incoming_neighbours(smallest as f64);
        }
        context.vote_to_halt();
    }
}

/// Records which worker threads ran a compute step.
struct RecordThreads {
    threads: Arc<Mutex<HashSet<ThreadId>>>,
}

impl<G: Graph> PregelComputation<G> for RecordThreads {
    type Direction = Outgoing;

    fn schema(&self, _config: &PregelConfig) -> PregelSchema {
        PregelSchema::builder().add(KEY, ValueType::Long).build()
    }

    fn compute(&self, context: &mut ComputeContext<'_, G, Outgoing>, _messages: &mut Messages<'_>) {
        self.threads.lock().insert(thread::current().id());
        context.vote_to_halt();
    }
}

fn config(
    partitioning: Partitioning,
    concurrency: usize,
    is_asynchronous: bool,
    max_iterations: usize,
) -> PregelConfig {
    PregelConfig::builder()
        .partitioning(partitioning)
        .concurrency(concurrency)
        .is_asynchronous(is_asynchronous)
        .max_iterations(max_iterations)
        .build()
}

fn run<C: PregelComputation<CsrGraph>>(
    graph: &CsrGraph,
    config: PregelConfig,
    computation: C,
) -> PregelResult {
    Pregel::new(graph.clone(), config, computation, POOL.clone())
        .unwrap()
        .run()
        .unwrap()
}

#[test]
fn synchronous_runs_agree_across_executors() {
    let graph = random_graph(NODE_COUNT, 10, RelationshipDistribution::PowerLaw, 42);
    let expected = run(
        &graph,
        config(Partitioning::Range, 1, false, 6),
        Accumulate { reducer: None },
    );
    assert_eq!(expected.ran_iterations(), 6);
    let expected = expected.node_values().long_properties(KEY);

    for partitioning in [Partitioning::Range, Partitioning::Degree, Partitioning::Auto] {
        for concurrency in [1, 4] {
            for reducer in [None, Some(Reducer::Sum)] {
                let result = run(
                    &graph,
                    config(partitioning, concurrency, false, 6),
                    Accumulate { reducer },
                );
                assert_eq!(
                    result.node_values().long_properties(KEY),
                    expected,
                    "{partitioning:?} concurrency {concurrency} reducer {reducer:?}"
                );
            }
        }
    }
}

#[test]
fn components_reach_the_same_fixpoint() {
    let graph = random_graph_with_inverse(NODE_COUNT, 4, RelationshipDistribution::Random, 7);
    let expected = connected_components(
        &graph,
        &config(Partitioning::Range, 1, false, 100),
        POOL.clone(),
    )
    .unwrap();
    assert!(expected.did_converge());
    let expected = expected.node_values().long_properties(COMPONENT);

    for partitioning in [Partitioning::Range, Partitioning::Degree, Partitioning::Auto] {
        for is_asynchronous in [false, true] {
            let config = config(partitioning, 4, is_asynchronous, 100);

            let reduced = connected_components(&graph, &config, POOL.clone()).unwrap();
            assert!(reduced.did_converge());
            assert_eq!(reduced.node_values().long_properties(COMPONENT), expected);

            let queued = run(&graph, config.clone(), QueueComponents);
            assert!(queued.did_converge(), "{config:?}");
            assert_eq!(queued.node_values().long_properties(KEY), expected);
        }
    }
}

#[test]
fn executors_stay_within_the_configured_concurrency() {
    // Far above the fork-join split threshold, so recursive splitting would fan out.
    let graph = random_graph(200_000, 2, RelationshipDistribution::Uniform, 3);
    assert_eq!(POOL.current_num_threads(), 4);

    for partitioning in [Partitioning::Range, Partitioning::Degree, Partitioning::Auto] {
        for concurrency in [1, 2] {
            let threads = Arc::new(Mutex::new(HashSet::new()));
            let computation = RecordThreads {
                threads: threads.clone(),
            };
            let result = run(&graph, config(partitioning, concurrency, false, 1), computation);
            assert_eq!(result.ran_iterations(), 1);

            let used = threads.lock().len();
            if concurrency == 1 {
                assert_eq!(used, 1, "{partitioning:?}");
            } else {
                assert!(
                    (1..=concurrency).contains(&used),
                    "{partitioning:?} concurrency {concurrency} used {used} threads"
                );
            }
        }
    }
}
