//! The run loop.
//!
//! A run allocates node values, vote bits and the messenger once, then
//! repeats supersteps: the executor processes every partition, the master
//! compute hook runs on the calling thread, and the convergence check decides
//! whether another superstep is needed.

use crate::{
    compute::{context::MasterComputeContext, step::Superstep, Direction, PregelComputation},
    config::PregelConfig,
    errors::PregelError,
    executor::PregelExecutor,
    memory::MemoryRange,
    messages::{Messenger, MessengerKind},
    node_value::NodeValue,
    progress::{NullProgressTracker, ProgressTracker},
    schema::{PregelSchema, Value},
    termination::TerminationFlag,
    vote_bits::VoteBits,
};
use pregel_api::graph::Graph;
use rayon::ThreadPool;
use rustc_hash::FxHashMap;
use std::{mem::size_of, sync::Arc};
use tracing::{debug, info};

/// The outcome of a completed run.
#[derive(Debug)]
pub struct PregelResult {
    node_values: NodeValue,
    did_converge: bool,
    ran_iterations: usize,
}

impl PregelResult {
    /// All properties, including private ones.
    pub fn node_values(&self) -> &NodeValue {
        &self.node_values
    }

    pub fn into_node_values(self) -> NodeValue {
        self.node_values
    }

    pub fn did_converge(&self) -> bool {
        self.did_converge
    }

    /// Number of completed supersteps.
    pub fn ran_iterations(&self) -> usize {
        self.ran_iterations
    }

    /// The public properties, each as a column indexed by node id.
    pub fn public_properties(&self) -> FxHashMap<String, Vec<Value>> {
        self.node_values
            .schema()
            .public_elements()
            .map(|e| (e.key.clone(), self.node_values.properties(&e.key)))
            .collect()
    }

    pub fn is_public(&self, key: &str) -> bool {
        self.node_values.is_public(key)
    }
}

pub struct Pregel<G: Graph, C: PregelComputation<G>> {
    graph: G,
    config: PregelConfig,
    computation: C,
    node_values: NodeValue,
    messenger: Messenger,
    vote_bits: VoteBits,
    executor: PregelExecutor,
    pool: Arc<ThreadPool>,
    progress: Box<dyn ProgressTracker>,
    termination: TerminationFlag,
}

impl<G: Graph, C: PregelComputation<G>> Pregel<G, C> {
    /// Validate the setup and allocate all state of the run on `pool`.
    pub fn new(
        graph: G,
        config: PregelConfig,
        computation: C,
        pool: Arc<ThreadPool>,
    ) -> Result<Self, PregelError> {
        config.validate()?;
        if C::Direction::REQUIRES_INVERSE_INDEX && !graph.has_inverse_index() {
            return Err(PregelError::MissingInverseIndex {
                computation: computation.name(),
            });
        }

        let node_count = graph.node_count();
        let schema = computation.schema(&config);
        let reducer = computation.reducer();

        let (node_values, messenger, vote_bits) = pool.install(|| {
            let messenger = Messenger::new(node_count, &config, reducer)?;
            Ok::<_, PregelError>((
                NodeValue::new(schema, node_count),
                messenger,
                VoteBits::new(node_count),
            ))
        })?;
        let executor = PregelExecutor::new(&graph, &config, pool.clone())?;

        Ok(Self {
            graph,
            config,
            computation,
            node_values,
            messenger,
            vote_bits,
            executor,
            pool,
            progress: Box::new(NullProgressTracker),
            termination: TerminationFlag::default(),
        })
    }

    pub fn with_progress_tracker(mut self, progress: impl ProgressTracker + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }

    pub fn with_termination_flag(mut self, termination: TerminationFlag) -> Self {
        self.termination = termination;
        self
    }

    pub fn run(mut self) -> Result<PregelResult, PregelError> {
        let name = self.computation.name();
        let max_iterations = self.config.max_iterations;
        info!(
            "Running {} on {} nodes with concurrency {}, {} messenger and {} executor",
            name,
            self.graph.node_count(),
            self.config.concurrency,
            self.messenger.kind(),
            self.executor
        );

        let mut did_converge = false;
        let mut ran_iterations = 0;

        for superstep in 0..max_iterations {
            self.termination.assert_running()?;

            self.pool.install(|| self.messenger.init_iteration());

            let compute_task = format!("Compute iteration {} of {}", superstep + 1, max_iterations);
            self.progress.begin_subtask(&compute_task);
            let step = Superstep::new(
                superstep,
                &self.graph,
                &self.computation,
                &self.config,
                &self.node_values,
                &self.messenger,
                &self.vote_bits,
                self.progress.as_ref(),
            );
            self.executor.run(&step);
            let has_sent_message = step.has_sent_message();
            self.progress.end_subtask(&compute_task);
            ran_iterations = superstep + 1;

            let master_converged = self.run_master_compute(superstep);
            let all_halted = !has_sent_message && self.pool.install(|| self.vote_bits.all_set());
            debug!(
                superstep,
                has_sent_message, all_halted, master_converged, "Superstep finished"
            );

            if master_converged || all_halted {
                did_converge = true;
                break;
            }
        }

        self.computation.close();
        info!(
            "{} finished after {} supersteps, converged: {}",
            name, ran_iterations, did_converge
        );

        Ok(PregelResult {
            node_values: self.node_values,
            did_converge,
            ran_iterations,
        })
    }

    fn run_master_compute(&mut self, superstep: usize) -> bool {
        let task = format!(
            "Master compute iteration {} of {}",
            superstep + 1,
            self.config.max_iterations
        );
        self.progress.begin_subtask(&task);
        let mut context =
            MasterComputeContext::new(superstep, &self.graph, &self.config, &self.node_values);
        let converged = self.computation.master_compute(&mut context);
        self.progress.end_subtask(&task);
        converged
    }
}

/// Bytes needed by a run, without the graph itself.
pub fn memory_estimation(
    schema: &PregelSchema,
    node_count: usize,
    concurrency: usize,
    is_queue_based: bool,
    is_asynchronous: bool,
) -> MemoryRange {
    let kind = match (is_queue_based, is_asynchronous) {
        (false, _) => MessengerKind::Reducing,
        (true, true) => MessengerKind::Async,
        (true, false) => MessengerKind::Sync,
    };
    // a superstep only holds references, its size does not depend on the graph or computation
    let per_worker = MemoryRange::of(size_of::<Superstep<'static, (), ()>>()).times(concurrency);
    NodeValue::memory_estimation(schema, node_count)
        + VoteBits::memory_estimation(node_count)
        + Messenger::memory_estimation(kind, node_count)
        + per_worker
}
