//! # pregel
//!
//! A vertex-centric, bulk synchronous parallel graph compute engine.
//!
//! A computation supplies per-node `init` and `compute` callbacks. The engine
//! drives synchronised rounds, called supersteps, in which every active node
//! reads the messages sent to it in the previous round, updates its own
//! properties and sends new messages, until no messages are in flight and
//! every node has voted to halt, the master compute hook declares
//! convergence, or the iteration limit is reached.
//!
//! Key modules:
//! - `schema` and `node_value`: typed per-node property storage.
//! - `messages`: the synchronous, asynchronous and reducing messengers and
//!   the growable per-node queue they are built on.
//! - `compute`: the computation contract, the contexts handed to callbacks
//!   and the compute step that runs one partition for one superstep.
//! - `executor`: the recursive-splitting and static-partition executors.
//! - `pregel`: the orchestrator tying a run together.
//!
//! # Example
//!
//! ```
//! use pregel::prelude::*;
//! use pregel_api::graph::CsrGraph;
//!
//! let graph = CsrGraph::from_edges([(0, 1), (1, 2), (2, 0)]);
//! let pool = custom_pool(2).unwrap();
//! let config = PregelConfig::builder().max_iterations(100).build();
//! let result = page_rank(&graph, &config, pool, 0.85, 1e-6).unwrap();
//! assert!(result.did_converge());
//! assert_eq!(result.node_values().double_properties(PAGE_RANK).len(), 3);
//! ```

pub mod algorithms;
pub mod compute;
pub mod config;
pub mod errors;
pub mod executor;
pub mod memory;
pub mod messages;
pub mod node_value;
pub mod partition;
pub mod pregel;
pub mod prelude;
pub mod progress;
pub mod schema;
pub mod termination;
mod vote_bits;

#[cfg(test)]
#[macro_use]
extern crate quickcheck_macros;

use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Arc;

/// Build a dedicated worker pool with `n_threads` threads.
///
/// The pool is handed to [`pregel::Pregel::new`] explicitly and can be shared between runs.
pub fn custom_pool(n_threads: usize) -> Result<Arc<ThreadPool>, errors::PregelError> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .thread_name(|i| format!("pregel-worker-{i}"))
        .build()?;

    Ok(Arc::new(pool))
}
