//! Deterministic random graph generation for tests and benchmarks.
//!
//! # Examples
//!
//! ```
//! use pregel_api::graph::Graph;
//! use pregel_api::graphgen::{random_graph, RelationshipDistribution};
//! let graph = random_graph(1_000, 10, RelationshipDistribution::PowerLaw, 42);
//! assert_eq!(graph.node_count(), 1_000);
//! ```

use crate::graph::{CsrGraph, GraphBuilder};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Distribution, Normal, Pareto};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationshipDistribution {
    /// Every node has exactly `average_degree` outgoing relationships.
    Uniform,
    /// Out-degrees are normally distributed around `average_degree`.
    Random,
    /// Out-degrees follow a heavy-tailed distribution with mean close to `average_degree`.
    PowerLaw,
}

impl RelationshipDistribution {
    fn degree(&self, average_degree: usize, max_degree: usize, rng: &mut StdRng) -> usize {
        let average = average_degree as f64;
        let degree = match self {
            RelationshipDistribution::Uniform => average,
            RelationshipDistribution::Random => {
                let normal = Normal::new(average, average / 5.0).expect("finite std-dev");
                normal.sample(rng).round().max(0.0)
            }
            RelationshipDistribution::PowerLaw => {
                // shape 2 has mean 2 * scale
                let pareto = Pareto::new(1.0, 2.0).expect("positive scale and shape");
                (pareto.sample(rng) * average / 2.0).floor()
            }
        };
        (degree as usize).min(max_degree)
    }
}

/// Generate a graph of `node_count` nodes with original ids `0..node_count`.
///
/// The same `seed` always yields the same graph. Self loops are never generated.
pub fn random_graph(
    node_count: usize,
    average_degree: usize,
    distribution: RelationshipDistribution,
    seed: u64,
) -> CsrGraph {
    generate(node_count, average_degree, distribution, seed, false)
}

/// Like [`random_graph`] but also builds the reverse adjacency.
pub fn random_graph_with_inverse(
    node_count: usize,
    average_degree: usize,
    distribution: RelationshipDistribution,
    seed: u64,
) -> CsrGraph {
    generate(node_count, average_degree, distribution, seed, true)
}

fn generate(
    node_count: usize,
    average_degree: usize,
    distribution: RelationshipDistribution,
    seed: u64,
    inverse_index: bool,
) -> CsrGraph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut builder = GraphBuilder::new().with_inverse_index(inverse_index);

    for node in 0..node_count as u64 {
        builder.add_node(node);
    }
    if node_count < 2 {
        return builder.build();
    }

    let max_degree = node_count - 1;
    for src in 0..node_count as u64 {
        let degree = distribution.degree(average_degree, max_degree, &mut rng);
        for _ in 0..degree {
            let mut dst = rng.gen_range(0..node_count as u64);
            while dst == src {
                dst = rng.gen_range(0..node_count as u64);
            }
            builder.add_edge(src, dst);
        }
    }
    builder.build()
}
