#![allow(dead_code)]

use once_cell::sync::Lazy;
use pregel::{custom_pool, prelude::*};
use pregel_api::graph::{CsrGraph, GraphBuilder};
use rayon::ThreadPool;
use std::sync::Arc;

pub static POOL: Lazy<Arc<ThreadPool>> =
    Lazy::new(|| custom_pool(4).expect("test pool starts"));

pub const ALICE: u64 = 0;
pub const BOB: u64 = 1;
pub const EVE: u64 = 2;

/// alice -[2.0]-> bob, alice -[1.0]-> eve, every node carrying seed properties.
pub fn alice_bob_eve(inverse_index: bool) -> CsrGraph {
    let mut builder = GraphBuilder::new().with_inverse_index(inverse_index);
    builder
        .add_weighted_edge(ALICE, BOB, 2.0)
        .add_weighted_edge(ALICE, EVE, 1.0);
    for (node, double_seed, long_seed) in [(ALICE, 42.0, 23i64), (BOB, 43.0, 24), (EVE, 44.0, 25)] {
        builder
            .add_node_property(node, "doubleSeed", double_seed)
            .unwrap();
        builder.add_node_property(node, "longSeed", long_seed).unwrap();
    }
    builder.build()
}

/// Every combination of messenger and executor that must behave the same.
pub fn configs() -> Vec<PregelConfig> {
    let mut configs = vec![];
    for partitioning in [Partitioning::Range, Partitioning::Degree, Partitioning::Auto] {
        for is_asynchronous in [false, true] {
            configs.push(
                PregelConfig::builder()
                    .concurrency(4)
                    .partitioning(partitioning)
                    .is_asynchronous(is_asynchronous)
                    .build(),
            );
        }
    }
    configs
}

pub fn double_values(result: &PregelResult, key: &str) -> Vec<f64> {
    result.node_values().double_properties(key)
}
