//! Computations built on the engine.

pub mod connected_components;
pub mod page_rank;
pub mod sssp;
