//! The read-only graph contract consumed by the compute engine.
//!
//! The engine never mutates a graph. Every worker obtains its own handle via
//! [`Graph::concurrent_copy`] before traversing, so implementations are free to
//! keep per-handle cursors or caches.

use crate::VID;
use serde::{Deserialize, Serialize};

pub mod csr;

pub use csr::{CsrGraph, GraphBuilder};

/// A scalar node property stored by the graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Prop {
    I64(i64),
    F64(f64),
}

impl Prop {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Prop::I64(v) => Some(*v),
            Prop::F64(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Prop::I64(v) => Some(*v as f64),
            Prop::F64(v) => Some(*v),
        }
    }

    pub fn dtype(&self) -> PropType {
        match self {
            Prop::I64(_) => PropType::I64,
            Prop::F64(_) => PropType::F64,
        }
    }
}

impl From<i64> for Prop {
    fn from(value: i64) -> Self {
        Prop::I64(value)
    }
}

impl From<f64> for Prop {
    fn from(value: f64) -> Self {
        Prop::F64(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropType {
    I64,
    F64,
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum GraphError {
    #[error("Wrong type for property {name}: expected {expected:?} but actual type is {actual:?}")]
    PropertyTypeError {
        name: String,
        expected: PropType,
        actual: PropType,
    },
    #[error("No Node with ID {0}")]
    NodeIdError(u64),
}

pub trait Graph: Send + Sync {
    fn node_count(&self) -> usize;

    fn relationship_count(&self) -> usize;

    /// Number of outgoing relationships of `node`.
    fn degree(&self, node: VID) -> usize;

    fn neighbours(&self, node: VID) -> impl Iterator<Item = VID> + '_;

    /// Outgoing neighbours with their relationship weight, `fallback` where the
    /// relationship has none.
    fn weighted_neighbours(&self, node: VID, fallback: f64)
        -> impl Iterator<Item = (VID, f64)> + '_;

    /// Whether relationships carry a weight property.
    fn has_relationship_property(&self) -> bool;

    /// Whether there may be more than one relationship between a pair of nodes.
    fn is_multi_graph(&self) -> bool;

    /// A handle that can be moved to and used from another thread.
    fn concurrent_copy(&self) -> Self
    where
        Self: Sized;

    fn has_inverse_index(&self) -> bool;

    /// Number of incoming relationships of `node`, zero without an inverse index.
    fn inverse_degree(&self, node: VID) -> usize;

    /// Incoming neighbours of `node`, empty without an inverse index.
    fn inverse_neighbours(&self, node: VID) -> impl Iterator<Item = VID> + '_;

    fn node_property(&self, key: &str, node: VID) -> Option<Prop>;

    fn to_original_id(&self, node: VID) -> u64;

    fn to_internal_id(&self, original_id: u64) -> Option<VID>;
}
