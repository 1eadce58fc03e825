//! Dense per-node property storage laid out by a [`PregelSchema`].
//!
//! Every slot is individually atomic or locked, so the store can be shared by
//! all workers of a superstep. Each slot is only ever written by the worker
//! owning the node, which the contexts enforce by exposing writes for the
//! current node only.

use crate::{
    memory::{size_of_slice, MemoryRange},
    schema::{Element, PregelSchema, Value, ValueType, Visibility},
};
use parking_lot::RwLock;
use pregel_api::{atomic_extra::AtomicF64, VID};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::{
    mem::size_of,
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
};

/// Array length assumed per node for the upper bound of array property estimates.
pub const ESTIMATED_ARRAY_LENGTH: usize = 16;

#[derive(Debug)]
enum Property {
    Long(Vec<AtomicI64>),
    Double(Vec<AtomicF64>),
    LongArray(Vec<RwLock<Arc<[i64]>>>),
    DoubleArray(Vec<RwLock<Arc<[f64]>>>),
}

impl Property {
    fn new(element: &Element, node_count: usize) -> Self {
        match &element.default_value {
            Value::Long(v) => Property::Long(
                (0..node_count)
                    .into_par_iter()
                    .map(|_| AtomicI64::new(*v))
                    .collect(),
            ),
            Value::Double(v) => Property::Double(
                (0..node_count)
                    .into_par_iter()
                    .map(|_| AtomicF64::new(*v))
                    .collect(),
            ),
            Value::LongArray(v) => Property::LongArray(
                (0..node_count)
                    .into_par_iter()
                    .map(|_| RwLock::new(v.clone()))
                    .collect(),
            ),
            Value::DoubleArray(v) => Property::DoubleArray(
                (0..node_count)
                    .into_par_iter()
                    .map(|_| RwLock::new(v.clone()))
                    .collect(),
            ),
        }
    }

    fn value_type(&self) -> ValueType {
        match self {
            Property::Long(_) => ValueType::Long,
            Property::Double(_) => ValueType::Double,
            Property::LongArray(_) => ValueType::LongArray,
            Property::DoubleArray(_) => ValueType::DoubleArray,
        }
    }

    fn value(&self, node: VID) -> Value {
        let i = node.index();
        match self {
            Property::Long(values) => Value::Long(values[i].load(Ordering::Relaxed)),
            Property::Double(values) => Value::Double(values[i].load(Ordering::Relaxed)),
            Property::LongArray(values) => Value::LongArray(values[i].read().clone()),
            Property::DoubleArray(values) => Value::DoubleArray(values[i].read().clone()),
        }
    }

    fn estimate(value_type: ValueType, node_count: usize) -> MemoryRange {
        match value_type {
            ValueType::Long => MemoryRange::of(size_of_slice::<AtomicI64>(node_count)),
            ValueType::Double => MemoryRange::of(size_of_slice::<AtomicF64>(node_count)),
            ValueType::LongArray => {
                Self::estimate_arrays(node_count, size_of::<RwLock<Arc<[i64]>>>(), 8)
            }
            ValueType::DoubleArray => {
                Self::estimate_arrays(node_count, size_of::<RwLock<Arc<[f64]>>>(), 8)
            }
        }
    }

    fn estimate_arrays(node_count: usize, slot: usize, element: usize) -> MemoryRange {
        // every Arc allocation carries two reference counts
        let header = 2 * size_of::<usize>();
        let slots = size_of::<Vec<u8>>() + node_count * slot;
        let min = slots + node_count * header;
        let max = min + node_count * ESTIMATED_ARRAY_LENGTH * element;
        MemoryRange::of_range(min, max)
    }
}

/// The node properties of a run, one dense column per schema element.
#[derive(Debug)]
pub struct NodeValue {
    schema: PregelSchema,
    index: FxHashMap<String, usize>,
    properties: Vec<Property>,
    node_count: usize,
}

impl NodeValue {
    /// Allocate every column at its default value. Runs on the current rayon pool.
    pub fn new(schema: PregelSchema, node_count: usize) -> Self {
        let index = schema
            .elements()
            .iter()
            .enumerate()
            .map(|(i, e)| (e.key.clone(), i))
            .collect();
        let properties = schema
            .elements()
            .iter()
            .map(|e| Property::new(e, node_count))
            .collect();
        Self {
            schema,
            index,
            properties,
            node_count,
        }
    }

    pub fn schema(&self) -> &PregelSchema {
        &self.schema
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn has_property(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    fn property(&self, key: &str) -> &Property {
        match self.index.get(key) {
            Some(i) => &self.properties[*i],
            None => panic!("Property `{key}` is not declared in the schema"),
        }
    }

    fn type_mismatch(key: &str, expected: ValueType, actual: ValueType) -> ! {
        panic!("Property `{key}` is of type {actual}, not {expected}")
    }

    pub fn long_value(&self, key: &str, node: VID) -> i64 {
        match self.property(key) {
            Property::Long(values) => values[node.index()].load(Ordering::Relaxed),
            other => Self::type_mismatch(key, ValueType::Long, other.value_type()),
        }
    }

    pub fn double_value(&self, key: &str, node: VID) -> f64 {
        match self.property(key) {
            Property::Double(values) => values[node.index()].load(Ordering::Relaxed),
            other => Self::type_mismatch(key, ValueType::Double, other.value_type()),
        }
    }

    pub fn long_array_value(&self, key: &str, node: VID) -> Arc<[i64]> {
        match self.property(key) {
            Property::LongArray(values) => values[node.index()].read().clone(),
            other => Self::type_mismatch(key, ValueType::LongArray, other.value_type()),
        }
    }

    pub fn double_array_value(&self, key: &str, node: VID) -> Arc<[f64]> {
        match self.property(key) {
            Property::DoubleArray(values) => values[node.index()].read().clone(),
            other => Self::type_mismatch(key, ValueType::DoubleArray, other.value_type()),
        }
    }

    /// The value of `key` for `node`, whatever its type.
    pub fn value(&self, key: &str, node: VID) -> Value {
        self.property(key).value(node)
    }

    /// Overwrite the slot of `node`.
    ///
    /// Only the worker owning `node` may call this during a superstep.
    pub(crate) fn set(&self, key: &str, node: VID, value: impl Into<Value>) {
        let i = node.index();
        let value = value.into();
        match (self.property(key), value) {
            (Property::Long(values), Value::Long(v)) => values[i].store(v, Ordering::Relaxed),
            (Property::Double(values), Value::Double(v)) => values[i].store(v, Ordering::Relaxed),
            (Property::LongArray(values), Value::LongArray(v)) => *values[i].write() = v,
            (Property::DoubleArray(values), Value::DoubleArray(v)) => *values[i].write() = v,
            (property, value) => {
                Self::type_mismatch(key, property.value_type(), value.value_type())
            }
        }
    }

    /// Copy a `Long` column out, indexed by node id.
    pub fn long_properties(&self, key: &str) -> Vec<i64> {
        match self.property(key) {
            Property::Long(values) => values
                .par_iter()
                .map(|v| v.load(Ordering::Relaxed))
                .collect(),
            other => Self::type_mismatch(key, ValueType::Long, other.value_type()),
        }
    }

    /// Copy a `Double` column out, indexed by node id.
    pub fn double_properties(&self, key: &str) -> Vec<f64> {
        match self.property(key) {
            Property::Double(values) => values
                .par_iter()
                .map(|v| v.load(Ordering::Relaxed))
                .collect(),
            other => Self::type_mismatch(key, ValueType::Double, other.value_type()),
        }
    }

    pub fn properties(&self, key: &str) -> Vec<Value> {
        let property = self.property(key);
        (0..self.node_count)
            .map(|i| property.value(VID(i)))
            .collect()
    }

    pub fn memory_estimation(schema: &PregelSchema, node_count: usize) -> MemoryRange {
        schema
            .elements()
            .iter()
            .map(|e| Property::estimate(e.value_type, node_count))
            .fold(MemoryRange::empty(), |acc, r| acc + r)
    }

    pub(crate) fn is_public(&self, key: &str) -> bool {
        self.schema
            .get(key)
            .is_some_and(|e| e.visibility == Visibility::Public)
    }
}

#[cfg(test)]
mod node_value_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn schema() -> PregelSchema {
        PregelSchema::builder()
            .add("long", ValueType::Long)
            .add("double", ValueType::Double)
            .add_with_default("seeded", 7i64, Visibility::Private)
            .add("longs", ValueType::LongArray)
            .add("doubles", ValueType::DoubleArray)
            .build()
    }

    #[test]
    fn starts_at_defaults() {
        let values = NodeValue::new(schema(), 3);
        assert_eq!(values.long_value("long", VID(2)), i64::MIN);
        assert!(values.double_value("double", VID(0)).is_nan());
        assert_eq!(values.long_properties("seeded"), vec![7, 7, 7]);
        assert!(values.long_array_value("longs", VID(1)).is_empty());
        assert!(values.double_array_value("doubles", VID(1)).is_empty());
        assert!(!values.is_public("seeded"));
        assert!(values.is_public("long"));
    }

    #[test]
    fn set_and_read_back() {
        let values = NodeValue::new(schema(), 3);
        values.set("long", VID(1), 42i64);
        values.set("double", VID(2), 0.5);
        values.set("longs", VID(0), vec![1i64, 2, 3]);
        values.set("doubles", VID(0), vec![1.5]);

        assert_eq!(values.long_properties("long"), vec![i64::MIN, 42, i64::MIN]);
        assert_eq!(values.double_value("double", VID(2)), 0.5);
        assert_eq!(&*values.long_array_value("longs", VID(0)), &[1, 2, 3]);
        assert_eq!(values.value("doubles", VID(0)), Value::from(vec![1.5]));
    }

    #[test]
    #[should_panic(expected = "not declared")]
    fn unknown_key_panics() {
        let values = NodeValue::new(schema(), 1);
        values.long_value("missing", VID(0));
    }

    #[test]
    #[should_panic(expected = "is of type Long, not Double")]
    fn wrong_type_panics() {
        let values = NodeValue::new(schema(), 1);
        values.double_value("long", VID(0));
    }

    #[test]
    fn empty_graph() {
        let values = NodeValue::new(schema(), 0);
        assert!(values.long_properties("long").is_empty());
    }

    #[test]
    fn estimation_grows_with_arrays() {
        let scalar = PregelSchema::builder().add("a", ValueType::Long).build();
        let arrays = PregelSchema::builder().add("a", ValueType::LongArray).build();
        let scalar = NodeValue::memory_estimation(&scalar, 1_000);
        let arrays = NodeValue::memory_estimation(&arrays, 1_000);
        assert_eq!(scalar.min, scalar.max);
        assert!(scalar.min >= 8_000);
        assert!(arrays.max > arrays.min);
    }
}
