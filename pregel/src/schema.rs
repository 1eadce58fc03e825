//! Declaration of the per-node properties a computation reads and writes.

use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Long,
    Double,
    LongArray,
    DoubleArray,
}

impl ValueType {
    /// The value every node starts with unless the schema says otherwise.
    pub fn default_value(&self) -> Value {
        match self {
            ValueType::Long => Value::Long(i64::MIN),
            ValueType::Double => Value::Double(f64::NAN),
            ValueType::LongArray => Value::LongArray(Arc::from([])),
            ValueType::DoubleArray => Value::DoubleArray(Arc::from([])),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Long => "Long",
            ValueType::Double => "Double",
            ValueType::LongArray => "LongArray",
            ValueType::DoubleArray => "DoubleArray",
        };
        f.write_str(name)
    }
}

/// A single node property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Long(i64),
    Double(f64),
    LongArray(Arc<[i64]>),
    DoubleArray(Arc<[f64]>),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Long(_) => ValueType::Long,
            Value::Double(_) => ValueType::Double,
            Value::LongArray(_) => ValueType::LongArray,
            Value::DoubleArray(_) => ValueType::DoubleArray,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Long(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<Vec<i64>> for Value {
    fn from(value: Vec<i64>) -> Self {
        Value::LongArray(value.into())
    }
}

impl From<Vec<f64>> for Value {
    fn from(value: Vec<f64>) -> Self {
        Value::DoubleArray(value.into())
    }
}

impl From<&[i64]> for Value {
    fn from(value: &[i64]) -> Self {
        Value::LongArray(value.into())
    }
}

impl From<&[f64]> for Value {
    fn from(value: &[f64]) -> Self {
        Value::DoubleArray(value.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Visibility {
    /// Part of the result handed to callers.
    #[default]
    Public,
    /// Scratch state, only visible to the computation itself.
    Private,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub key: String,
    pub value_type: ValueType,
    pub visibility: Visibility,
    pub default_value: Value,
}

/// An ordered, immutable set of uniquely keyed node properties.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PregelSchema {
    elements: Vec<Element>,
}

impl PregelSchema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn get(&self, key: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.key == key)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn public_elements(&self) -> impl Iterator<Item = &Element> + '_ {
        self.elements
            .iter()
            .filter(|e| e.visibility == Visibility::Public)
    }
}

#[derive(Debug, Default)]
pub struct SchemaBuilder {
    elements: Vec<Element>,
}

impl SchemaBuilder {
    /// Add a public property starting at the type's default value.
    pub fn add(self, key: impl Into<String>, value_type: ValueType) -> Self {
        self.add_with_visibility(key, value_type, Visibility::Public)
    }

    pub fn add_with_visibility(
        self,
        key: impl Into<String>,
        value_type: ValueType,
        visibility: Visibility,
    ) -> Self {
        self.push(Element {
            key: key.into(),
            value_type,
            visibility,
            default_value: value_type.default_value(),
        })
    }

    /// Add a property whose type is taken from `default_value`.
    pub fn add_with_default(
        self,
        key: impl Into<String>,
        default_value: impl Into<Value>,
        visibility: Visibility,
    ) -> Self {
        let default_value = default_value.into();
        self.push(Element {
            key: key.into(),
            value_type: default_value.value_type(),
            visibility,
            default_value,
        })
    }

    fn push(mut self, element: Element) -> Self {
        match self.elements.iter_mut().find(|e| e.key == element.key) {
            Some(existing) => *existing = element,
            None => self.elements.push(element),
        }
        self
    }

    pub fn build(self) -> PregelSchema {
        PregelSchema {
            elements: self.elements,
        }
    }
}
