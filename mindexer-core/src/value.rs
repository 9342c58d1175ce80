//! Scalar values used inside filter predicates.
//!
//! Predicate literals are restricted to the scalar subset of a document's
//! value space (§3 of the spec: "type-tagged scalars comparable by the
//! database's ordering"). Arrays and nested objects never appear as a
//! predicate literal, only as document field values, which is why this type
//! is narrower than a general JSON value.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A comparable, hashable scalar value.
///
/// Mirrors the shape of a JSON scalar plus the integer/float split a
/// document database preserves, the same way `IndexValue` mirrors `Value`
/// for B-tree keys: predicates need `Eq + Hash + Ord` so that `Query` is
/// structurally hashable and `Range` bounds are comparable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(OrderedFloat),
    String(String),
}

impl ScalarValue {
    /// Convert a `serde_json::Value` into a scalar predicate literal.
    ///
    /// Returns `None` for arrays/objects, which cannot appear as predicate
    /// literals.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(ScalarValue::Null),
            serde_json::Value::Bool(b) => Some(ScalarValue::Bool(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(ScalarValue::Int(i))
                } else {
                    n.as_f64().map(|f| ScalarValue::Float(OrderedFloat(f)))
                }
            }
            serde_json::Value::String(s) => Some(ScalarValue::String(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }
}

impl From<i64> for ScalarValue {
    fn from(v: i64) -> Self {
        ScalarValue::Int(v)
    }
}

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        ScalarValue::String(v.to_string())
    }
}

impl From<bool> for ScalarValue {
    fn from(v: bool) -> Self {
        ScalarValue::Bool(v)
    }
}

/// Total-order wrapper around `f64` so `ScalarValue` can derive `Eq`/`Ord`/`Hash`.
///
/// NaN sorts as equal to itself and greater than everything else; the
/// sample/profile data this engine consumes never legitimately contains
/// NaN, so this only needs to be total, not IEEE-754-faithful.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderedFloat(pub f64);

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OrderedFloat {}

impl std::hash::Hash for OrderedFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        if self.0.is_nan() {
            f64::NAN.to_bits().hash(state);
        } else {
            self.0.to_bits().hash(state);
        }
    }
}

impl PartialOrd for OrderedFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedFloat {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.0.partial_cmp(&other.0) {
            Some(ordering) => ordering,
            None => match (self.0.is_nan(), other.0.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => Ordering::Equal,
            },
        }
    }
}
