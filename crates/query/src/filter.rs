//! Filter value model.
//!
//! Classification happens once, at the deserialization boundary: every
//! incoming value is tagged as a scalar, a range object, or unrecognized.
//! Downstream code dispatches on the tag and never re-inspects raw JSON.

use core::cmp::Ordering;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// A single bindable value.
///
/// Filter input only ever produces `Bool`/`Int`/`Float`/`Text`; the `Uuid`
/// variant exists for the owner-scope predicate, which is built internally.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Uuid(Uuid),
}

impl Scalar {
    /// Classify a JSON value as a scalar, if it is one.
    pub fn classify(value: &JsonValue) -> Option<Scalar> {
        match value {
            JsonValue::Bool(b) => Some(Scalar::Bool(*b)),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Scalar::Int(i))
                } else {
                    n.as_f64().map(Scalar::Float)
                }
            }
            JsonValue::String(s) => Some(Scalar::Text(s.clone())),
            _ => None,
        }
    }

    /// Compare two scalars, coercing `Int`/`Float` numerically.
    ///
    /// Mismatched kinds are incomparable (`None`); `Uuid` only ever compares
    /// equal or not.
    pub fn compare(&self, other: &Scalar) -> Option<Ordering> {
        match (self, other) {
            (Scalar::Bool(a), Scalar::Bool(b)) => Some(a.cmp(b)),
            (Scalar::Int(a), Scalar::Int(b)) => Some(a.cmp(b)),
            (Scalar::Float(a), Scalar::Float(b)) => a.partial_cmp(b),
            (Scalar::Int(a), Scalar::Float(b)) => (*a as f64).partial_cmp(b),
            (Scalar::Float(a), Scalar::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Scalar::Text(a), Scalar::Text(b)) => Some(a.cmp(b)),
            (Scalar::Uuid(a), Scalar::Uuid(b)) => (a == b).then_some(Ordering::Equal),
            _ => None,
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<Uuid> for Scalar {
    fn from(value: Uuid) -> Self {
        Scalar::Uuid(value)
    }
}

/// A range restriction on one field: either bound, both, or neither.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeSpec {
    pub gte: Option<Scalar>,
    pub lte: Option<Scalar>,
}

impl RangeSpec {
    pub fn is_empty(&self) -> bool {
        self.gte.is_none() && self.lte.is_none()
    }
}

/// A filter entry's value, tagged by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Plain scalar: equality restriction.
    Scalar(Scalar),
    /// Range object: `gte`/`lte` restrictions.
    Range(RangeSpec),
    /// Anything else. Ignored by the condition builder (lenient policy).
    Unrecognized,
}

impl FilterValue {
    /// Tag a raw JSON value. This is the single classification point.
    ///
    /// An object is a range; its recognized sub-keys are `gte` and `lte`,
    /// and a sub-key whose value is not a scalar counts as absent. Arrays
    /// and nulls are unrecognized.
    pub fn classify(value: &JsonValue) -> FilterValue {
        if let Some(scalar) = Scalar::classify(value) {
            return FilterValue::Scalar(scalar);
        }
        match value {
            JsonValue::Object(map) => FilterValue::Range(RangeSpec {
                gte: map.get("gte").and_then(Scalar::classify),
                lte: map.get("lte").and_then(Scalar::classify),
            }),
            _ => FilterValue::Unrecognized,
        }
    }
}

impl<'de> Deserialize<'de> for FilterValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = JsonValue::deserialize(deserializer)?;
        Ok(FilterValue::classify(&raw))
    }
}

/// An ordered filter object: snake_case keys mapped to tagged values.
///
/// Entry order is the caller's input order and is preserved, so condition
/// emission is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    fields: Vec<(String, FilterValue)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry (builder-style; used by callers constructing filters
    /// in code rather than deserializing them).
    pub fn with(mut self, key: impl Into<String>, value: FilterValue) -> Self {
        self.fields.push((key.into(), value));
        self
    }

    /// Convenience: append a scalar equality entry.
    pub fn with_eq(self, key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.with(key, FilterValue::Scalar(value.into()))
    }

    /// Convenience: append a range entry.
    pub fn with_range(
        self,
        key: impl Into<String>,
        gte: Option<Scalar>,
        lte: Option<Scalar>,
    ) -> Self {
        self.with(key, FilterValue::Range(RangeSpec { gte, lte }))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<'de> Deserialize<'de> for Filter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FilterVisitor;

        impl<'de> Visitor<'de> for FilterVisitor {
            type Value = Filter;

            fn expecting(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str("a map of filter keys to scalar or range values")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut fields = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, FilterValue>()? {
                    fields.push((key, value));
                }
                Ok(Filter { fields })
            }
        }

        deserializer.deserialize_map(FilterVisitor)
    }
}
