mod encode;
mod order;

pub use encode::{encode, encode_entity, timestamp};
pub use order::{compare_values, type_rank};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::{DbError, Result};

/// Map key that marks a map as a typed value on the wire.
pub const TYPE_KEY: &str = "__type__";
/// Type tag carried by vector values.
pub const VECTOR_TYPE: &str = "__vector__";
/// Map key holding the payload of a typed value.
pub const VALUE_KEY: &str = "value";

/// Write-only markers. Valid in mutations, rejected in any read context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentinel {
    ServerTimestamp,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// A dense embedding used by vector search.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector(pub Vec<f64>);

impl From<Vec<f64>> for Vector {
    fn from(v: Vec<f64>) -> Self {
        Self(v)
    }
}

impl From<Vec<f32>> for Vector {
    fn from(v: Vec<f32>) -> Self {
        Self(v.into_iter().map(f64::from).collect())
    }
}

impl From<&[f64]> for Vector {
    fn from(v: &[f64]) -> Self {
        Self(v.to_vec())
    }
}

impl From<&[f32]> for Vector {
    fn from(v: &[f32]) -> Self {
        Self(v.iter().copied().map(f64::from).collect())
    }
}

impl<const N: usize> From<[f64; N]> for Vector {
    fn from(v: [f64; N]) -> Self {
        Self(v.to_vec())
    }
}

impl<const N: usize> From<[f32; N]> for Vector {
    fn from(v: [f32; N]) -> Self {
        Self(v.iter().copied().map(f64::from).collect())
    }
}

/// A document value, tagged by type.
///
/// The same type is used for application-supplied values and for wire values; the only
/// difference is that wire values never carry a [`Sentinel`] and carry vectors as tagged maps
/// (see [`Value::to_wire`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    #[serde(with = "double")]
    Double(f64),
    Timestamp(DateTime<Utc>),
    String(String),
    Bytes(Vec<u8>),
    Reference(String),
    GeoPoint(GeoPoint),
    Array(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Vector(Vec<f64>),
    Sentinel(Sentinel),
}

impl Value {
    #[must_use]
    pub fn bytes(b: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(b.into())
    }

    #[must_use]
    pub fn reference(path: impl Into<String>) -> Self {
        Self::Reference(path.into())
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn is_nan(&self) -> bool {
        matches!(self, Self::Double(d) if d.is_nan())
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Double(_) => "double",
            Self::Timestamp(_) => "timestamp",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Reference(_) => "reference",
            Self::GeoPoint(_) => "geo point",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
            Self::Vector(_) => "vector",
            Self::Sentinel(_) => "sentinel",
        }
    }

    /// True if this value or anything nested in it is a write-only sentinel.
    #[must_use]
    pub fn contains_sentinel(&self) -> bool {
        match self {
            Self::Sentinel(_) => true,
            Self::Array(vs) => vs.iter().any(Self::contains_sentinel),
            Self::Map(m) => m.values().any(Self::contains_sentinel),
            _ => false,
        }
    }

    /// Lowers a value for use in a read request: sentinels are rejected and vectors are tagged.
    pub fn to_wire(&self) -> Result<Self> {
        Ok(match self {
            Self::Sentinel(s) => {
                return Err(DbError::InvalidValue(format!(
                    "{s:?} sentinel is only valid in writes"
                )));
            }
            Self::Vector(v) => vector_to_wire(v),
            Self::Array(vs) => Self::Array(vs.iter().map(Self::to_wire).collect::<Result<_>>()?),
            Self::Map(m) => Self::Map(
                m.iter().map(|(k, v)| Ok((k.clone(), v.to_wire()?))).collect::<Result<_>>()?,
            ),
            other => other.clone(),
        })
    }

    /// Raises a wire value: tagged vector maps become [`Value::Vector`].
    #[must_use]
    pub fn from_wire(self) -> Self {
        match self {
            Self::Map(m) => match vector_from_wire_map(&m) {
                Some(v) => Self::Vector(v),
                None => Self::Map(m.into_iter().map(|(k, v)| (k, v.from_wire())).collect()),
            },
            Self::Array(vs) => Self::Array(vs.into_iter().map(Self::from_wire).collect()),
            other => other,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

fn vector_to_wire(v: &[f64]) -> Value {
    let mut m = BTreeMap::new();
    m.insert(TYPE_KEY.to_string(), Value::String(VECTOR_TYPE.to_string()));
    m.insert(VALUE_KEY.to_string(), Value::Array(v.iter().map(|d| Value::Double(*d)).collect()));
    Value::Map(m)
}

fn vector_from_wire_map(m: &BTreeMap<String, Value>) -> Option<Vec<f64>> {
    if m.len() != 2 || m.get(TYPE_KEY)?.as_str()? != VECTOR_TYPE {
        return None;
    }
    let Value::Array(items) = m.get(VALUE_KEY)? else {
        return None;
    };
    items
        .iter()
        .map(|v| match v {
            Value::Double(d) => Some(*d),
            #[allow(clippy::cast_precision_loss)]
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        })
        .collect()
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Double(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

impl From<GeoPoint> for Value {
    fn from(v: GeoPoint) -> Self {
        Self::GeoPoint(v)
    }
}

impl From<Sentinel> for Value {
    fn from(v: Sentinel) -> Self {
        Self::Sentinel(v)
    }
}

impl From<Vector> for Value {
    fn from(v: Vector) -> Self {
        Self::Vector(v.0)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>> From<BTreeMap<String, T>> for Value {
    fn from(v: BTreeMap<String, T>) -> Self {
        Self::Map(v.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

/// Builds a [`Value::Map`] from `key => value` pairs.
#[macro_export]
macro_rules! map_value {
    ($($k:expr => $v:expr),* $(,)?) => {{
        let mut __m = std::collections::BTreeMap::<String, $crate::value::Value>::new();
        $( __m.insert(String::from($k), $crate::value::Value::from($v)); )*
        $crate::value::Value::Map(__m)
    }};
}

/// Doubles as JSON numbers, with the non-finite values spelled out as strings since JSON
/// has no literal for them.
mod double {
    use std::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    const NAN: &str = "NaN";
    const INFINITY: &str = "Infinity";
    const NEG_INFINITY: &str = "-Infinity";

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
        if v.is_nan() {
            s.serialize_str(NAN)
        } else if v.is_infinite() {
            s.serialize_str(if v.is_sign_positive() { INFINITY } else { NEG_INFINITY })
        } else {
            s.serialize_f64(*v)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        d.deserialize_any(DoubleVisitor)
    }

    struct DoubleVisitor;

    impl Visitor<'_> for DoubleVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "a number or one of \"{NAN}\", \"{INFINITY}\", \"{NEG_INFINITY}\"")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(v)
        }

        #[allow(clippy::cast_precision_loss)]
        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        #[allow(clippy::cast_precision_loss)]
        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
            match v {
                NAN => Ok(f64::NAN),
                INFINITY => Ok(f64::INFINITY),
                NEG_INFINITY => Ok(f64::NEG_INFINITY),
                other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
            }
        }
    }
}
