//! Bridge from application types to [`Value`], built on `bson`'s serde serializer.

use bson::Bson;
use chrono::DateTime;
use serde::Serialize;
use std::collections::BTreeMap;

use super::Value;
use crate::errors::{DbError, Result};

/// Serde helper for `DateTime<Utc>` fields of entity structs. chrono's own `Serialize`
/// writes an RFC 3339 string; tag the field with
/// `#[serde(with = "docwire::value::timestamp")]` to store it as a [`Value::Timestamp`].
pub use bson::serde_helpers::chrono_datetime_as_bson_datetime as timestamp;

/// Encodes any serializable application value.
pub fn encode<T: Serialize + ?Sized>(src: &T) -> Result<Value> {
    let b = bson::to_bson(src)?;
    Value::try_from(b)
}

/// Encodes an application struct (or map) into the property map of an entity.
pub fn encode_entity<T: Serialize + ?Sized>(src: &T) -> Result<BTreeMap<String, Value>> {
    match encode(src)? {
        Value::Map(m) => Ok(m),
        other => Err(DbError::Encoding(format!(
            "entity source must encode to a map, got {}",
            other.type_name()
        ))),
    }
}

impl Value {
    /// See [`encode`].
    pub fn encode<T: Serialize + ?Sized>(src: &T) -> Result<Self> {
        encode(src)
    }
}

impl TryFrom<Bson> for Value {
    type Error = DbError;

    fn try_from(b: Bson) -> Result<Self> {
        Ok(match b {
            Bson::Null | Bson::Undefined => Self::Null,
            Bson::Boolean(v) => Self::Boolean(v),
            Bson::Int32(v) => Self::Integer(i64::from(v)),
            Bson::Int64(v) => Self::Integer(v),
            Bson::Double(v) => Self::Double(v),
            Bson::String(v) | Bson::Symbol(v) => Self::String(v),
            Bson::ObjectId(oid) => Self::String(oid.to_hex()),
            Bson::Binary(bin) => Self::Bytes(bin.bytes),
            Bson::DateTime(dt) => {
                let ms = dt.timestamp_millis();
                Self::Timestamp(DateTime::from_timestamp_millis(ms).ok_or_else(|| {
                    DbError::Encoding(format!("timestamp out of range: {ms}ms"))
                })?)
            }
            Bson::Array(items) => {
                Self::Array(items.into_iter().map(Self::try_from).collect::<Result<_>>()?)
            }
            Bson::Document(doc) => Self::Map(
                doc.into_iter().map(|(k, v)| Ok((k, Self::try_from(v)?))).collect::<Result<_>>()?,
            ),
            other => {
                return Err(DbError::Encoding(format!(
                    "unsupported bson type {:?}",
                    other.element_type()
                )));
            }
        })
    }
}
