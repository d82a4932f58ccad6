use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::errors::Result;
use crate::path::FieldPath;
use crate::reference::DocumentRef;
use crate::value::Value;
use crate::wire;

/// The contents of a document as of some read time.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    pub reference: DocumentRef,
    pub fields: BTreeMap<String, Value>,
    pub create_time: Option<DateTime<Utc>>,
    pub update_time: Option<DateTime<Utc>>,
    pub read_time: Option<DateTime<Utc>>,
}

impl DocumentSnapshot {
    #[must_use]
    pub const fn new(reference: DocumentRef, fields: BTreeMap<String, Value>) -> Self {
        Self { reference, fields, create_time: None, update_time: None, read_time: None }
    }

    /// Builds a snapshot from a wire document, raising tagged values.
    pub fn from_wire(doc: wire::Document, read_time: Option<DateTime<Utc>>) -> Result<Self> {
        Ok(Self {
            reference: DocumentRef::from_path(&doc.name)?,
            fields: doc.fields.into_iter().map(|(k, v)| (k, v.from_wire())).collect(),
            create_time: doc.create_time,
            update_time: doc.update_time,
            read_time,
        })
    }

    /// Value at a nested path, descending through maps.
    #[must_use]
    pub fn value_at(&self, path: &FieldPath) -> Option<&Value> {
        let (first, rest) = path.segments().split_first()?;
        let mut cur = self.fields.get(first)?;
        for seg in rest {
            match cur {
                Value::Map(m) => cur = m.get(seg)?,
                _ => return None,
            }
        }
        Some(cur)
    }

    /// [`value_at`](Self::value_at) for a dotted path.
    pub fn get(&self, dotted: &str) -> Result<Option<&Value>> {
        let fp = FieldPath::parse(dotted)?;
        Ok(self.value_at(&fp))
    }
}
