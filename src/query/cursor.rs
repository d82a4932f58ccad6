//! Cursor bounds and how they resolve against a query's ordering.

use crate::errors::{DbError, Result};
use crate::path::{DOCUMENT_ID, FieldPath};
use crate::snapshot::DocumentSnapshot;
use crate::value::Value;
use crate::wire;

use super::builder::Query;
use super::types::{Direction, Order};

#[derive(Debug, Clone, PartialEq)]
pub enum CursorSource {
    /// One value per order-by clause.
    Values(Vec<Value>),
    Snapshot(Box<DocumentSnapshot>),
}

/// A start or end bound. For a start bound `before` includes the boundary; for an end bound it
/// excludes it.
#[derive(Debug, Clone, PartialEq)]
pub struct Bound {
    pub source: CursorSource,
    pub before: bool,
}

impl Bound {
    #[must_use]
    pub const fn is_snapshot(&self) -> bool {
        matches!(self.source, CursorSource::Snapshot(_))
    }
}

impl Query {
    pub(crate) fn check_cursor_kinds(&self) -> Result<()> {
        match (&self.start, &self.end) {
            (Some(s), Some(e)) if s.is_snapshot() != e.is_snapshot() => Err(DbError::MixedCursorType),
            _ => Ok(()),
        }
    }

    fn uses_snapshot_cursor(&self) -> bool {
        [&self.start, &self.end].into_iter().flatten().any(Bound::is_snapshot)
    }

    /// Orders sent on the wire. A snapshot cursor needs the document name as the final
    /// tiebreak; it inherits the direction of the last explicit order.
    pub(crate) fn effective_orders(&self) -> Vec<Order> {
        let mut orders = self.orders.clone();
        if !self.uses_snapshot_cursor() || orders.iter().any(|o| o.field.is_document_id()) {
            return orders;
        }
        let direction = match orders.last() {
            Some(last) => last.direction,
            None => {
                if let Some(field) = self.first_inequality_field() {
                    orders.push(Order::new(field, Direction::Asc));
                }
                Direction::Asc
            }
        };
        orders.push(Order::new(FieldPath::document_id(), direction));
        orders
    }

    /// First field constrained by an inequality in the top-level conjunction.
    fn first_inequality_field(&self) -> Option<FieldPath> {
        fn walk(filters: &[super::EntityFilter]) -> Option<FieldPath> {
            filters.iter().find_map(|f| match f {
                super::EntityFilter::And(a) => walk(&a.filters),
                other => other.comparison().filter(|(_, op)| op.is_inequality()).map(|(p, _)| p),
            })
        }
        walk(&self.filters)
    }

    pub(crate) fn lower_bound(&self, bound: &Bound, orders: &[Order]) -> Result<wire::Cursor> {
        let values = match &bound.source {
            CursorSource::Values(vals) => {
                if vals.is_empty() {
                    return Err(DbError::InvalidCursor("cursor needs at least one value".into()));
                }
                if vals.len() > orders.len() {
                    return Err(DbError::InvalidCursor(format!(
                        "too many cursor values: {} values for {} order-by clauses",
                        vals.len(),
                        orders.len()
                    )));
                }
                vals.iter()
                    .zip(orders)
                    .map(|(v, o)| if o.field.is_document_id() { self.identity_value(v) } else { v.to_wire() })
                    .collect::<Result<Vec<_>>>()?
            }
            CursorSource::Snapshot(snap) => orders
                .iter()
                .map(|o| self.snapshot_value(snap, &o.field))
                .collect::<Result<Vec<_>>>()?,
        };
        Ok(wire::Cursor { values, before: bound.before })
    }

    fn snapshot_value(&self, snap: &DocumentSnapshot, field: &FieldPath) -> Result<Value> {
        if field.is_document_id() {
            self.check_scope(&snap.reference.path)?;
            return Ok(Value::Reference(snap.reference.path.clone()));
        }
        snap.value_at(field)
            .ok_or_else(|| {
                DbError::MissingField(format!("{field} in cursor document {}", snap.reference.path))
            })?
            .to_wire()
    }

    /// Resolves a cursor value used with the document-name order.
    fn identity_value(&self, v: &Value) -> Result<Value> {
        match v {
            Value::String(id) if self.all_descendants => {
                let segs = id.split('/').count();
                if id.is_empty() || segs % 2 != 0 || id.split('/').any(str::is_empty) {
                    return Err(DbError::InvalidValue(format!(
                        "collection group cursor on {DOCUMENT_ID} needs a document path with an even number of segments, got {id:?}"
                    )));
                }
                Ok(Value::Reference(format!("{}/{id}", self.parent_path)))
            }
            Value::String(id) => {
                if id.is_empty() || id.contains('/') {
                    return Err(DbError::InvalidValue(format!(
                        "cursor on {DOCUMENT_ID} needs a document id without '/', got {id:?}"
                    )));
                }
                Ok(Value::Reference(format!("{}/{id}", self.path)))
            }
            Value::Reference(r) => {
                self.check_scope(r)?;
                Ok(v.clone())
            }
            other => Err(DbError::InvalidValue(format!(
                "cursor on {DOCUMENT_ID} needs a document id or reference, got {}",
                other.type_name()
            ))),
        }
    }

    /// A document used with an ordinary query must be a direct child of the queried
    /// collection. Collection groups accept any depth.
    pub(crate) fn check_scope(&self, reference: &str) -> Result<()> {
        if self.all_descendants {
            return Ok(());
        }
        match reference.rsplit_once('/') {
            Some((parent, _)) if parent == self.path => Ok(()),
            _ => Err(DbError::ScopeMismatch { reference: reference.to_string(), query: self.path.clone() }),
        }
    }
}
