//! Client-side ordering of fetched documents, consistent with server result order.

use std::borrow::Cow;
use std::cmp::Ordering;

use crate::errors::{DbError, Result};
use crate::path::FieldPath;
use crate::snapshot::DocumentSnapshot;
use crate::value::{Value, compare_values};

use super::builder::Query;
use super::types::{Direction, Order};

impl Query {
    /// Orders the comparator applies: the explicit orders followed by the document name in
    /// the direction of the last order, or the document name ascending when there are none.
    fn comparator_orders(&self) -> Vec<Order> {
        let mut orders = self.orders.clone();
        if !orders.iter().any(|o| o.field.is_document_id()) {
            let direction = orders.last().map_or(Direction::Asc, |o| o.direction);
            orders.push(Order::new(FieldPath::document_id(), direction));
        }
        orders
    }

    /// Comparator over documents following this query's ordering. Fails with
    /// [`DbError::MissingField`] when either document lacks an order-by field.
    pub fn compare_func(
        &self,
    ) -> impl Fn(&DocumentSnapshot, &DocumentSnapshot) -> Result<Ordering> + Send + Sync + use<> {
        let orders = self.comparator_orders();
        move |a, b| compare_by_orders(&orders, a, b)
    }

    /// Sorts `docs` in place by this query's ordering.
    pub fn sort_documents(&self, docs: &mut [DocumentSnapshot]) -> Result<()> {
        let orders = self.comparator_orders();
        // Check up front so the sort itself never sees a failing comparison.
        for d in docs.iter() {
            for o in &orders {
                order_value(d, &o.field)?;
            }
        }
        docs.sort_by(|a, b| compare_by_orders(&orders, a, b).unwrap_or(Ordering::Equal));
        Ok(())
    }
}

pub(crate) fn compare_by_orders(orders: &[Order], a: &DocumentSnapshot, b: &DocumentSnapshot) -> Result<Ordering> {
    for o in orders {
        let va = order_value(a, &o.field)?;
        let vb = order_value(b, &o.field)?;
        let c = compare_values(&va, &vb);
        let c = match o.direction {
            Direction::Asc => c,
            Direction::Desc => c.reverse(),
        };
        if c.is_ne() {
            return Ok(c);
        }
    }
    Ok(Ordering::Equal)
}

fn order_value<'a>(d: &'a DocumentSnapshot, field: &FieldPath) -> Result<Cow<'a, Value>> {
    if field.is_document_id() {
        return Ok(Cow::Owned(Value::Reference(d.reference.path.clone())));
    }
    d.value_at(field)
        .map(Cow::Borrowed)
        .ok_or_else(|| DbError::MissingField(format!("{field} in document {}", d.reference.path)))
}
