//! Lowering a [`Query`] to its wire form and raising it back.

use crate::devlog;
use crate::errors::{DbError, Result};
use crate::path::{DOCUMENT_ID, FieldPath};
use crate::value::Value;
use crate::wire::{
    self, CollectionSelector, CompositeOp, FieldReference, Projection, RunQueryRequest, StructuredQuery,
};

use super::builder::Query;
use super::cursor::{Bound, CursorSource};
use super::filter::EntityFilter;
use super::options::RunSettings;
use super::types::{FindNearest, FindNearestOptions, Order};

pub(crate) fn field_ref(fp: &FieldPath) -> Result<FieldReference> {
    fp.validate()?;
    Ok(FieldReference { field_path: fp.to_wire_string() })
}

impl Query {
    /// Validates the query and lowers it to a structured query.
    pub fn to_wire(&self) -> Result<StructuredQuery> {
        let res = self.lower();
        match &res {
            Ok(sq) => devlog!(
                "{{\"op\":\"to_wire\",\"collection\":{:?},\"all_descendants\":{},\"filters\":{},\"orders\":{},\"start\":{},\"end\":{},\"find_nearest\":{}}}",
                self.collection_id,
                self.all_descendants,
                self.filters.len(),
                sq.order_by.len(),
                sq.start_at.is_some(),
                sq.end_at.is_some(),
                sq.find_nearest.is_some()
            ),
            Err(e) => log::debug!("query on {:?} failed to translate: {e}", self.collection_id),
        }
        res
    }

    fn lower(&self) -> Result<StructuredQuery> {
        if let Some(e) = &self.err {
            return Err(e.clone());
        }
        if self.collection_id.is_empty() {
            return Err(DbError::MissingCollection);
        }
        let where_ = self.lower_filters()?;
        let select = match &self.selection {
            Some(paths) => Some(Projection { fields: paths.iter().map(field_ref).collect::<Result<_>>()? }),
            None => None,
        };
        self.orders.iter().try_for_each(|o| o.field.validate())?;

        self.check_cursor_kinds()?;
        let orders = self.effective_orders();
        let order_by = orders
            .iter()
            .map(|o| Ok(wire::Order { field: field_ref(&o.field)?, direction: o.direction }))
            .collect::<Result<Vec<_>>>()?;
        let start_at = self.start.as_ref().map(|b| self.lower_bound(b, &orders)).transpose()?;
        let end_at = self.end.as_ref().map(|b| self.lower_bound(b, &orders)).transpose()?;

        let find_nearest = match &self.find_nearest {
            Some(fnq) => {
                if !self.orders.is_empty() || self.start.is_some() || self.end.is_some() {
                    return Err(DbError::InvalidArgument(
                        "find_nearest cannot be combined with order_by or cursors".into(),
                    ));
                }
                Some(lower_find_nearest(fnq)?)
            }
            None => None,
        };

        Ok(StructuredQuery {
            select,
            from: vec![CollectionSelector {
                collection_id: self.collection_id.clone(),
                all_descendants: self.all_descendants,
            }],
            where_,
            order_by,
            start_at,
            end_at,
            offset: self.offset,
            limit: self.limit,
            find_nearest,
        })
    }

    fn lower_filters(&self) -> Result<Option<wire::Filter>> {
        let lowered = match self.filters.as_slice() {
            [] => return Ok(None),
            [only] => only.to_wire()?,
            many => wire::Filter::CompositeFilter(wire::CompositeFilter {
                op: CompositeOp::And,
                filters: many.iter().map(EntityFilter::to_wire).collect::<Result<_>>()?,
            }),
        };
        self.check_filter_scope(&lowered)?;
        Ok(Some(lowered))
    }

    /// Document references compared against the name field must be in scope.
    fn check_filter_scope(&self, f: &wire::Filter) -> Result<()> {
        match f {
            wire::Filter::CompositeFilter(c) => c.filters.iter().try_for_each(|f| self.check_filter_scope(f)),
            wire::Filter::FieldFilter(ff) if ff.field.field_path == DOCUMENT_ID => {
                match &ff.value {
                    Value::Reference(r) => self.check_scope(r),
                    Value::Array(items) => items.iter().try_for_each(|v| match v {
                        Value::Reference(r) => self.check_scope(r),
                        _ => Ok(()),
                    }),
                    _ => Ok(()),
                }
            }
            _ => Ok(()),
        }
    }

    /// The full request, including the parent resource and run options.
    pub fn to_run_request(&self) -> Result<RunQueryRequest> {
        Ok(RunQueryRequest {
            parent: self.parent_path.clone(),
            structured_query: self.to_wire()?,
            explain_options: self.run_settings.explain,
        })
    }

    /// JSON encoding of [`to_run_request`](Self::to_run_request).
    pub fn serialize(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.to_run_request()?)?)
    }

    /// Inverse of [`serialize`](Self::serialize).
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let req: RunQueryRequest = serde_json::from_slice(bytes)?;
        Self::from_run_request(req)
    }

    /// Rebuilds a query from a run request. Snapshot cursors come back as literal values with
    /// the orders they were resolved against.
    pub fn from_run_request(req: RunQueryRequest) -> Result<Self> {
        let sq = req.structured_query;
        let [selector] = <[CollectionSelector; 1]>::try_from(sq.from).map_err(|from| {
            DbError::InvalidArgument(format!("expected exactly one collection selector, got {}", from.len()))
        })?;
        let mut q = Self::new(&req.parent, &selector.collection_id, selector.all_descendants);

        q.selection = sq
            .select
            .map(|p| p.fields.iter().map(|f| FieldPath::from_wire_string(&f.field_path)).collect::<Result<Vec<_>>>())
            .transpose()?;
        q.filters = sq.where_.map(EntityFilter::from_wire).transpose()?.into_iter().collect();
        q.orders = sq
            .order_by
            .into_iter()
            .map(|o| Ok(Order::new(FieldPath::from_wire_string(&o.field.field_path)?, o.direction)))
            .collect::<Result<_>>()?;
        q.offset = sq.offset;
        q.limit = sq.limit;
        q.start = sq.start_at.map(raise_cursor);
        q.end = sq.end_at.map(raise_cursor);
        q.find_nearest = sq.find_nearest.map(raise_find_nearest).transpose()?;
        q.run_settings = RunSettings { explain: req.explain_options };
        Ok(q)
    }
}

fn lower_find_nearest(f: &FindNearest) -> Result<wire::FindNearest> {
    Ok(wire::FindNearest {
        vector_field: field_ref(&f.vector_field)?,
        query_vector: Value::Vector(f.query_vector.clone()).to_wire()?,
        distance_measure: f.distance_measure,
        limit: f.limit,
        distance_result_field: f.options.distance_result_field.clone(),
        distance_threshold: f.options.distance_threshold,
    })
}

fn raise_find_nearest(f: wire::FindNearest) -> Result<FindNearest> {
    let Value::Vector(query_vector) = f.query_vector.from_wire() else {
        return Err(DbError::InvalidValue("find_nearest query vector is not a vector value".into()));
    };
    Ok(FindNearest {
        vector_field: FieldPath::from_wire_string(&f.vector_field.field_path)?,
        query_vector,
        limit: f.limit,
        distance_measure: f.distance_measure,
        options: FindNearestOptions {
            distance_result_field: f.distance_result_field,
            distance_threshold: f.distance_threshold,
        },
    })
}

fn raise_cursor(c: wire::Cursor) -> Bound {
    Bound {
        source: CursorSource::Values(c.values.into_iter().map(Value::from_wire).collect()),
        before: c.before,
    }
}
