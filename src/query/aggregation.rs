use std::collections::BTreeMap;

use crate::dispatch::QueryDispatcher;
use crate::errors::{DbError, Result};
use crate::path::FieldPath;
use crate::value::Value;
use crate::wire::{Aggregation, AggregationOp, RunAggregationQueryRequest, StructuredAggregationQuery};

use super::builder::Query;
use super::translate::field_ref;

/// Aggregations computed over the results of a query.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationQuery {
    query: Query,
    aggregations: Vec<Aggregation>,
    err: Option<DbError>,
}

impl Query {
    #[must_use]
    pub fn aggregation(&self) -> AggregationQuery {
        AggregationQuery { query: self.clone(), aggregations: Vec::new(), err: None }
    }
}

impl AggregationQuery {
    fn push<F>(&self, alias: &str, op: F) -> Self
    where
        F: FnOnce() -> Result<AggregationOp>,
    {
        let mut a = self.clone();
        if a.err.is_some() {
            return a;
        }
        let res = if alias.is_empty() {
            Err(DbError::InvalidArgument("aggregation alias must not be empty".into()))
        } else if a.aggregations.iter().any(|x| x.alias == alias) {
            Err(DbError::InvalidArgument(format!("duplicate aggregation alias {alias:?}")))
        } else {
            op()
        };
        match res {
            Ok(op) => a.aggregations.push(Aggregation { alias: alias.to_string(), op }),
            Err(e) => {
                log::debug!("aggregation {alias:?}: {e}");
                a.err = Some(e);
            }
        }
        a
    }

    #[must_use]
    pub fn with_count(&self, alias: &str) -> Self {
        self.push(alias, || Ok(AggregationOp::Count { up_to: None }))
    }

    #[must_use]
    pub fn with_sum(&self, path: &str, alias: &str) -> Self {
        self.push(alias, || Ok(AggregationOp::Sum { field: field_ref(&FieldPath::parse(path)?)? }))
    }

    #[must_use]
    pub fn with_sum_path(&self, path: impl Into<FieldPath>, alias: &str) -> Self {
        let fp = path.into();
        self.push(alias, || Ok(AggregationOp::Sum { field: field_ref(&fp)? }))
    }

    #[must_use]
    pub fn with_avg(&self, path: &str, alias: &str) -> Self {
        self.push(alias, || Ok(AggregationOp::Avg { field: field_ref(&FieldPath::parse(path)?)? }))
    }

    #[must_use]
    pub fn with_avg_path(&self, path: impl Into<FieldPath>, alias: &str) -> Self {
        let fp = path.into();
        self.push(alias, || Ok(AggregationOp::Avg { field: field_ref(&fp)? }))
    }

    pub fn to_wire(&self) -> Result<RunAggregationQueryRequest> {
        if let Some(e) = &self.err {
            return Err(e.clone());
        }
        if self.aggregations.is_empty() {
            return Err(DbError::InvalidArgument("aggregation query has no aggregations".into()));
        }
        Ok(RunAggregationQueryRequest {
            parent: self.query.parent_path.clone(),
            structured_aggregation_query: StructuredAggregationQuery {
                structured_query: self.query.to_wire()?,
                aggregations: self.aggregations.clone(),
            },
            explain_options: self.query.run_settings.explain,
        })
    }

    /// Runs the aggregation, returning each alias's value.
    pub fn get<D: QueryDispatcher + ?Sized>(&self, dispatcher: &D) -> Result<BTreeMap<String, Value>> {
        let req = self.to_wire()?;
        let res = dispatcher.run_aggregation(&req)?;
        Ok(res.into_iter().map(|(k, v)| (k, v.from_wire())).collect())
    }
}
