//! The immutable query value and its chainable builder methods.
//!
//! Every method takes `&self` and returns a modified copy. An invalid argument is recorded as a
//! sticky error on the returned query; later calls pass it through untouched and translation
//! reports it.

use crate::errors::{DbError, Result};
use crate::path::FieldPath;
use crate::snapshot::DocumentSnapshot;
use crate::value::{Value, Vector};

use super::cursor::{Bound, CursorSource};
use super::filter::{EntityFilter, PropertyFilter, PropertyPathFilter};
use super::options::{RunOption, RunSettings};
use super::types::{Direction, DistanceMeasure, FindNearest, FindNearestOptions, Order};

/// A query over one collection, or over a collection group.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    pub(crate) parent_path: String,
    pub(crate) path: String,
    pub(crate) collection_id: String,
    pub(crate) all_descendants: bool,
    pub(crate) selection: Option<Vec<FieldPath>>,
    /// Conjuncts; more than one lowers to an AND.
    pub(crate) filters: Vec<EntityFilter>,
    pub(crate) orders: Vec<Order>,
    pub(crate) offset: i32,
    pub(crate) limit: Option<i32>,
    pub(crate) start: Option<Bound>,
    pub(crate) end: Option<Bound>,
    pub(crate) find_nearest: Option<FindNearest>,
    pub(crate) run_settings: RunSettings,
    pub(crate) err: Option<DbError>,
}

impl Query {
    pub(crate) fn new(parent_path: &str, collection_id: &str, all_descendants: bool) -> Self {
        Self {
            parent_path: parent_path.to_string(),
            path: format!("{parent_path}/{collection_id}"),
            collection_id: collection_id.to_string(),
            all_descendants,
            ..Self::default()
        }
    }

    pub(crate) fn with_error(mut self, e: DbError) -> Self {
        if self.err.is_none() {
            self.err = Some(e);
        }
        self
    }

    /// Copies the query and applies `f` unless an error is already recorded.
    fn derive<F>(&self, f: F) -> Self
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let mut q = self.clone();
        if q.err.is_some() {
            return q;
        }
        if let Err(e) = f(&mut q) {
            log::debug!("query on {:?}: {e}", q.collection_id);
            q.err = Some(e);
        }
        q
    }

    #[must_use]
    pub fn collection_id(&self) -> &str {
        &self.collection_id
    }

    /// Full name of the queried collection. For collection groups this is informational only.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn parent_path(&self) -> &str {
        &self.parent_path
    }

    #[must_use]
    pub const fn is_collection_group(&self) -> bool {
        self.all_descendants
    }

    /// The recorded sticky error, if any.
    #[must_use]
    pub const fn err(&self) -> Option<&DbError> {
        self.err.as_ref()
    }

    /// Projects the given dotted paths. An empty list projects only the document name.
    /// Replaces any earlier selection.
    #[must_use]
    pub fn select<S: AsRef<str>>(&self, fields: &[S]) -> Self {
        self.derive(|q| {
            let paths = fields.iter().map(|f| FieldPath::parse(f.as_ref())).collect::<Result<Vec<_>>>()?;
            q.set_selection(paths);
            Ok(())
        })
    }

    /// Like [`select`](Self::select) for pre-split paths; validated at translation.
    #[must_use]
    pub fn select_paths(&self, paths: Vec<FieldPath>) -> Self {
        self.derive(|q| {
            q.set_selection(paths);
            Ok(())
        })
    }

    fn set_selection(&mut self, paths: Vec<FieldPath>) {
        self.selection = Some(if paths.is_empty() { vec![FieldPath::document_id()] } else { paths });
    }

    /// Adds `path op value` to the conjunction of filters. The operator is checked at
    /// translation.
    #[must_use]
    pub fn where_(&self, path: &str, op: &str, value: impl Into<Value>) -> Self {
        let f = PropertyFilter::new(path, op, value);
        self.derive(|q| {
            q.filters.push(f.into());
            Ok(())
        })
    }

    #[must_use]
    pub fn where_path(&self, path: impl Into<FieldPath>, op: &str, value: impl Into<Value>) -> Self {
        let f = PropertyPathFilter::new(path, op, value);
        self.derive(|q| {
            q.filters.push(f.into());
            Ok(())
        })
    }

    /// Replaces all filters with `filter`.
    #[must_use]
    pub fn where_entity(&self, filter: impl Into<EntityFilter>) -> Self {
        let f = filter.into();
        self.derive(|q| {
            q.filters = vec![f];
            Ok(())
        })
    }

    #[must_use]
    pub fn order_by(&self, path: &str, direction: Direction) -> Self {
        self.derive(|q| {
            q.orders.push(Order::new(FieldPath::parse(path)?, direction));
            Ok(())
        })
    }

    #[must_use]
    pub fn order_by_path(&self, path: impl Into<FieldPath>, direction: Direction) -> Self {
        let fp = path.into();
        self.derive(|q| {
            q.orders.push(Order::new(fp, direction));
            Ok(())
        })
    }

    #[must_use]
    pub fn offset(&self, n: i32) -> Self {
        self.derive(|q| {
            if n < 0 {
                return Err(DbError::InvalidArgument(format!("offset must be non-negative, got {n}")));
            }
            q.offset = n;
            Ok(())
        })
    }

    #[must_use]
    pub fn limit(&self, n: i32) -> Self {
        self.derive(|q| {
            if n < 0 {
                return Err(DbError::InvalidArgument(format!("limit must be non-negative, got {n}")));
            }
            q.limit = Some(n);
            Ok(())
        })
    }

    /// Starts at the given values, one per order-by clause, inclusive.
    #[must_use]
    pub fn start_at<I, V>(&self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.set_start(values_source(values), true)
    }

    #[must_use]
    pub fn start_after<I, V>(&self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.set_start(values_source(values), false)
    }

    #[must_use]
    pub fn end_at<I, V>(&self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.set_end(values_source(values), false)
    }

    #[must_use]
    pub fn end_before<I, V>(&self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.set_end(values_source(values), true)
    }

    /// Starts at `snap`, using its values for every order-by clause plus its name.
    #[must_use]
    pub fn start_at_snapshot(&self, snap: &DocumentSnapshot) -> Self {
        self.set_start(snapshot_source(snap), true)
    }

    #[must_use]
    pub fn start_after_snapshot(&self, snap: &DocumentSnapshot) -> Self {
        self.set_start(snapshot_source(snap), false)
    }

    #[must_use]
    pub fn end_at_snapshot(&self, snap: &DocumentSnapshot) -> Self {
        self.set_end(snapshot_source(snap), false)
    }

    #[must_use]
    pub fn end_before_snapshot(&self, snap: &DocumentSnapshot) -> Self {
        self.set_end(snapshot_source(snap), true)
    }

    fn set_start(&self, source: CursorSource, before: bool) -> Self {
        self.derive(|q| {
            q.start = Some(Bound { source, before });
            Ok(())
        })
    }

    fn set_end(&self, source: CursorSource, before: bool) -> Self {
        self.derive(|q| {
            q.end = Some(Bound { source, before });
            Ok(())
        })
    }

    /// Returns the `k` documents whose `vector_field` is nearest to `vector`.
    #[must_use]
    pub fn find_nearest(
        &self,
        vector_field: &str,
        vector: impl Into<Vector>,
        k: i32,
        measure: DistanceMeasure,
        options: Option<FindNearestOptions>,
    ) -> Self {
        match FieldPath::parse(vector_field) {
            Ok(fp) => self.find_nearest_path(fp, vector, k, measure, options),
            Err(e) => self.derive(|_| Err(e)),
        }
    }

    #[must_use]
    pub fn find_nearest_path(
        &self,
        vector_field: impl Into<FieldPath>,
        vector: impl Into<Vector>,
        k: i32,
        measure: DistanceMeasure,
        options: Option<FindNearestOptions>,
    ) -> Self {
        let vector_field = vector_field.into();
        let query_vector = vector.into().0;
        self.derive(|q| {
            if k <= 0 {
                return Err(DbError::InvalidArgument(format!("find_nearest limit must be positive, got {k}")));
            }
            vector_field.validate()?;
            q.find_nearest = Some(FindNearest {
                vector_field,
                query_vector,
                limit: k,
                distance_measure: measure,
                options: options.unwrap_or_default(),
            });
            Ok(())
        })
    }

    /// Attaches execution options. Each option kind may be given once over the life of the
    /// query; a `None` entry is rejected.
    #[must_use]
    pub fn with_run_options<I>(&self, opts: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<RunOption>>,
    {
        self.derive(|q| opts.into_iter().try_for_each(|o| q.run_settings.apply(o.into())))
    }
}

fn values_source<I, V>(values: I) -> CursorSource
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    CursorSource::Values(values.into_iter().map(Into::into).collect())
}

fn snapshot_source(snap: &DocumentSnapshot) -> CursorSource {
    CursorSource::Snapshot(Box::new(snap.clone()))
}
