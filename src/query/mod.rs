mod aggregation;
mod builder;
mod compare;
mod cursor;
mod filter;
mod options;
mod translate;
mod types;

pub use aggregation::AggregationQuery;
pub use builder::Query;
pub use cursor::{Bound, CursorSource};
pub use filter::{AndFilter, EntityFilter, Operator, OrFilter, PropertyFilter, PropertyPathFilter};
pub use options::{ExplainOptions, RunOption, RunSettings};
pub use types::{Direction, DistanceMeasure, FindNearest, FindNearestOptions, Order};
