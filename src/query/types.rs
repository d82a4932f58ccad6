use serde::{Deserialize, Serialize};

use crate::path::FieldPath;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "ASCENDING")]
    Asc,
    #[serde(rename = "DESCENDING")]
    Desc,
}

/// One order-by clause.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Order {
    pub field: FieldPath,
    pub direction: Direction,
}

impl Order {
    #[must_use]
    pub const fn new(field: FieldPath, direction: Direction) -> Self {
        Self { field, direction }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DistanceMeasure {
    Euclidean,
    Cosine,
    DotProduct,
}

/// Optional knobs for vector search.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FindNearestOptions {
    /// Output field that receives the computed distance.
    pub distance_result_field: Option<String>,
    /// Drop results farther than this.
    pub distance_threshold: Option<f64>,
}

/// Vector-search clause held by a query.
#[derive(Debug, Clone, PartialEq)]
pub struct FindNearest {
    pub vector_field: FieldPath,
    pub query_vector: Vec<f64>,
    pub limit: i32,
    pub distance_measure: DistanceMeasure,
    pub options: FindNearestOptions,
}
