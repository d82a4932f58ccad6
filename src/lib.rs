//! Query construction and mutation batching for a document-database client.
//!
//! Queries are immutable values built by chaining; each call returns a new query. Invalid
//! arguments are remembered and reported by [`Query::to_wire`]. Mutations are validated when
//! built and assembled into one batch by [`to_wire_mutations`].

pub mod client;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod mutation;
pub mod path;
pub mod query;
pub mod reference;
pub mod snapshot;
pub mod utils;
pub mod value;
pub mod wire;

pub use client::Client;
pub use config::{ClientConfig, LogConfig};
pub use dispatch::{MutationDispatcher, QueryDispatcher, mutate};
pub use errors::{DbError, MultiError, Result};
pub use mutation::{Key, Mutation, Operation, to_wire_mutations};
pub use path::{DOCUMENT_ID, FieldPath};
pub use query::{
    AggregationQuery, Direction, DistanceMeasure, EntityFilter, ExplainOptions, FindNearestOptions,
    Query, RunOption,
};
pub use reference::{CollectionRef, DocumentRef};
pub use snapshot::DocumentSnapshot;
pub use utils::logger;
pub use value::{GeoPoint, Sentinel, Value, Vector};

/// Sets up logging from `log4rs.yaml` when present, otherwise from `DOCWIRE_*` variables.
pub fn init() -> std::result::Result<(), Box<dyn std::error::Error>> {
    if std::path::Path::new("log4rs.yaml").exists() {
        logger::init()
    } else {
        logger::configure_from_env()
    }
}
