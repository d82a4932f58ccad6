//! Seams to the transport layer. Implementations send requests to the backend; this crate
//! only builds the requests and interprets the responses.

use std::collections::BTreeMap;

use crate::errors::Result;
use crate::mutation::{Mutation, to_wire_mutations};
use crate::query::Query;
use crate::snapshot::DocumentSnapshot;
use crate::value::Value;
use crate::wire::{self, QueryResponse, RunAggregationQueryRequest, RunQueryRequest};

pub trait QueryDispatcher {
    /// Runs a query, returning the response stream in server order.
    fn run_query(&self, request: &RunQueryRequest) -> Result<Vec<QueryResponse>>;

    /// Runs an aggregation, returning one value per alias.
    fn run_aggregation(&self, request: &RunAggregationQueryRequest) -> Result<BTreeMap<String, Value>>;
}

pub trait MutationDispatcher {
    /// Applies a batch, returning one result per mutation.
    fn commit(&self, mutations: &[wire::Mutation]) -> Result<Vec<wire::MutationResult>>;
}

impl Query {
    /// Runs the query and collects every returned document.
    pub fn get_all<D: QueryDispatcher + ?Sized>(&self, dispatcher: &D) -> Result<Vec<DocumentSnapshot>> {
        let req = self.to_run_request()?;
        let responses = dispatcher.run_query(&req)?;
        let docs = responses
            .into_iter()
            .filter_map(|r| r.document.map(|d| DocumentSnapshot::from_wire(d, r.read_time)))
            .collect::<Result<Vec<_>>>()?;
        log::debug!("query on {:?} returned {} documents", self.collection_id(), docs.len());
        Ok(docs)
    }
}

/// Assembles the batch and commits it in one call. An empty batch is not sent.
pub fn mutate<D: MutationDispatcher + ?Sized>(
    dispatcher: &D,
    mutations: &[Mutation],
) -> Result<Vec<wire::MutationResult>> {
    let batch = to_wire_mutations(mutations)?;
    if batch.is_empty() {
        return Ok(Vec::new());
    }
    dispatcher.commit(&batch)
}
