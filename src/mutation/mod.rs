//! Write operations on entities and their assembly into a single batch.

mod key;

pub use key::Key;

use serde::Serialize;
use std::collections::HashSet;

use crate::devlog;
use crate::errors::{DbError, MultiError, Result};
use crate::value::encode_entity;
use crate::wire::{self, Entity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Insert,
    Upsert,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
struct Prepared {
    key: Key,
    operation: Operation,
    wire: wire::Mutation,
}

/// A single write. Construction never fails; an invalid key or source is recorded and
/// reported when the batch is assembled.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    inner: std::result::Result<Prepared, DbError>,
}

impl Mutation {
    /// Creates the entity; fails at commit if it already exists. The key may be incomplete.
    #[must_use]
    pub fn insert<T: Serialize + ?Sized>(key: &Key, src: &T) -> Self {
        Self::with_entity(Operation::Insert, wire::Mutation::Insert, key, src)
    }

    /// Creates or replaces the entity. The key may be incomplete.
    #[must_use]
    pub fn upsert<T: Serialize + ?Sized>(key: &Key, src: &T) -> Self {
        Self::with_entity(Operation::Upsert, wire::Mutation::Upsert, key, src)
    }

    /// Replaces an existing entity. The key must be complete.
    #[must_use]
    pub fn update<T: Serialize + ?Sized>(key: &Key, src: &T) -> Self {
        Self::with_entity(Operation::Update, wire::Mutation::Update, key, src)
    }

    #[must_use]
    pub fn delete(key: &Key) -> Self {
        let inner = check_key(Operation::Delete, key).map(|()| Prepared {
            key: key.clone(),
            operation: Operation::Delete,
            wire: wire::Mutation::Delete(key.to_wire()),
        });
        Self { inner }
    }

    fn with_entity<T: Serialize + ?Sized>(
        operation: Operation,
        wrap: fn(Entity) -> wire::Mutation,
        key: &Key,
        src: &T,
    ) -> Self {
        let inner = check_key(operation, key).and_then(|()| {
            let entity = Entity { key: key.to_wire(), properties: encode_entity(src)? };
            Ok(Prepared { key: key.clone(), operation, wire: wrap(entity) })
        });
        Self { inner }
    }

    #[must_use]
    pub fn operation(&self) -> Option<Operation> {
        self.inner.as_ref().ok().map(|p| p.operation)
    }

    #[must_use]
    pub fn key(&self) -> Option<&Key> {
        self.inner.as_ref().ok().map(|p| &p.key)
    }

    #[must_use]
    pub fn err(&self) -> Option<&DbError> {
        self.inner.as_ref().err()
    }
}

fn check_key(op: Operation, key: &Key) -> Result<()> {
    if !key.is_valid() {
        return Err(DbError::InvalidKey(key.to_string()));
    }
    if key.is_incomplete() && matches!(op, Operation::Update | Operation::Delete) {
        let op = if op == Operation::Update { "update" } else { "delete" };
        return Err(DbError::IncompleteKey { op, key: key.to_string() });
    }
    Ok(())
}

/// Assembles a batch. If any mutation is invalid, returns a [`MultiError`] with one slot per
/// input and no batch. Repeated deletes of the same key keep only the first.
pub fn to_wire_mutations(mutations: &[Mutation]) -> Result<Vec<wire::Mutation>> {
    let mut merr: Option<MultiError> = None;
    for (i, m) in mutations.iter().enumerate() {
        if let Err(e) = &m.inner {
            merr.get_or_insert_with(|| MultiError::with_len(mutations.len())).0[i] = Some(e.clone());
        }
    }
    if let Some(merr) = merr {
        log::warn!("rejecting batch of {}: {merr}", mutations.len());
        return Err(DbError::Multi(merr));
    }

    let mut seen_deletes = HashSet::new();
    let mut out = Vec::with_capacity(mutations.len());
    for p in mutations.iter().filter_map(|m| m.inner.as_ref().ok()) {
        if p.operation == Operation::Delete && !seen_deletes.insert(p.key.to_string()) {
            log::debug!("dropping repeated delete of {}", p.key);
            continue;
        }
        out.push(p.wire.clone());
    }
    devlog!(
        "{{\"op\":\"to_wire_mutations\",\"input\":{},\"output\":{}}}",
        mutations.len(),
        out.len()
    );
    Ok(out)
}
