use serde::{Deserialize, Serialize};
use std::ops::Deref;

use crate::errors::{DbError, Result};
use crate::query::Query;
use crate::value::Value;

/// Path segment that separates the database name from document paths.
pub(crate) const DOCUMENTS: &str = "documents";

/// A collection addressed by its full resource name.
///
/// Dereferences to the collection's base [`Query`], so `coll.where_(..)` starts a query.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionRef {
    /// Document (or documents root) the collection lives under.
    pub parent_path: String,
    pub path: String,
    pub id: String,
    query: Query,
}

impl CollectionRef {
    pub(crate) fn new(parent_path: &str, id: &str) -> Self {
        let path = format!("{parent_path}/{id}");
        let mut query = Query::new(parent_path, id, false);
        if id.is_empty() || id.contains('/') {
            query = query.with_error(DbError::InvalidArgument(format!(
                "collection id {id:?} must be a single non-empty segment"
            )));
        }
        Self { parent_path: parent_path.to_string(), path, id: id.to_string(), query }
    }

    /// Reference to the document `id` in this collection. `id` must be a single non-empty
    /// segment.
    pub fn doc(&self, id: &str) -> Result<DocumentRef> {
        if id.is_empty() || id.contains('/') {
            return Err(DbError::InvalidArgument(format!(
                "document id {id:?} must be a single non-empty segment"
            )));
        }
        Ok(DocumentRef { path: format!("{}/{id}", self.path), id: id.to_string() })
    }

    #[must_use]
    pub const fn query(&self) -> &Query {
        &self.query
    }
}

impl Deref for CollectionRef {
    type Target = Query;

    fn deref(&self) -> &Query {
        &self.query
    }
}

/// A single document addressed by its full resource name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentRef {
    pub path: String,
    pub id: String,
}

impl DocumentRef {
    /// Parses a full resource name `projects/p/databases/d/documents/C/D[/C/D...]`.
    pub fn from_path(path: &str) -> Result<Self> {
        let invalid = || DbError::InvalidArgument(format!("{path:?} is not a document name"));
        let (_, rel) = path.split_once(&format!("/{DOCUMENTS}/")).ok_or_else(invalid)?;
        let segs: Vec<&str> = rel.split('/').collect();
        if segs.len() % 2 != 0 || segs.iter().any(|s| s.is_empty()) {
            return Err(invalid());
        }
        let id = segs.last().ok_or_else(invalid)?;
        Ok(Self { path: path.to_string(), id: (*id).to_string() })
    }

    /// Full name of the collection holding this document.
    #[must_use]
    pub fn parent_path(&self) -> &str {
        self.path.rsplit_once('/').map_or("", |(p, _)| p)
    }

    /// Reference to the subcollection `id` under this document.
    #[must_use]
    pub fn collection(&self, id: &str) -> CollectionRef {
        CollectionRef::new(&self.path, id)
    }
}

impl From<DocumentRef> for Value {
    fn from(r: DocumentRef) -> Self {
        Self::Reference(r.path)
    }
}

impl From<&DocumentRef> for Value {
    fn from(r: &DocumentRef) -> Self {
        Self::Reference(r.path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: &str = "projects/p/databases/(default)/documents";

    #[test]
    fn document_paths_nest() {
        let c = CollectionRef::new(ROOT, "C");
        let d = c.doc("D").unwrap();
        assert_eq!(d.path, format!("{ROOT}/C/D"));
        assert_eq!(d.parent_path(), c.path);
        let sub = d.collection("S");
        assert_eq!(sub.parent_path, d.path);
        assert_eq!(sub.collection_id(), "S");
    }

    #[test]
    fn from_path_requires_even_segments() {
        let d = DocumentRef::from_path(&format!("{ROOT}/C/D/S/E")).unwrap();
        assert_eq!(d.id, "E");
        assert!(DocumentRef::from_path(&format!("{ROOT}/C")).is_err());
        assert!(DocumentRef::from_path("C/D").is_err());
    }

    #[test]
    fn document_id_must_be_one_segment() {
        let c = CollectionRef::new(ROOT, "C");
        assert!(matches!(c.doc(""), Err(DbError::InvalidArgument(_))));
        assert!(matches!(c.doc("D/S"), Err(DbError::InvalidArgument(_))));
        assert!(matches!(c.doc("/"), Err(DbError::InvalidArgument(_))));
    }

    #[test]
    fn slash_in_collection_id_is_sticky() {
        let c = CollectionRef::new(ROOT, "a/b");
        assert!(matches!(c.to_wire(), Err(DbError::InvalidArgument(_))));
    }
}
