use crate::config::ClientConfig;
use crate::errors::{DbError, Result};
use crate::query::Query;
use crate::reference::{CollectionRef, DOCUMENTS, DocumentRef};

/// Entry point for building references and queries against one database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    config: ClientConfig,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        log::debug!("client for {}", config.database_path());
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn database_path(&self) -> String {
        self.config.database_path()
    }

    /// `projects/{p}/databases/{d}/documents`
    #[must_use]
    pub fn documents_root(&self) -> String {
        format!("{}/{DOCUMENTS}", self.database_path())
    }

    /// Top-level collection `id`.
    #[must_use]
    pub fn collection(&self, id: &str) -> CollectionRef {
        CollectionRef::new(&self.documents_root(), id)
    }

    /// Query over every collection named `id`, at any depth.
    #[must_use]
    pub fn collection_group(&self, id: &str) -> Query {
        let q = Query::new(&self.documents_root(), id, true);
        if id.contains('/') {
            return q.with_error(DbError::InvalidArgument(format!(
                "collection group id {id:?} must not contain '/'"
            )));
        }
        q
    }

    /// Document at `path`, relative to the documents root (`C/D[/C/D...]`).
    pub fn doc(&self, path: &str) -> Result<DocumentRef> {
        DocumentRef::from_path(&format!("{}/{path}", self.documents_root()))
    }
}
