use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::{DbError, Result};

pub const DEFAULT_DATABASE_ID: &str = "(default)";

fn default_database_id() -> String {
    DEFAULT_DATABASE_ID.to_string()
}

fn default_level() -> String {
    "info".to_string()
}

const fn default_retention() -> usize {
    7
}

/// Logging section of the client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_retention")]
    pub retention: usize,
    #[serde(default)]
    pub devlog: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { dir: None, level: default_level(), retention: default_retention(), devlog: false }
    }
}

impl LogConfig {
    /// Installs the global logger described by this section.
    pub fn apply(&self) -> std::result::Result<(), Box<dyn std::error::Error>> {
        crate::utils::logger::configure_logging(
            self.dir.as_deref(),
            Some(&self.level),
            Some(self.retention),
            self.devlog,
        )
    }
}

/// Configuration for a [`crate::Client`].
///
/// ```toml
/// project_id = "my-project"
/// database_id = "(default)"
///
/// [log]
/// level = "debug"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub project_id: String,
    #[serde(default = "default_database_id")]
    pub database_id: String,
    #[serde(default)]
    pub log: LogConfig,
}

impl ClientConfig {
    #[must_use]
    pub fn new(project_id: impl Into<String>) -> Self {
        Self { project_id: project_id.into(), database_id: default_database_id(), log: LogConfig::default() }
    }

    #[must_use]
    pub fn with_database(mut self, database_id: impl Into<String>) -> Self {
        self.database_id = database_id.into();
        self
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| DbError::InvalidArgument(format!("config {}: {e}", path.display())))?;
        Self::from_toml_str(&s)
    }

    /// Reads `DOCWIRE_PROJECT_ID` (required) and `DOCWIRE_DATABASE_ID` (optional).
    pub fn from_env() -> Result<Self> {
        let project_id = std::env::var("DOCWIRE_PROJECT_ID")
            .map_err(|_| DbError::InvalidArgument("DOCWIRE_PROJECT_ID is not set".into()))?;
        let mut cfg = Self::new(project_id);
        if let Ok(db) = std::env::var("DOCWIRE_DATABASE_ID") {
            cfg.database_id = db;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.project_id.is_empty() {
            return Err(DbError::InvalidArgument("project_id must not be empty".into()));
        }
        if self.database_id.is_empty() {
            return Err(DbError::InvalidArgument("database_id must not be empty".into()));
        }
        Ok(())
    }

    /// `projects/{project}/databases/{database}`
    #[must_use]
    pub fn database_path(&self) -> String {
        format!("projects/{}/databases/{}", self.project_id, self.database_id)
    }
}
