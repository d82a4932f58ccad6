use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DbError {
    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("can't {op} the incomplete key: {key}")]
    IncompleteKey { op: &'static str, key: String },

    #[error("invalid field path: {0}")]
    InvalidPath(String),

    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error("unsupported filter: {0}")]
    UnsupportedFilter(String),

    #[error("invalid run option: {0}")]
    InvalidOption(String),

    #[error("{0} can be specified only once")]
    DuplicateOption(&'static str),

    #[error("query created without a collection id")]
    MissingCollection,

    #[error("missing field: {0}")]
    MissingField(String),

    #[error("cannot mix a document snapshot cursor with a field value cursor")]
    MixedCursorType,

    #[error("document {reference} is out of scope for query on {query}")]
    ScopeMismatch { reference: String, query: String },

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("invalid cursor: {0}")]
    InvalidCursor(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("dispatch error: {0}")]
    Dispatch(String),

    #[error("{0}")]
    Multi(MultiError),
}

impl From<serde_json::Error> for DbError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<bson::ser::Error> for DbError {
    fn from(e: bson::ser::Error) -> Self {
        Self::Encoding(e.to_string())
    }
}

impl From<toml::de::Error> for DbError {
    fn from(e: toml::de::Error) -> Self {
        Self::InvalidArgument(format!("config: {e}"))
    }
}

/// Positional aggregate over a batch: one slot per input, `None` where the
/// input was valid.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultiError(pub Vec<Option<DbError>>);

impl MultiError {
    #[must_use]
    pub fn with_len(n: usize) -> Self {
        Self(vec![None; n])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of populated slots.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.0.iter().filter(|e| e.is_some()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &DbError)> {
        self.0.iter().enumerate().filter_map(|(i, e)| e.as_ref().map(|e| (i, e)))
    }
}

impl fmt::Display for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut errs = self.0.iter().flatten();
        let Some(first) = errs.next() else {
            return write!(f, "(0 errors)");
        };
        match errs.count() {
            0 => write!(f, "{first}"),
            1 => write!(f, "{first} (and 1 other error)"),
            n => write!(f, "{first} (and {n} other errors)"),
        }
    }
}

impl std::error::Error for MultiError {}
