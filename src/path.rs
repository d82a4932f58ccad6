use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{DbError, Result};

/// Reserved field name that orders and filters on the document's own reference.
pub const DOCUMENT_ID: &str = "__name__";

const INVALID_RUNES: &[char] = &['~', '*', '/', '[', ']'];

/// A sequence of field names addressing a (possibly nested) value in a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldPath(pub Vec<String>);

impl FieldPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn document_id() -> Self {
        Self(vec![DOCUMENT_ID.to_string()])
    }

    /// Parses a dot-separated path such as `a.b.c`. Segments may not contain any of `~*/[]`;
    /// use [`FieldPath::new`] for such names.
    pub fn parse(s: &str) -> Result<Self> {
        if s.contains(INVALID_RUNES) {
            return Err(DbError::InvalidPath(format!(
                "{s:?} contains an invalid rune (one of ~*/[])"
            )));
        }
        let fp = Self(s.split('.').map(str::to_string).collect());
        fp.validate()?;
        Ok(fp)
    }

    pub fn validate(&self) -> Result<()> {
        if self.0.is_empty() {
            return Err(DbError::InvalidPath("empty field path".into()));
        }
        if self.0.iter().any(String::is_empty) {
            return Err(DbError::InvalidPath(format!("empty component in field path {:?}", self.0)));
        }
        Ok(())
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn is_document_id(&self) -> bool {
        self.0.len() == 1 && self.0[0] == DOCUMENT_ID
    }

    /// Dotted form with backtick-quoting for segments that are not simple identifiers.
    #[must_use]
    pub fn to_wire_string(&self) -> String {
        self.0.iter().map(|s| escape_segment(s)).collect::<Vec<_>>().join(".")
    }

    /// Inverse of [`FieldPath::to_wire_string`].
    pub fn from_wire_string(s: &str) -> Result<Self> {
        let mut segs = Vec::new();
        let mut cur = String::new();
        let mut chars = s.chars();
        let mut quoted = false;
        while let Some(c) = chars.next() {
            match c {
                '`' => quoted = !quoted,
                '\\' if quoted => match chars.next() {
                    Some(e) => cur.push(e),
                    None => return Err(DbError::InvalidPath(format!("dangling escape in {s:?}"))),
                },
                '.' if !quoted => segs.push(std::mem::take(&mut cur)),
                _ => cur.push(c),
            }
        }
        if quoted {
            return Err(DbError::InvalidPath(format!("unterminated backtick in {s:?}")));
        }
        segs.push(cur);
        let fp = Self(segs);
        fp.validate()?;
        Ok(fp)
    }
}

fn is_simple_segment(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn escape_segment(s: &str) -> String {
    if is_simple_segment(s) {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + 2);
    out.push('`');
    for c in s.chars() {
        if c == '`' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('`');
    out
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wire_string())
    }
}

impl From<Vec<String>> for FieldPath {
    fn from(v: Vec<String>) -> Self {
        Self(v)
    }
}

impl From<&[&str]> for FieldPath {
    fn from(v: &[&str]) -> Self {
        Self::new(v.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for FieldPath {
    fn from(v: [&str; N]) -> Self {
        Self::new(v)
    }
}
