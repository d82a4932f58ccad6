//! Entity filters and their lowering to wire filter trees.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{DbError, Result};
use crate::path::FieldPath;
use crate::value::Value;
use crate::wire::{self, CompositeOp, FieldReference, UnaryOp};

/// Binary comparison operators accepted by property filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Equal,
    NotEqual,
    In,
    NotIn,
    ArrayContains,
    ArrayContainsAny,
}

impl Operator {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::In => "in",
            Self::NotIn => "not-in",
            Self::ArrayContains => "array-contains",
            Self::ArrayContainsAny => "array-contains-any",
        }
    }

    /// Range and negation operators; these constrain implicit ordering.
    #[must_use]
    pub const fn is_inequality(self) -> bool {
        matches!(
            self,
            Self::LessThan
                | Self::LessThanOrEqual
                | Self::GreaterThan
                | Self::GreaterThanOrEqual
                | Self::NotEqual
                | Self::NotIn
        )
    }
}

impl FromStr for Operator {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "<" => Self::LessThan,
            "<=" => Self::LessThanOrEqual,
            ">" => Self::GreaterThan,
            ">=" => Self::GreaterThanOrEqual,
            "==" => Self::Equal,
            "!=" => Self::NotEqual,
            "in" => Self::In,
            "not-in" => Self::NotIn,
            "array-contains" => Self::ArrayContains,
            "array-contains-any" => Self::ArrayContainsAny,
            other => return Err(DbError::InvalidFilter(format!("invalid operator {other:?}"))),
        })
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison on a dotted field name such as `a.b`.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyFilter {
    pub path: String,
    pub operator: String,
    pub value: Value,
}

impl PropertyFilter {
    pub fn new(path: impl Into<String>, operator: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { path: path.into(), operator: operator.into(), value: value.into() }
    }
}

/// Comparison on a pre-split field path; segments may hold any characters.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyPathFilter {
    pub path: FieldPath,
    pub operator: String,
    pub value: Value,
}

impl PropertyPathFilter {
    pub fn new(path: impl Into<FieldPath>, operator: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { path: path.into(), operator: operator.into(), value: value.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AndFilter {
    pub filters: Vec<EntityFilter>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrFilter {
    pub filters: Vec<EntityFilter>,
}

/// A filter tree. Operators are checked when the tree is lowered, not when it is built.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityFilter {
    Property(PropertyFilter),
    PropertyPath(PropertyPathFilter),
    And(AndFilter),
    Or(OrFilter),
}

impl EntityFilter {
    #[must_use]
    pub fn and(filters: impl IntoIterator<Item = Self>) -> Self {
        Self::And(AndFilter { filters: filters.into_iter().collect() })
    }

    #[must_use]
    pub fn or(filters: impl IntoIterator<Item = Self>) -> Self {
        Self::Or(OrFilter { filters: filters.into_iter().collect() })
    }

    pub fn to_wire(&self) -> Result<wire::Filter> {
        match self {
            Self::Property(f) => field_filter(&FieldPath::parse(&f.path)?, &f.operator, &f.value),
            Self::PropertyPath(f) => {
                f.path.validate()?;
                field_filter(&f.path, &f.operator, &f.value)
            }
            Self::And(f) => composite(CompositeOp::And, &f.filters),
            Self::Or(f) => composite(CompositeOp::Or, &f.filters),
        }
    }

    /// Rebuilds a filter tree from its wire form. Unary filters come back as `==` against
    /// null or NaN, which lower to the same wire filter.
    pub fn from_wire(f: wire::Filter) -> Result<Self> {
        Ok(match f {
            wire::Filter::FieldFilter(ff) => Self::PropertyPath(PropertyPathFilter {
                path: FieldPath::from_wire_string(&ff.field.field_path)?,
                operator: ff.op.as_str().to_string(),
                value: ff.value.from_wire(),
            }),
            wire::Filter::UnaryFilter(uf) => Self::PropertyPath(PropertyPathFilter {
                path: FieldPath::from_wire_string(&uf.field.field_path)?,
                operator: Operator::Equal.as_str().to_string(),
                value: match uf.op {
                    UnaryOp::IsNull => Value::Null,
                    UnaryOp::IsNan => Value::Double(f64::NAN),
                },
            }),
            wire::Filter::CompositeFilter(cf) => {
                let children = cf.filters.into_iter().map(Self::from_wire).collect::<Result<Vec<_>>>()?;
                match cf.op {
                    CompositeOp::And => Self::and(children),
                    CompositeOp::Or => Self::or(children),
                }
            }
        })
    }

    /// Field path and operator when this is a single comparison with a valid operator.
    pub(crate) fn comparison(&self) -> Option<(FieldPath, Operator)> {
        let (path, op) = match self {
            Self::Property(f) => (FieldPath::parse(&f.path).ok()?, &f.operator),
            Self::PropertyPath(f) => (f.path.clone(), &f.operator),
            _ => return None,
        };
        Some((path, op.parse().ok()?))
    }
}

impl From<PropertyFilter> for EntityFilter {
    fn from(f: PropertyFilter) -> Self {
        Self::Property(f)
    }
}

impl From<PropertyPathFilter> for EntityFilter {
    fn from(f: PropertyPathFilter) -> Self {
        Self::PropertyPath(f)
    }
}

impl From<AndFilter> for EntityFilter {
    fn from(f: AndFilter) -> Self {
        Self::And(f)
    }
}

impl From<OrFilter> for EntityFilter {
    fn from(f: OrFilter) -> Self {
        Self::Or(f)
    }
}

fn field_filter(path: &FieldPath, op: &str, value: &Value) -> Result<wire::Filter> {
    let op: Operator = op.parse()?;
    let field = FieldReference { field_path: path.to_wire_string() };
    if value.is_null() || value.is_nan() {
        let unary = if value.is_null() { UnaryOp::IsNull } else { UnaryOp::IsNan };
        return match op {
            Operator::Equal => Ok(wire::Filter::UnaryFilter(wire::UnaryFilter { op: unary, field })),
            Operator::NotEqual => Err(DbError::UnsupportedFilter(format!(
                "{path}: '!=' cannot compare against {}",
                if value.is_null() { "null" } else { "NaN" }
            ))),
            other => Err(DbError::InvalidFilter(format!(
                "{path}: only '==' may compare against {}, got {other:?}",
                if value.is_null() { "null" } else { "NaN" }
            ))),
        };
    }
    Ok(wire::Filter::FieldFilter(wire::FieldFilter { field, op, value: value.to_wire()? }))
}

fn composite(op: CompositeOp, children: &[EntityFilter]) -> Result<wire::Filter> {
    if children.is_empty() {
        return Err(DbError::InvalidFilter(format!("{op:?} filter has no children")));
    }
    let filters = children.iter().map(EntityFilter::to_wire).collect::<Result<Vec<_>>>()?;
    Ok(wire::Filter::CompositeFilter(wire::CompositeFilter { op, filters }))
}
