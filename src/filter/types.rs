use chrono::{DateTime, Utc};
use serde_json::Value;

use super::error::FilterError;

/// A typed, nullable value bound into a parameterized statement.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Int(Option<i64>),
    Text(Option<String>),
    Bool(Option<bool>),
    Timestamp(Option<DateTime<Utc>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Int,
    Text,
    Bool,
    Timestamp,
}

impl ColumnKind {
    /// Convert a JSON filter operand into a value of this column's type.
    pub fn coerce(self, field: &str, value: &Value) -> Result<SqlValue, FilterError> {
        let invalid = || FilterError::InvalidValue {
            field: field.to_string(),
            expected: self.describe(),
        };
        match (self, value) {
            (ColumnKind::Int, Value::Number(n)) => n.as_i64().map(|i| SqlValue::Int(Some(i))).ok_or_else(invalid),
            (ColumnKind::Int, Value::String(s)) => s.parse().map(|i| SqlValue::Int(Some(i))).map_err(|_| invalid()),
            (ColumnKind::Text, Value::String(s)) => Ok(SqlValue::Text(Some(s.clone()))),
            (ColumnKind::Bool, Value::Bool(b)) => Ok(SqlValue::Bool(Some(*b))),
            (ColumnKind::Timestamp, Value::String(s)) => DateTime::parse_from_rfc3339(s)
                .map(|dt| SqlValue::Timestamp(Some(dt.with_timezone(&Utc))))
                .map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            ColumnKind::Int => "integer",
            ColumnKind::Text => "string",
            ColumnKind::Bool => "boolean",
            ColumnKind::Timestamp => "ISO-8601 timestamp",
        }
    }
}

/// A filterable attribute: public JSON name mapped to its column.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub column: &'static str,
    pub kind: ColumnKind,
}

impl Field {
    pub const fn new(name: &'static str, column: &'static str, kind: ColumnKind) -> Self {
        Self { name, column, kind }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    NIn,
    Like,
    ILike,
    IsNull,
    NotNull,
}

/// One validated predicate over a known column.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: &'static str,
    pub op: FilterOp,
    pub values: Vec<SqlValue>,
}

impl Condition {
    pub fn eq(column: &'static str, value: SqlValue) -> Self {
        Self { column, op: FilterOp::Eq, values: vec![value] }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: &'static str,
    pub direction: SortDirection,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlValue>,
}
