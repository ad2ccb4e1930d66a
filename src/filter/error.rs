use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid table name: {0}")]
    InvalidTableName(String),

    #[error("Unknown filter field: {0}")]
    UnknownField(String),

    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("Invalid operator data: {0}")]
    InvalidOperatorData(String),

    #[error("Invalid value for '{field}': expected {expected}")]
    InvalidValue { field: String, expected: &'static str },

    #[error("Invalid sort field: {0}")]
    InvalidSort(String),

    #[error("Invalid sort order: {0} (expected asc or desc)")]
    InvalidOrder(String),

    #[error("Filters must be a JSON object: {0}")]
    JsonError(#[from] serde_json::Error),
}
