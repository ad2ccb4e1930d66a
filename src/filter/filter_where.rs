use serde_json::Value;

use super::error::FilterError;
use super::types::{ColumnKind, Condition, Field, FilterOp, SqlValue};

/// Parses the `filters` JSON dialect into conditions and renders them as a
/// parameterized WHERE clause.
///
/// ```text
/// { "ProjectName": "X" }                      implicit $eq
/// { "OwningUserID": { "$in": [1, 2] } }       operator object
/// { "ParentDirectory": null }                 IS NULL
/// ```
pub struct FilterWhere {
    param_values: Vec<SqlValue>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    pub fn parse(where_data: &Value, fields: &[Field]) -> Result<Vec<Condition>, FilterError> {
        let obj = match where_data {
            Value::Null => return Ok(vec![]),
            Value::Object(obj) => obj,
            _ => {
                return Err(FilterError::InvalidOperatorData(
                    "filters must be a JSON object".to_string(),
                ))
            }
        };

        let mut conditions = Vec::new();
        for (key, value) in obj {
            let field = fields
                .iter()
                .find(|f| f.name == key.as_str())
                .ok_or_else(|| FilterError::UnknownField(key.clone()))?;
            Self::parse_field_condition(field, value, &mut conditions)?;
        }
        Ok(conditions)
    }

    fn parse_field_condition(field: &Field, value: &Value, out: &mut Vec<Condition>) -> Result<(), FilterError> {
        match value {
            Value::Object(ops) => {
                for (op_key, op_val) in ops {
                    out.push(Self::parse_operator(field, op_key, op_val)?);
                }
            }
            // Implicit equality: { field: value }
            _ => out.push(Self::parse_operator(field, "$eq", value)?),
        }
        Ok(())
    }

    fn parse_operator(field: &Field, op_key: &str, value: &Value) -> Result<Condition, FilterError> {
        let op = Self::map_operator(op_key)?;
        let condition = |op, values| Condition { column: field.column, op, values };

        match op {
            FilterOp::Eq | FilterOp::Ne if value.is_null() => {
                let op = if op == FilterOp::Eq { FilterOp::IsNull } else { FilterOp::NotNull };
                Ok(condition(op, vec![]))
            }
            FilterOp::IsNull => match value {
                Value::Bool(true) => Ok(condition(FilterOp::IsNull, vec![])),
                Value::Bool(false) => Ok(condition(FilterOp::NotNull, vec![])),
                _ => Err(FilterError::InvalidOperatorData("$null requires true or false".to_string())),
            },
            FilterOp::In | FilterOp::NIn => {
                let items = value
                    .as_array()
                    .ok_or_else(|| FilterError::InvalidOperatorData(format!("{} requires array", op_key)))?;
                let values = items
                    .iter()
                    .map(|v| field.kind.coerce(field.name, v))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(condition(op, values))
            }
            FilterOp::Like | FilterOp::ILike => {
                if field.kind != ColumnKind::Text {
                    return Err(FilterError::InvalidOperatorData(format!(
                        "{} is only supported on text fields, not '{}'",
                        op_key, field.name
                    )));
                }
                Ok(condition(op, vec![field.kind.coerce(field.name, value)?]))
            }
            _ => Ok(condition(op, vec![field.kind.coerce(field.name, value)?])),
        }
    }

    fn map_operator(op_key: &str) -> Result<FilterOp, FilterError> {
        Ok(match op_key {
            "$eq" => FilterOp::Eq,
            "$ne" | "$neq" => FilterOp::Ne,
            "$gt" => FilterOp::Gt,
            "$gte" => FilterOp::Gte,
            "$lt" => FilterOp::Lt,
            "$lte" => FilterOp::Lte,
            "$in" => FilterOp::In,
            "$nin" => FilterOp::NIn,
            "$like" => FilterOp::Like,
            "$ilike" => FilterOp::ILike,
            "$null" => FilterOp::IsNull,
            other => return Err(FilterError::UnsupportedOperator(other.to_string())),
        })
    }

    /// Render conditions joined with AND. An empty list yields an empty
    /// clause so callers can omit the WHERE keyword.
    pub fn generate(conditions: &[Condition], starting_param_index: usize) -> (String, Vec<SqlValue>) {
        let mut filter_where = Self::new(starting_param_index);
        let parts: Vec<String> = conditions
            .iter()
            .map(|c| filter_where.build_sql_condition(c))
            .collect();
        (parts.join(" AND "), filter_where.param_values)
    }

    fn build_sql_condition(&mut self, condition: &Condition) -> String {
        let quoted_column = format!("\"{}\"", condition.column);

        match condition.op {
            FilterOp::Eq => self.binary(&quoted_column, "=", condition),
            FilterOp::Ne => self.binary(&quoted_column, "<>", condition),
            FilterOp::Gt => self.binary(&quoted_column, ">", condition),
            FilterOp::Gte => self.binary(&quoted_column, ">=", condition),
            FilterOp::Lt => self.binary(&quoted_column, "<", condition),
            FilterOp::Lte => self.binary(&quoted_column, "<=", condition),
            FilterOp::Like => self.binary(&quoted_column, "LIKE", condition),
            FilterOp::ILike => self.binary(&quoted_column, "ILIKE", condition),
            FilterOp::IsNull => format!("{} IS NULL", quoted_column),
            FilterOp::NotNull => format!("{} IS NOT NULL", quoted_column),
            FilterOp::In | FilterOp::NIn => {
                if condition.values.is_empty() {
                    // IN () matches nothing, NOT IN () matches every non-null row
                    return if condition.op == FilterOp::In {
                        "1=0".to_string()
                    } else {
                        format!("{} IS NOT NULL", quoted_column)
                    };
                }
                let params: Vec<String> = condition.values.iter().map(|v| self.param(v.clone())).collect();
                let keyword = if condition.op == FilterOp::In { "IN" } else { "NOT IN" };
                format!("{} {} ({})", quoted_column, keyword, params.join(", "))
            }
        }
    }

    fn binary(&mut self, quoted_column: &str, op: &str, condition: &Condition) -> String {
        match condition.values.first() {
            Some(v) => format!("{} {} {}", quoted_column, op, self.param(v.clone())),
            None => "1=0".to_string(),
        }
    }

    fn param(&mut self, value: SqlValue) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}
