use serde_json::Value;

use crate::api::Pagination;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{Condition, Field, OrderBy, SqlResult};

/// A validated list query: predicates, ordering and an optional page
/// window. Everything in here has already been checked against the
/// entity's allow-lists, so rendering it to SQL cannot fail on input.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub conditions: Vec<Condition>,
    pub order: Option<OrderBy>,
    pub page: Option<Pagination>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw list-endpoint query values.
    pub fn from_query(
        fields: &[Field],
        sorts: &[(&'static str, &'static str)],
        default_column: &'static str,
        filters: Option<&str>,
        sort: Option<&str>,
        order: Option<&str>,
    ) -> Result<Self, FilterError> {
        let order = FilterOrder::validate_and_parse(sort, order, sorts, default_column)?;
        let conditions = match filters.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => {
                let value: Value = serde_json::from_str(raw)?;
                FilterWhere::parse(&value, fields)?
            }
            None => vec![],
        };
        Ok(Self { conditions, order: Some(order), page: None })
    }

    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn page(mut self, page: Pagination) -> Self {
        self.page = Some(page);
        self
    }

    pub fn to_sql(&self, table_name: &str, id_column: &'static str) -> Result<SqlResult, FilterError> {
        Self::validate_table_name(table_name)?;
        let where_result = self.to_where_sql();
        let order = self.order.unwrap_or(OrderBy {
            column: id_column,
            direction: super::types::SortDirection::Asc,
        });

        let query = [
            "SELECT *".to_string(),
            format!("FROM \"{}\"", table_name),
            if where_result.query.is_empty() { String::new() } else { format!("WHERE {}", where_result.query) },
            FilterOrder::generate(&order, id_column),
            self.build_limit_clause(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        Ok(SqlResult { query, params: where_result.params })
    }

    pub fn to_where_sql(&self) -> SqlResult {
        let (query, params) = FilterWhere::generate(&self.conditions, 0);
        SqlResult { query, params }
    }

    /// COUNT over exactly the same predicate as `to_sql`, without ordering
    /// or page window.
    pub fn to_count_sql(&self, table_name: &str) -> Result<SqlResult, FilterError> {
        Self::validate_table_name(table_name)?;
        let where_result = self.to_where_sql();
        let query = if where_result.query.is_empty() {
            format!("SELECT COUNT(*) AS count FROM \"{}\"", table_name)
        } else {
            format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", table_name, where_result.query)
        };
        Ok(SqlResult { query, params: where_result.params })
    }

    fn validate_table_name(name: &str) -> Result<(), FilterError> {
        let mut chars = name.chars();
        let valid_start = chars.next().map_or(false, |c| c.is_ascii_alphabetic() || c == '_');
        if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(FilterError::InvalidTableName(name.to_string()));
        }
        Ok(())
    }

    fn build_limit_clause(&self) -> String {
        match self.page {
            Some(Pagination { limit, offset }) => format!("LIMIT {} OFFSET {}", limit, offset),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::types::{ColumnKind, SqlValue};

    const FIELDS: &[Field] = &[
        Field::new("ProjectName", "project_name", ColumnKind::Text),
        Field::new("OwningUserID", "owning_user_id", ColumnKind::Int),
    ];
    const SORTS: &[(&str, &str)] = &[("id", "project_id"), ("name", "project_name")];

    #[test]
    fn select_and_count_share_predicate() {
        let filter = Filter::from_query(
            FIELDS,
            SORTS,
            "project_id",
            Some(r#"{"OwningUserID": 42}"#),
            Some("name"),
            None,
        )
        .unwrap()
        .page(Pagination { limit: 10, offset: 20 });

        let select = filter.to_sql("projects", "project_id").unwrap();
        let count = filter.to_count_sql("projects").unwrap();

        assert_eq!(
            select.query,
            "SELECT * FROM \"projects\" WHERE \"owning_user_id\" = $1 \
             ORDER BY \"project_name\" ASC, \"project_id\" ASC LIMIT 10 OFFSET 20"
        );
        assert_eq!(count.query, "SELECT COUNT(*) AS count FROM \"projects\" WHERE \"owning_user_id\" = $1");
        assert_eq!(select.params, vec![SqlValue::Int(Some(42))]);
        assert_eq!(count.params, select.params);
    }

    #[test]
    fn unfiltered_query_has_no_where() {
        let filter = Filter::new();
        let select = filter.to_sql("users", "user_id").unwrap();
        assert_eq!(select.query, "SELECT * FROM \"users\" ORDER BY \"user_id\" ASC");
        let count = filter.to_count_sql("users").unwrap();
        assert_eq!(count.query, "SELECT COUNT(*) AS count FROM \"users\"");
    }

    #[test]
    fn malformed_filters_json_is_rejected() {
        let err = Filter::from_query(FIELDS, SORTS, "project_id", Some("{not json"), None, None);
        assert!(matches!(err, Err(FilterError::JsonError(_))));
    }

    #[test]
    fn rejects_bad_table_names() {
        assert!(Filter::new().to_sql("users; --", "user_id").is_err());
        assert!(Filter::new().to_count_sql("").is_err());
    }
}
