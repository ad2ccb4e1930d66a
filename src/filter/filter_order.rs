use super::error::FilterError;
use super::types::{OrderBy, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// Resolve `sort`/`order` query values against an allow-list of
    /// `(sort key, column)` pairs. Only columns from the allow-list can end
    /// up in ORDER BY.
    pub fn validate_and_parse(
        sort: Option<&str>,
        order: Option<&str>,
        allowed: &[(&'static str, &'static str)],
        default_column: &'static str,
    ) -> Result<OrderBy, FilterError> {
        let direction = match order.map(str::trim) {
            None | Some("") => SortDirection::Asc,
            Some(o) if o.eq_ignore_ascii_case("asc") => SortDirection::Asc,
            Some(o) if o.eq_ignore_ascii_case("desc") => SortDirection::Desc,
            Some(other) => return Err(FilterError::InvalidOrder(other.to_string())),
        };

        let column = match sort.map(str::trim) {
            None | Some("") => default_column,
            Some(key) => allowed
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, column)| *column)
                .ok_or_else(|| FilterError::InvalidSort(key.to_string()))?,
        };

        Ok(OrderBy { column, direction })
    }

    pub fn generate(order: &OrderBy, tie_breaker: &str) -> String {
        if order.column == tie_breaker {
            format!("ORDER BY \"{}\" {}", order.column, order.direction.to_sql())
        } else {
            // Keep page boundaries stable when the sort column has duplicates
            format!(
                "ORDER BY \"{}\" {}, \"{}\" ASC",
                order.column,
                order.direction.to_sql(),
                tie_breaker
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SORTS: &[(&str, &str)] = &[("id", "project_id"), ("name", "project_name"), ("creationDate", "creation_date")];

    #[test]
    fn defaults_to_primary_key_ascending() {
        let order = FilterOrder::validate_and_parse(None, None, SORTS, "project_id").unwrap();
        assert_eq!(order, OrderBy { column: "project_id", direction: SortDirection::Asc });
        assert_eq!(FilterOrder::generate(&order, "project_id"), "ORDER BY \"project_id\" ASC");
    }

    #[test]
    fn maps_sort_key_to_column() {
        let order = FilterOrder::validate_and_parse(Some("name"), Some("DESC"), SORTS, "project_id").unwrap();
        assert_eq!(order, OrderBy { column: "project_name", direction: SortDirection::Desc });
        assert_eq!(
            FilterOrder::generate(&order, "project_id"),
            "ORDER BY \"project_name\" DESC, \"project_id\" ASC"
        );
    }

    #[test]
    fn rejects_unknown_sort_key() {
        let err = FilterOrder::validate_and_parse(Some("Bogus"), None, SORTS, "project_id");
        assert!(matches!(err, Err(FilterError::InvalidSort(k)) if k == "Bogus"));
        // Column names themselves are not accepted as sort keys
        assert!(FilterOrder::validate_and_parse(Some("project_name"), None, SORTS, "project_id").is_err());
    }

    #[test]
    fn rejects_unknown_order() {
        let err = FilterOrder::validate_and_parse(Some("id"), Some("sideways"), SORTS, "project_id");
        assert!(matches!(err, Err(FilterError::InvalidOrder(_))));
    }
}
