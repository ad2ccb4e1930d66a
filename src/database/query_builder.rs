use sqlx::{self, postgres::PgArguments, postgres::PgRow, FromRow};

use crate::database::models::Entity;
use crate::filter::types::{SqlResult, SqlValue};

/// Renders the single-row statements for an entity. List queries come from
/// [`crate::filter::Filter`]; both share the binding helpers below.
pub struct QueryBuilder<E> {
    _phantom: std::marker::PhantomData<E>,
}

impl<E: Entity> QueryBuilder<E> {
    pub fn select_by_id() -> String {
        format!("SELECT * FROM \"{}\" WHERE \"{}\" = $1", E::TABLE, E::ID_COLUMN)
    }

    pub fn insert(entity: &E) -> SqlResult {
        let values = entity.values();
        let columns: Vec<String> = values.iter().map(|(c, _)| format!("\"{}\"", c)).collect();
        let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("${}", i)).collect();
        SqlResult {
            query: format!(
                "INSERT INTO \"{}\" ({}) VALUES ({}) RETURNING *",
                E::TABLE,
                columns.join(", "),
                placeholders.join(", ")
            ),
            params: values.into_iter().map(|(_, v)| v).collect(),
        }
    }

    /// Full-row update keyed by `id`; the key itself is the last parameter.
    pub fn update(entity: &E, id: i64) -> SqlResult {
        let values = entity.values();
        let assignments: Vec<String> = values
            .iter()
            .enumerate()
            .map(|(i, (c, _))| format!("\"{}\" = ${}", c, i + 1))
            .collect();
        let query = format!(
            "UPDATE \"{}\" SET {} WHERE \"{}\" = ${} RETURNING *",
            E::TABLE,
            assignments.join(", "),
            E::ID_COLUMN,
            values.len() + 1
        );
        let mut params: Vec<SqlValue> = values.into_iter().map(|(_, v)| v).collect();
        params.push(SqlValue::Int(Some(id)));
        SqlResult { query, params }
    }

    pub fn delete_by_id() -> String {
        format!("DELETE FROM \"{}\" WHERE \"{}\" = $1", E::TABLE, E::ID_COLUMN)
    }
}

pub fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &SqlValue,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v.clone() {
        SqlValue::Int(i) => q.bind(i),
        SqlValue::Text(s) => q.bind(s),
        SqlValue::Bool(b) => q.bind(b),
        SqlValue::Timestamp(t) => q.bind(t),
    }
}

pub fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &SqlValue,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match v.clone() {
        SqlValue::Int(i) => q.bind(i),
        SqlValue::Text(s) => q.bind(s),
        SqlValue::Bool(b) => q.bind(b),
        SqlValue::Timestamp(t) => q.bind(t),
    }
}
