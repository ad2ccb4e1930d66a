use std::time::Instant;

use async_trait::async_trait;
use sqlx::Row;

use super::manager::{DatabaseError, DatabaseManager};
use super::models::Entity;
use super::query_builder::{bind_param_query, bind_param_query_as, QueryBuilder};
use crate::filter::Filter;

/// Unique-key violations are the caller's mistake, everything else is ours.
fn write_error(err: sqlx::Error) -> DatabaseError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            DatabaseError::Conflict(db.constraint().unwrap_or("unique key").to_string())
        }
        _ => DatabaseError::Sqlx(err),
    }
}

/// Raw persistence for one entity type. Every call either succeeds or
/// reports the store failure; policy (fail soft vs. hard) lives in
/// [`super::Repository`].
#[async_trait]
pub trait EntityStore<E: Entity>: Send + Sync {
    async fn fetch(&self, id: i64) -> Result<Option<E>, DatabaseError>;

    /// Rows matching `filter`, ordered and windowed by it.
    async fn fetch_page(&self, filter: &Filter) -> Result<Vec<E>, DatabaseError>;

    /// Rows matching `filter`'s predicate, ignoring its page window.
    async fn count(&self, filter: &Filter) -> Result<i64, DatabaseError>;

    async fn insert(&self, entity: &E) -> Result<E, DatabaseError>;

    /// Overwrite the stored row with `entity`'s values. Fails with
    /// `NotFound` when no row has that key.
    async fn update(&self, entity: &E) -> Result<E, DatabaseError>;

    /// `true` when a row was removed.
    async fn delete(&self, id: i64) -> Result<bool, DatabaseError>;
}

#[async_trait]
impl<E: Entity> EntityStore<E> for DatabaseManager {
    async fn fetch(&self, id: i64) -> Result<Option<E>, DatabaseError> {
        let _permit = self.admit()?;
        let sql = QueryBuilder::<E>::select_by_id();
        let started = Instant::now();
        let row = sqlx::query_as::<_, E>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        self.log_query(&sql, started);
        Ok(row)
    }

    async fn fetch_page(&self, filter: &Filter) -> Result<Vec<E>, DatabaseError> {
        let sql_result = filter.to_sql(E::TABLE, E::ID_COLUMN)?;
        let _permit = self.admit()?;
        let started = Instant::now();
        let mut q = sqlx::query_as::<_, E>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let rows = q.fetch_all(self.pool()).await?;
        self.log_query(&sql_result.query, started);
        Ok(rows)
    }

    async fn count(&self, filter: &Filter) -> Result<i64, DatabaseError> {
        let sql_result = filter.to_count_sql(E::TABLE)?;
        let _permit = self.admit()?;
        let started = Instant::now();
        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(self.pool()).await?;
        self.log_query(&sql_result.query, started);
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }

    async fn insert(&self, entity: &E) -> Result<E, DatabaseError> {
        let sql_result = QueryBuilder::<E>::insert(entity);
        let _permit = self.admit()?;
        let started = Instant::now();
        let mut q = sqlx::query_as::<_, E>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let row = q.fetch_one(self.pool()).await.map_err(write_error)?;
        self.log_query(&sql_result.query, started);
        Ok(row)
    }

    async fn update(&self, entity: &E) -> Result<E, DatabaseError> {
        let id = entity
            .id()
            .ok_or_else(|| DatabaseError::QueryError(format!("cannot update unsaved {}", E::KIND)))?;
        let sql_result = QueryBuilder::<E>::update(entity, id);
        let _permit = self.admit()?;
        let started = Instant::now();
        let mut q = sqlx::query_as::<_, E>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let row = q.fetch_optional(self.pool()).await.map_err(write_error)?;
        self.log_query(&sql_result.query, started);
        row.ok_or_else(|| DatabaseError::NotFound(format!("{} {}", E::KIND, id)))
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        let sql = QueryBuilder::<E>::delete_by_id();
        let _permit = self.admit()?;
        let started = Instant::now();
        let result = sqlx::query(&sql).bind(id).execute(self.pool()).await?;
        self.log_query(&sql, started);
        Ok(result.rows_affected() > 0)
    }
}

/// Connectivity probe behind `/health`.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn ping(&self) -> Result<(), DatabaseError>;
}

#[async_trait]
impl HealthCheck for DatabaseManager {
    async fn ping(&self) -> Result<(), DatabaseError> {
        self.health_check().await
    }
}
