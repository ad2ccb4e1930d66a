pub mod active_token;
pub mod project;
pub mod project_file;
pub mod user;

pub use active_token::ActiveToken;
pub use project::Project;
pub use project_file::ProjectFile;
pub use user::User;

use serde::{de::DeserializeOwned, Serialize};
use sqlx::{postgres::PgRow, FromRow};

use crate::filter::{Field, SqlValue};

/// A table-backed record with a store-assigned integer key.
///
/// The associated constants are the allow-lists that user input is
/// checked against before anything reaches SQL.
pub trait Entity:
    for<'r> FromRow<'r, PgRow> + Serialize + DeserializeOwned + Clone + PartialEq + Send + Sync + Unpin + 'static
{
    const TABLE: &'static str;
    const ID_COLUMN: &'static str;
    /// Human-readable name used in error messages
    const KIND: &'static str;
    /// Filterable attributes keyed by their JSON name
    const FIELDS: &'static [Field];
    /// `sort` query keys mapped to columns
    const SORTS: &'static [(&'static str, &'static str)];

    fn id(&self) -> Option<i64>;

    /// Every non-key column with its current value, in insert order.
    fn values(&self) -> Vec<(&'static str, SqlValue)>;
}
