use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Entity;
use crate::filter::{ColumnKind, Field, SqlValue};

pub const DEFAULT_TTL_SECS: i64 = 3600;

fn default_ttl() -> i64 {
    DEFAULT_TTL_SECS
}

/// A login session owned by a user, valid for `ttl` seconds after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ActiveToken {
    #[serde(rename = "TokenID", default)]
    pub token_id: Option<i64>,
    #[serde(rename = "UserID")]
    pub user_id: i64,
    #[serde(rename = "TTL", default = "default_ttl")]
    pub ttl: i64,
    #[serde(rename = "CreationDate")]
    pub creation_date: DateTime<Utc>,
}

impl ActiveToken {
    pub fn new(user_id: i64, ttl: i64) -> Self {
        Self {
            token_id: None,
            user_id,
            ttl,
            creation_date: Utc::now(),
        }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now - self.creation_date < Duration::seconds(self.ttl)
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }
}

impl Entity for ActiveToken {
    const TABLE: &'static str = "active_tokens";
    const ID_COLUMN: &'static str = "token_id";
    const KIND: &'static str = "Token";
    const FIELDS: &'static [Field] = &[
        Field::new("TokenID", "token_id", ColumnKind::Int),
        Field::new("UserID", "user_id", ColumnKind::Int),
        Field::new("TTL", "ttl", ColumnKind::Int),
        Field::new("CreationDate", "creation_date", ColumnKind::Timestamp),
    ];
    const SORTS: &'static [(&'static str, &'static str)] = &[
        ("id", "token_id"),
        ("userId", "user_id"),
        ("creationDate", "creation_date"),
    ];

    fn id(&self) -> Option<i64> {
        self.token_id
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("user_id", SqlValue::Int(Some(self.user_id))),
            ("ttl", SqlValue::Int(Some(self.ttl))),
            ("creation_date", SqlValue::Timestamp(Some(self.creation_date))),
        ]
    }
}
