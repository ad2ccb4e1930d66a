use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Entity;
use crate::filter::{ColumnKind, Field, SqlValue};

/// An account identified by the external identity provider's subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    #[serde(rename = "UserID", default)]
    pub user_id: Option<i64>,
    pub sub: String,
    pub email: String,
    pub name: String,
    pub picture: String,
    #[serde(rename = "LastLogin", default)]
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(
        sub: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
        picture: impl Into<String>,
    ) -> Self {
        Self {
            user_id: None,
            sub: sub.into(),
            email: email.into(),
            name: name.into(),
            picture: picture.into(),
            last_login: None,
        }
    }
}

impl Entity for User {
    const TABLE: &'static str = "users";
    const ID_COLUMN: &'static str = "user_id";
    const KIND: &'static str = "User";
    const FIELDS: &'static [Field] = &[
        Field::new("UserID", "user_id", ColumnKind::Int),
        Field::new("sub", "sub", ColumnKind::Text),
        Field::new("email", "email", ColumnKind::Text),
        Field::new("name", "name", ColumnKind::Text),
        Field::new("LastLogin", "last_login", ColumnKind::Timestamp),
    ];
    const SORTS: &'static [(&'static str, &'static str)] = &[
        ("id", "user_id"),
        ("name", "name"),
        ("email", "email"),
        ("lastLogin", "last_login"),
    ];

    fn id(&self) -> Option<i64> {
        self.user_id
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("sub", SqlValue::Text(Some(self.sub.clone()))),
            ("email", SqlValue::Text(Some(self.email.clone()))),
            ("name", SqlValue::Text(Some(self.name.clone()))),
            ("picture", SqlValue::Text(Some(self.picture.clone()))),
            ("last_login", SqlValue::Timestamp(self.last_login)),
        ]
    }
}
