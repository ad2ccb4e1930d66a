use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Entity;
use crate::filter::{ColumnKind, Field, SqlValue};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Project {
    #[serde(rename = "ProjectID", default)]
    pub project_id: Option<i64>,
    #[serde(rename = "OwningUserID")]
    pub owning_user_id: i64,
    #[serde(rename = "ProjectName")]
    pub project_name: String,
    #[serde(rename = "CreationDate")]
    pub creation_date: DateTime<Utc>,
}

impl Project {
    pub fn new(owning_user_id: i64, project_name: impl Into<String>) -> Self {
        Self {
            project_id: None,
            owning_user_id,
            project_name: project_name.into(),
            creation_date: Utc::now(),
        }
    }
}

impl Entity for Project {
    const TABLE: &'static str = "projects";
    const ID_COLUMN: &'static str = "project_id";
    const KIND: &'static str = "Project";
    const FIELDS: &'static [Field] = &[
        Field::new("ProjectID", "project_id", ColumnKind::Int),
        Field::new("OwningUserID", "owning_user_id", ColumnKind::Int),
        Field::new("ProjectName", "project_name", ColumnKind::Text),
        Field::new("CreationDate", "creation_date", ColumnKind::Timestamp),
    ];
    const SORTS: &'static [(&'static str, &'static str)] = &[
        ("id", "project_id"),
        ("name", "project_name"),
        ("creationDate", "creation_date"),
        ("owner", "owning_user_id"),
    ];

    fn id(&self) -> Option<i64> {
        self.project_id
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("owning_user_id", SqlValue::Int(Some(self.owning_user_id))),
            ("project_name", SqlValue::Text(Some(self.project_name.clone()))),
            ("creation_date", SqlValue::Timestamp(Some(self.creation_date))),
        ]
    }
}
