use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Entity;
use crate::filter::{ColumnKind, Field, SqlValue};

/// A file or directory inside a project. `parent_directory = None` places
/// it at the project root. Nothing prevents a directory from being its own
/// ancestor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ProjectFile {
    #[serde(rename = "FileID", default)]
    pub file_id: Option<i64>,
    #[serde(rename = "ProjectID")]
    pub project_id: i64,
    #[serde(rename = "ParentDirectory", default)]
    pub parent_directory: Option<i64>,
    #[serde(rename = "FileName")]
    pub file_name: String,
    #[serde(rename = "IsDirectory", default)]
    pub is_directory: bool,
    #[serde(rename = "CreationDate")]
    pub creation_date: DateTime<Utc>,
}

impl ProjectFile {
    pub fn new(project_id: i64, parent_directory: Option<i64>, file_name: impl Into<String>, is_directory: bool) -> Self {
        Self {
            file_id: None,
            project_id,
            parent_directory,
            file_name: file_name.into(),
            is_directory,
            creation_date: Utc::now(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_directory.is_none()
    }
}

impl Entity for ProjectFile {
    const TABLE: &'static str = "project_files";
    const ID_COLUMN: &'static str = "file_id";
    const KIND: &'static str = "File";
    const FIELDS: &'static [Field] = &[
        Field::new("FileID", "file_id", ColumnKind::Int),
        Field::new("ProjectID", "project_id", ColumnKind::Int),
        Field::new("ParentDirectory", "parent_directory", ColumnKind::Int),
        Field::new("FileName", "file_name", ColumnKind::Text),
        Field::new("IsDirectory", "is_directory", ColumnKind::Bool),
        Field::new("CreationDate", "creation_date", ColumnKind::Timestamp),
    ];
    const SORTS: &'static [(&'static str, &'static str)] = &[
        ("id", "file_id"),
        ("name", "file_name"),
        ("creationDate", "creation_date"),
        ("project", "project_id"),
    ];

    fn id(&self) -> Option<i64> {
        self.file_id
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("project_id", SqlValue::Int(Some(self.project_id))),
            ("parent_directory", SqlValue::Int(self.parent_directory)),
            ("file_name", SqlValue::Text(Some(self.file_name.clone()))),
            ("is_directory", SqlValue::Bool(Some(self.is_directory))),
            ("creation_date", SqlValue::Timestamp(Some(self.creation_date))),
        ]
    }
}
