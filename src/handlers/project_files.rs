// handlers/project_files.rs - /project_files collection

use axum::extract::{rejection::JsonRejection, Path, RawQuery, State};
use axum::Json;
use serde::Deserialize;

use super::crud::{self, double_option};
use crate::api::ListResponse;
use crate::database::models::ProjectFile;
use crate::error::ApiError;
use crate::middleware::ApiResult;
use crate::state::AppState;

const PATH: &str = "/project_files";

#[derive(Debug, Default, Deserialize)]
pub struct ProjectFileBody {
    #[serde(rename = "ProjectID")]
    pub project_id: Option<i64>,
    /// `null` moves the file to the project root
    #[serde(rename = "ParentDirectory", default, deserialize_with = "double_option")]
    pub parent_directory: Option<Option<i64>>,
    #[serde(rename = "FileName")]
    pub file_name: Option<String>,
    #[serde(rename = "IsDirectory")]
    pub is_directory: Option<bool>,
}

/// GET /project_files
pub async fn list(State(state): State<AppState>, RawQuery(query): RawQuery) -> ApiResult<ListResponse<ProjectFile>> {
    crud::list(&state.files, &state.config, PATH, query.as_deref()).await
}

/// GET /project_files/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<ProjectFile> {
    crud::show(&state.files, &id).await
}

/// POST /project_files
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<ProjectFileBody>, JsonRejection>,
) -> ApiResult<ProjectFile> {
    let body = crud::body(payload)?;
    let (project_id, file_name) = match (body.project_id, body.file_name) {
        (Some(project_id), Some(file_name)) => (project_id, file_name),
        (project_id, file_name) => {
            let mut missing = vec![];
            if project_id.is_none() {
                missing.push("ProjectID");
            }
            if file_name.is_none() {
                missing.push("FileName");
            }
            return Err(ApiError::missing_fields(&missing));
        }
    };
    let file = ProjectFile::new(
        project_id,
        body.parent_directory.flatten(),
        file_name,
        body.is_directory.unwrap_or(false),
    );
    crud::create(&state.files, &state.config, PATH, file).await
}

/// PUT /project_files/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ProjectFileBody>, JsonRejection>,
) -> ApiResult<ProjectFile> {
    let body = crud::body(payload)?;
    crud::update(&state.files, &id, |file| {
        if let Some(project_id) = body.project_id {
            file.set(|f| &mut f.project_id, project_id);
        }
        if let Some(parent) = body.parent_directory {
            file.set(|f| &mut f.parent_directory, parent);
        }
        if let Some(name) = body.file_name {
            file.set(|f| &mut f.file_name, name);
        }
        if let Some(is_directory) = body.is_directory {
            file.set(|f| &mut f.is_directory, is_directory);
        }
    })
    .await
}

/// DELETE /project_files/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    crud::delete(&state.files, &id).await
}
