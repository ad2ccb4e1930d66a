// handlers/projects.rs - /projects collection

use axum::extract::{rejection::JsonRejection, Path, RawQuery, State};
use axum::Json;
use serde::Deserialize;

use super::crud;
use crate::api::ListResponse;
use crate::database::models::Project;
use crate::error::ApiError;
use crate::middleware::ApiResult;
use crate::state::AppState;

const PATH: &str = "/projects";

#[derive(Debug, Default, Deserialize)]
pub struct ProjectBody {
    #[serde(rename = "OwningUserID")]
    pub owning_user_id: Option<i64>,
    #[serde(rename = "ProjectName")]
    pub project_name: Option<String>,
}

/// GET /projects
pub async fn list(State(state): State<AppState>, RawQuery(query): RawQuery) -> ApiResult<ListResponse<Project>> {
    crud::list(&state.projects, &state.config, PATH, query.as_deref()).await
}

/// GET /projects/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Project> {
    crud::show(&state.projects, &id).await
}

/// POST /projects
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<ProjectBody>, JsonRejection>,
) -> ApiResult<Project> {
    match crud::body(payload)? {
        ProjectBody { owning_user_id: Some(owner), project_name: Some(name) } => {
            crud::create(&state.projects, &state.config, PATH, Project::new(owner, name)).await
        }
        ProjectBody { owning_user_id, project_name } => {
            let mut missing = vec![];
            if owning_user_id.is_none() {
                missing.push("OwningUserID");
            }
            if project_name.is_none() {
                missing.push("ProjectName");
            }
            Err(ApiError::missing_fields(&missing))
        }
    }
}

/// PUT /projects/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ProjectBody>, JsonRejection>,
) -> ApiResult<Project> {
    let body = crud::body(payload)?;
    crud::update(&state.projects, &id, |project| {
        if let Some(owner) = body.owning_user_id {
            project.set(|p| &mut p.owning_user_id, owner);
        }
        if let Some(name) = body.project_name {
            project.set(|p| &mut p.project_name, name);
        }
    })
    .await
}

/// DELETE /projects/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    crud::delete(&state.projects, &id).await
}
