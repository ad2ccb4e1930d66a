// handlers/users.rs - /users collection

use axum::extract::{rejection::JsonRejection, Path, RawQuery, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::crud;
use crate::api::ListResponse;
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::ApiResult;
use crate::state::AppState;

const PATH: &str = "/users";

#[derive(Debug, Default, Deserialize)]
pub struct UserBody {
    pub sub: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
    #[serde(rename = "LastLogin")]
    pub last_login: Option<DateTime<Utc>>,
}

/// GET /users
pub async fn list(State(state): State<AppState>, RawQuery(query): RawQuery) -> ApiResult<ListResponse<User>> {
    crud::list(&state.users, &state.config, PATH, query.as_deref()).await
}

/// GET /users/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<User> {
    crud::show(&state.users, &id).await
}

/// POST /users
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<UserBody>, JsonRejection>,
) -> ApiResult<User> {
    let body = crud::body(payload)?;
    let missing: Vec<&str> = [
        ("sub", body.sub.is_none()),
        ("email", body.email.is_none()),
        ("name", body.name.is_none()),
        ("picture", body.picture.is_none()),
    ]
    .into_iter()
    .filter_map(|(field, absent)| absent.then_some(field))
    .collect();

    match body {
        UserBody { sub: Some(sub), email: Some(email), name: Some(name), picture: Some(picture), last_login } => {
            let mut user = User::new(sub, email, name, picture);
            user.last_login = last_login;
            crud::create(&state.users, &state.config, PATH, user).await
        }
        _ => Err(ApiError::missing_fields(&missing)),
    }
}

/// PUT /users/:id - partial update
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UserBody>, JsonRejection>,
) -> ApiResult<User> {
    let body = crud::body(payload)?;
    crud::update(&state.users, &id, |user| {
        if let Some(sub) = body.sub {
            user.set(|u| &mut u.sub, sub);
        }
        if let Some(email) = body.email {
            user.set(|u| &mut u.email, email);
        }
        if let Some(name) = body.name {
            user.set(|u| &mut u.name, name);
        }
        if let Some(picture) = body.picture {
            user.set(|u| &mut u.picture, picture);
        }
        if let Some(last_login) = body.last_login {
            user.set(|u| &mut u.last_login, Some(last_login));
        }
    })
    .await
}

/// DELETE /users/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    crud::delete(&state.users, &id).await
}
