// handlers/user_tokens.rs - /user_tokens collection

use axum::extract::{rejection::JsonRejection, Path, RawQuery, State};
use axum::Json;
use serde::Deserialize;

use super::crud;
use crate::api::ListResponse;
use crate::database::models::ActiveToken;
use crate::error::ApiError;
use crate::middleware::ApiResult;
use crate::state::AppState;

const PATH: &str = "/user_tokens";

#[derive(Debug, Default, Deserialize)]
pub struct TokenBody {
    #[serde(rename = "UserID")]
    pub user_id: Option<i64>,
    #[serde(rename = "TTL")]
    pub ttl: Option<i64>,
}

/// GET /user_tokens
pub async fn list(State(state): State<AppState>, RawQuery(query): RawQuery) -> ApiResult<ListResponse<ActiveToken>> {
    crud::list(&state.tokens, &state.config, PATH, query.as_deref()).await
}

/// GET /user_tokens/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<ActiveToken> {
    crud::show(&state.tokens, &id).await
}

/// POST /user_tokens - TTL falls back to the configured session lifetime
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<TokenBody>, JsonRejection>,
) -> ApiResult<ActiveToken> {
    let body = crud::body(payload)?;
    let user_id = body.user_id.ok_or_else(|| ApiError::missing_fields(&["UserID"]))?;
    let ttl = body.ttl.unwrap_or(state.config.security.token_ttl_secs);
    if ttl <= 0 {
        return Err(ApiError::bad_request("TTL must be a positive number of seconds"));
    }
    crud::create(&state.tokens, &state.config, PATH, ActiveToken::new(user_id, ttl)).await
}

/// PUT /user_tokens/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TokenBody>, JsonRejection>,
) -> ApiResult<ActiveToken> {
    let body = crud::body(payload)?;
    if matches!(body.ttl, Some(ttl) if ttl <= 0) {
        return Err(ApiError::bad_request("TTL must be a positive number of seconds"));
    }
    crud::update(&state.tokens, &id, |token| {
        if let Some(user_id) = body.user_id {
            token.set(|t| &mut t.user_id, user_id);
        }
        if let Some(ttl) = body.ttl {
            token.set(|t| &mut t.ttl, ttl);
        }
    })
    .await
}

/// DELETE /user_tokens/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    crud::delete(&state.tokens, &id).await
}
