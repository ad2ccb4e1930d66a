// handlers/auth.rs - Google sign-in and session endpoints

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{encode_session, AuthError, Claims};
use crate::config::AppConfig;
use crate::database::models::{ActiveToken, User};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentSession};
use crate::state::AppState;

pub const OAUTH_STATE_COOKIE: &str = "oauth_state";

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

fn found(location: &str, jar: CookieJar) -> Response {
    (StatusCode::FOUND, jar, [(header::LOCATION, location.to_string())]).into_response()
}

fn cookie(config: &AppConfig, name: &str, value: String) -> Cookie<'static> {
    Cookie::build((name.to_string(), value))
        .path("/")
        .http_only(true)
        .secure(config.security.cookie_secure)
        .same_site(SameSite::Lax)
        .build()
}

fn removal(name: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), String::new())).path("/").build()
}

/// GET /auth/google - start the authorization-code flow
pub async fn google_login(State(state): State<AppState>, jar: CookieJar) -> Response {
    let csrf = Uuid::new_v4().to_string();
    let url = state.identity.authorize_url(&csrf);
    info!("Redirecting to identity provider");
    let jar = jar.add(cookie(&state.config, OAUTH_STATE_COOKIE, csrf));
    found(&url, jar)
}

/// GET /auth/google/callback - verify identity, open a session, redirect
pub async fn google_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<Response, ApiError> {
    if let Some(error) = params.error {
        warn!(%error, "Identity provider returned an error");
        return Err(AuthError::Provider(error).into());
    }

    let expected = jar.get(OAUTH_STATE_COOKIE).map(|c| c.value().to_string());
    match (expected, params.state) {
        (Some(expected), Some(actual)) if expected == actual => {}
        _ => return Err(AuthError::StateMismatch.into()),
    }

    let code = params
        .code
        .ok_or_else(|| AuthError::Provider("missing authorization code".to_string()))?;
    let profile = state.identity.verify_identity(&code).await?;
    let user = state.users.find_or_create_by_subject(&profile).await?;
    let user_id = user
        .user_id
        .ok_or_else(|| ApiError::internal_server_error("User was not persisted"))?;

    let token = state
        .tokens
        .create(ActiveToken::new(user_id, state.config.security.token_ttl_secs))
        .await?;
    let jwt = encode_session(&Claims::for_token(&token)?, &state.config.security.jwt_secret)?;
    info!(user_id, token_id = ?token.token_id, "Signed in");

    let jar = jar
        .remove(removal(OAUTH_STATE_COOKIE))
        .add(cookie(&state.config, &state.config.security.session_cookie, jwt));
    Ok(found(&state.config.oauth.success_redirect, jar))
}

/// GET /auth/whoami
pub async fn whoami(session: CurrentSession) -> ApiResult<User> {
    Ok(ApiResponse::success(session.user))
}

/// POST /auth/logout - revoke the backing token (if any) and clear the cookie
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    session: Option<CurrentSession>,
) -> Result<Response, ApiError> {
    if let Some(token_id) = session.and_then(|s| s.token.token_id) {
        state.tokens.delete_by_id(token_id).await?;
        info!(token_id, "Signed out");
    }
    let jar = jar.remove(removal(&state.config.security.session_cookie));
    Ok((StatusCode::NO_CONTENT, jar).into_response())
}
