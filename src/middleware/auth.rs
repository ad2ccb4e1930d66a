use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;

use crate::auth::{decode_session, AuthError};
use crate::database::models::{ActiveToken, User};
use crate::error::ApiError;
use crate::state::AppState;

/// The signed-in user, resolved from the session cookie or a Bearer token.
///
/// Resolution: verify the JWT, load the active token it names, check that
/// token is still valid and belongs to the claimed user, then load the user.
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub user: User,
    pub token: ActiveToken,
}

/// Raw session JWT from the request, cookie first.
pub fn session_token(parts: &Parts, cookie_name: &str) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(cookie_name) {
        return Some(cookie.value().to_string());
    }
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
}

pub async fn resolve_session(state: &AppState, jwt: &str) -> Result<CurrentSession, AuthError> {
    let claims = decode_session(jwt, &state.config.security.jwt_secret)?;

    let token = state.tokens.find_by_id(claims.tid).await.ok_or(AuthError::InvalidToken)?;
    if token.user_id != claims.sub {
        return Err(AuthError::InvalidToken);
    }
    if !token.is_valid() {
        return Err(AuthError::Expired);
    }

    let user = state.users.find_by_id(claims.sub).await.ok_or(AuthError::InvalidToken)?;
    Ok(CurrentSession { user, token })
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jwt = session_token(parts, &state.config.security.session_cookie).ok_or(AuthError::MissingSession)?;
        Ok(resolve_session(state, &jwt).await?)
    }
}
