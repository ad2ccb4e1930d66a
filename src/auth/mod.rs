pub mod google;

pub use google::{GoogleProvider, IdentityProvider};

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::database::models::ActiveToken;
use crate::database::DatabaseError;

/// Identity attributes asserted by the external provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub sub: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub picture: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Not signed in")]
    MissingSession,

    #[error("Invalid session token")]
    InvalidToken,

    #[error("Session expired")]
    Expired,

    #[error("OAuth state mismatch")]
    StateMismatch,

    #[error("Identity provider rejected the request: {0}")]
    Provider(String),

    #[error("Failed to sign session token: {0}")]
    TokenGeneration(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Session token payload: the user and the active token backing the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub tid: i64,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Claims expiring together with `token`.
    pub fn for_token(token: &ActiveToken) -> Result<Self, AuthError> {
        let tid = token
            .token_id
            .ok_or_else(|| AuthError::TokenGeneration("token has not been stored".to_string()))?;
        Ok(Self {
            sub: token.user_id,
            tid,
            iat: Utc::now().timestamp(),
            exp: (token.creation_date + Duration::seconds(token.ttl)).timestamp(),
        })
    }
}

pub fn encode_session(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::TokenGeneration("signing secret is empty".to_string()));
    }
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

pub fn decode_session(token: &str, secret: &str) -> Result<Claims, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::InvalidToken);
    }
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::InvalidToken,
        })
}
