//! Google OpenID Connect sign-in (authorization-code flow).

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};
use url::form_urlencoded;

use super::{AuthError, Profile};
use crate::config::OAuthConfig;

const AUTHORIZE_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// External identity verification.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Where to send the browser to start a sign-in carrying `state`.
    fn authorize_url(&self, state: &str) -> String;

    /// Exchange the callback's authorization code for a verified profile.
    async fn verify_identity(&self, code: &str) -> Result<Profile, AuthError>;
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

pub struct GoogleProvider {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_url: String,
}

impl GoogleProvider {
    pub fn new(config: &OAuthConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            redirect_url: config.redirect_url.clone(),
        }
    }

    async fn exchange_code(&self, code: &str) -> Result<String, AuthError> {
        let response = self
            .http
            .post(TOKEN_ENDPOINT)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AuthError::Provider(format!("token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "Google token exchange rejected: {}", body);
            return Err(AuthError::Provider(format!("token exchange returned {}", status)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Provider(format!("malformed token response: {}", e)))?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn authorize_url(&self, state: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_url)
            .append_pair("response_type", "code")
            .append_pair("scope", "openid email profile")
            .append_pair("state", state)
            .finish();
        format!("{}?{}", AUTHORIZE_ENDPOINT, query)
    }

    async fn verify_identity(&self, code: &str) -> Result<Profile, AuthError> {
        let access_token = self.exchange_code(code).await?;

        let response = self
            .http
            .get(USERINFO_ENDPOINT)
            .bearer_auth(&access_token)
            .send()
            .await
            .map_err(|e| AuthError::Provider(format!("userinfo request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AuthError::Provider(format!("userinfo returned {}", response.status())));
        }

        let profile: Profile = response
            .json()
            .await
            .map_err(|e| AuthError::Provider(format!("malformed userinfo: {}", e)))?;
        info!(sub = %profile.sub, "Verified Google identity");
        Ok(profile)
    }
}
