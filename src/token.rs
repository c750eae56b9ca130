use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use tracing::debug;

/// Long-lived client credentials plus the refresh token they unlock.
/// Loaded once at startup and never sent to the browser.
#[derive(Clone, Default)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    fn basic_auth_header(&self) -> String {
        format!(
            "Basic {}",
            general_purpose::STANDARD.encode(format!("{}:{}", self.client_id, self.client_secret))
        )
    }
}

/// Short-lived bearer credential. Its lifetime is not tracked: a new one is
/// requested for every incoming call.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Failed to send token request: {0}")]
    FailedToSendRequest(#[source] reqwest::Error),
    #[error("Token endpoint rejected refresh: {status} - {body}")]
    Rejected { status: u16, body: String },
    #[error("Failed to parse token response: {0}")]
    FailedToParseResponse(#[source] reqwest::Error),
}

#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Exchange the stored refresh credential for a fresh access token.
    async fn access_token(&self) -> Result<AccessToken, AuthError>;
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// OAuth2 refresh-token grant against `{auth_base}/api/token`.
pub struct RefreshTokenProvider {
    client: Client,
    credentials: Credentials,
    auth_base: String,
}

impl RefreshTokenProvider {
    pub fn new(client: Client, credentials: Credentials, auth_base: impl Into<String>) -> Self {
        Self {
            client,
            credentials,
            auth_base: auth_base.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl TokenProvider for RefreshTokenProvider {
    async fn access_token(&self) -> Result<AccessToken, AuthError> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", self.credentials.refresh_token.as_str()),
        ];
        let url = format!("{}/api/token", self.auth_base);
        let resp = self
            .client
            .post(&url)
            .header(AUTHORIZATION, self.credentials.basic_auth_header())
            .form(&params)
            .send()
            .await
            .map_err(AuthError::FailedToSendRequest)?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        let tr: TokenResponse = resp
            .json()
            .await
            .map_err(AuthError::FailedToParseResponse)?;
        debug!("obtained access token via refresh grant");
        Ok(AccessToken::new(tr.access_token))
    }
}

/// Hands out the same token every time. Used with the in-memory catalog.
pub struct StaticTokenProvider {
    token: AccessToken,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: AccessToken::new(token),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<AccessToken, AuthError> {
        Ok(self.token.clone())
    }
}
