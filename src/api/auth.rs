use std::fmt;

use super::constants;
use crate::auth::Credentials;
use crate::error::ExportError;

/// Bearer token for a single run; never written to disk
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for the `Authorization` header only
    pub fn secret(&self) -> &str {
        &self.0
    }

    /// Short, log-safe description of the token
    pub fn redacted(&self) -> String {
        let prefix: String = self.0.chars().take(6).collect();
        format!("{}… ({} chars)", prefix, self.0.chars().count())
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken({})", self.redacted())
    }
}

/// Azure AD client-credentials token client
pub struct TokenClient {
    http_client: reqwest::Client,
    authority: String,
}

impl TokenClient {
    pub fn new(http_client: reqwest::Client, authority: impl Into<String>) -> Self {
        Self {
            http_client,
            authority: authority.into(),
        }
    }

    pub fn token_url(&self, tenant_id: &str) -> String {
        constants::token_endpoint(&self.authority, tenant_id)
    }

    /// Request a token, returning the failure reason on error
    pub async fn request_token(&self, credentials: &Credentials) -> Result<AccessToken, ExportError> {
        let token_url = self.token_url(&credentials.tenant_id);
        log::info!("Requesting access token from {}", token_url);

        let response = self
            .http_client
            .post(&token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
                ("resource", credentials.resource.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ExportError::Auth(e.to_string()))?;

        let status = response.status();
        log::debug!("Token request status: {}", status);

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ExportError::Auth(format!("HTTP {}: {}", status.as_u16(), error_text)));
        }

        let token_data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ExportError::Auth(format!("Invalid token response: {}", e)))?;

        token_data
            .get("access_token")
            .and_then(|t| t.as_str())
            .map(AccessToken::new)
            .ok_or_else(|| ExportError::Auth("No access token in response".to_string()))
    }

    /// Request a token, logging any failure and yielding `None` instead
    pub async fn obtain_token(&self, credentials: &Credentials) -> Option<AccessToken> {
        match self.request_token(credentials).await {
            Ok(token) => {
                log::info!("Access token obtained: {}", token.redacted());
                Some(token)
            }
            Err(e) => {
                log::error!("Error fetching token: {}", e);
                None
            }
        }
    }
}
