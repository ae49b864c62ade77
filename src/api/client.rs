use super::auth::AccessToken;
use super::constants::{self, headers};
use super::query::{Query, QueryResponse};
use crate::error::ExportError;
use serde_json::Value;
use std::time::Duration;

/// Build the HTTP client shared by the token and Web API requests
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, ExportError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(constants::CONNECT_TIMEOUT_SECS))
        .user_agent(constants::user_agent())
        .build()
        .map_err(|e| ExportError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Dynamics 365 Web API client bound to one organisation and one token
#[derive(Clone)]
pub struct DynamicsClient {
    base_url: String,
    http_client: reqwest::Client,
    access_token: AccessToken,
    correlation_id: String,
}

impl DynamicsClient {
    pub fn new(base_url: String, access_token: AccessToken, timeout: Duration) -> Result<Self, ExportError> {
        Ok(Self::with_custom_client(base_url, access_token, build_http_client(timeout)?))
    }

    /// Create a new client with custom HTTP client configuration
    pub fn with_custom_client(base_url: String, access_token: AccessToken, http_client: reqwest::Client) -> Self {
        Self {
            base_url,
            http_client,
            access_token,
            correlation_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = correlation_id.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Execute an OData query and return the first page of results
    pub async fn execute_query(&self, query: &Query) -> Result<QueryResponse, ExportError> {
        let url = constants::entity_endpoint(&self.base_url, &query.entity);
        let params = query.to_query_params();

        log::info!("[{}] GET {}", self.correlation_id, query.to_url(&self.base_url));

        let response = self.http_client
            .get(&url)
            .bearer_auth(self.access_token.secret())
            .header("Accept", headers::CONTENT_TYPE_JSON)
            .header(headers::X_CLIENT_REQUEST_ID, &self.correlation_id)
            .query(&params)
            .send()
            .await
            .map_err(|e| ExportError::Fetch {
                status: None,
                message: e.to_string(),
            })?;

        self.parse_query_response(response).await
    }

    async fn parse_query_response(&self, response: reqwest::Response) -> Result<QueryResponse, ExportError> {
        let status = response.status();
        let status_code = status.as_u16();
        log::debug!("[{}] Response status: {}", self.correlation_id, status);

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ExportError::Fetch {
                status: Some(status_code),
                message: error_text,
            });
        }

        let text = response.text().await.map_err(|e| ExportError::Fetch {
            status: Some(status_code),
            message: e.to_string(),
        })?;

        if text.is_empty() {
            return Err(ExportError::Fetch {
                status: Some(status_code),
                message: "Empty response from server".to_string(),
            });
        }

        let json: Value = serde_json::from_str(&text).map_err(|e| ExportError::Fetch {
            status: Some(status_code),
            message: format!("Invalid JSON response: {}", e),
        })?;

        QueryResponse::from_json(json).map_err(|e| ExportError::Fetch {
            status: Some(status_code),
            message: format!("Failed to parse OData response: {}", e),
        })
    }
}
