//! API Constants and Configuration for the Dynamics 365 Web API and Azure AD

/// Dynamics 365 Web API version
pub const API_VERSION: &str = "v9.1";

/// Base API path for Dynamics 365
pub const API_BASE_PATH: &str = "/api/data";

/// Entity set holding notes and their attachments
pub const ANNOTATIONS_ENTITY: &str = "annotations";

/// Default Azure AD authority for the client-credentials grant
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Connection timeout in seconds
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Standard headers for Dynamics 365 requests
pub mod headers {
    /// Accept header for JSON responses
    pub const CONTENT_TYPE_JSON: &str = "application/json";

    /// Content type of the token request body
    pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

    /// Client request id, echoed back by Dynamics for support correlation
    pub const X_CLIENT_REQUEST_ID: &str = "x-ms-client-request-id";
}

/// Full API path with version
pub fn api_path() -> String {
    format!("{}/{}", API_BASE_PATH, API_VERSION)
}

/// Build full entity endpoint URL
pub fn entity_endpoint(base_url: &str, entity: &str) -> String {
    format!("{}{}/{}", base_url.trim_end_matches('/'), api_path(), entity)
}

/// Build the OAuth2 token endpoint for a tenant
pub fn token_endpoint(authority: &str, tenant_id: &str) -> String {
    format!("{}/{}/oauth2/token", authority.trim_end_matches('/'), tenant_id)
}

/// User agent sent with every request
pub fn user_agent() -> String {
    format!("annotation-export/{}", env!("CARGO_PKG_VERSION"))
}
