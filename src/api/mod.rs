//! Dynamics 365 Web API access
//!
//! Token acquisition against Azure AD and the OData query client used to list
//! annotations.

pub mod auth;
pub mod client;
pub mod constants;
pub mod query;

pub use auth::{AccessToken, TokenClient};
pub use client::{DynamicsClient, build_http_client};
pub use query::{Filter, Query, QueryResponse};
