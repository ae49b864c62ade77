//! OData query construction for the Dynamics 365 Web API
//!
//! `Query` is a reusable description of a `$select`/`$filter` request,
//! `QueryResponse` is the parsed `value` envelope that comes back.

pub mod filters;
pub mod query;
pub mod result;

pub use filters::Filter;
pub use query::Query;
pub use result::QueryResponse;
