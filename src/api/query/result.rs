//! Query result handling
//!
//! Handles OData query responses from Dynamics 365

use serde_json::Value;

#[derive(Debug, Clone)]
pub struct QueryResponse {
    pub value: Vec<Value>,
    pub next_link: Option<String>,
}

impl QueryResponse {
    /// Parse OData response JSON into QueryResponse
    pub fn from_json(json: Value) -> anyhow::Result<Self> {
        let value = json.get("value")
            .and_then(|v| v.as_array())
            .ok_or_else(|| anyhow::anyhow!("Missing or invalid 'value' array in response"))?
            .clone();

        let next_link = json.get("@odata.nextLink")
            .and_then(|n| n.as_str())
            .map(|s| s.to_string());

        Ok(Self {
            value,
            next_link,
        })
    }

    /// Check if the server has more pages than the one returned
    pub fn has_more(&self) -> bool {
        self.next_link.is_some()
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}
