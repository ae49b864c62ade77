//! Reusable Query object
//!
//! Represents a complete OData query that can be executed multiple times

use super::filters::Filter;
use crate::api::constants;

#[derive(Debug, Clone)]
pub struct Query {
    pub entity: String,
    pub select: Option<Vec<String>>,
    pub filter: Option<Filter>,
}

impl Query {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            select: None,
            filter: None,
        }
    }

    /// Select specific fields
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Generate the full OData query URL, mostly useful for logging
    pub fn to_url(&self, base_url: &str) -> String {
        let mut url = constants::entity_endpoint(base_url, &self.entity);
        let mut params = Vec::new();

        if let Some(select) = &self.select {
            params.push(format!("$select={}", select.join(",")));
        }

        if let Some(filter) = &self.filter {
            params.push(format!("$filter={}", urlencoding::encode(&filter.to_odata_string())));
        }

        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.join("&"));
        }

        url
    }

    /// Query parameters in request order, for use with the HTTP client
    pub fn to_query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if let Some(select) = &self.select {
            params.push(("$select".to_string(), select.join(",")));
        }

        if let Some(filter) = &self.filter {
            params.push(("$filter".to_string(), filter.to_odata_string()));
        }

        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_query_url() {
        let query = Query::new("annotations");
        let url = query.to_url("https://test.crm.dynamics.com");
        assert_eq!(url, "https://test.crm.dynamics.com/api/data/v9.1/annotations");
    }

    #[test]
    fn test_attachment_query_url() {
        let query = Query::new("annotations")
            .select(["annotationid", "filename", "mimetype", "documentbody"])
            .with_filter(Filter::not_null("documentbody"));

        let url = query.to_url("https://test.crm.dynamics.com");
        assert_eq!(
            url,
            "https://test.crm.dynamics.com/api/data/v9.1/annotations?\
             $select=annotationid,filename,mimetype,documentbody&$filter=documentbody%20ne%20null"
        );
    }

    #[test]
    fn test_query_params_keep_order() {
        let query = Query::new("annotations")
            .select(["annotationid", "filename"])
            .with_filter(Filter::not_null("documentbody"));

        let params = query.to_query_params();
        assert_eq!(
            params,
            vec![
                ("$select".to_string(), "annotationid,filename".to_string()),
                ("$filter".to_string(), "documentbody ne null".to_string()),
            ]
        );
    }
}
