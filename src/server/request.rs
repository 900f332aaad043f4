use http::Method;
use serde_json::{Map, Value};

use crate::router::strip_query;

/// The request facets the validator reads and writes.
///
/// `params` and `query` are overwritten by the validator before the composite
/// schema is checked, so downstream stages see exactly what was validated.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundRequest {
    /// HTTP method (GET, POST, etc.)
    pub method: Method,
    /// Request path without query string
    pub path: String,
    /// Original request target: path plus query string
    pub url: String,
    /// Parsed JSON body, if one was sent
    pub body: Option<Value>,
    /// Path parameters
    pub params: Map<String, Value>,
    /// Query string parameters
    pub query: Map<String, Value>,
}

impl InboundRequest {
    /// Build a request from a method and a request target such as `/items/42?x=1`.
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            method,
            path: strip_query(&url).to_string(),
            url,
            body: None,
            params: Map::new(),
            query: Map::new(),
        }
    }

    /// Like [`InboundRequest::new`] but parses the method name, in any case.
    pub fn parse(method: &str, url: impl Into<String>) -> Result<Self, http::method::InvalidMethod> {
        let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())?;
        Ok(Self::new(method, url))
    }

    /// Attach a parsed JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Get a path parameter by name
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    /// Get a query parameter by name
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&Value> {
        self.query.get(name)
    }

    /// The object validated against the composite schema:
    /// `{ "body": .., "params": {..}, "query": {..} }`, `body` omitted when absent.
    #[must_use]
    pub fn facets(&self) -> Value {
        let mut facets = Map::with_capacity(3);
        if let Some(body) = &self.body {
            facets.insert("body".to_string(), body.clone());
        }
        facets.insert("params".to_string(), Value::Object(self.params.clone()));
        facets.insert("query".to_string(), Value::Object(self.query.clone()));
        Value::Object(facets)
    }
}

/// Parse query string parameters from a URL
///
/// Extracts everything after the `?` character and URL-decodes parameter names
/// and values. A name that repeats collects its values, in order, into an array.
///
/// # Arguments
///
/// * `url` - The full request target (e.g., `/users?limit=10&offset=20`)
///
/// # Returns
///
/// A map of query parameter names to string values (or arrays of strings)
#[must_use]
pub fn parse_query_params(url: &str) -> Map<String, Value> {
    let mut params = Map::new();
    let Some((_, query_str)) = url.split_once('?') else {
        return params;
    };
    for (k, v) in url::form_urlencoded::parse(query_str.as_bytes()) {
        let value = Value::String(v.into_owned());
        match params.get_mut(k.as_ref()) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                params.insert(k.into_owned(), value);
            }
        }
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_splits_path_from_url() {
        let req = InboundRequest::new(Method::GET, "/items/42?verbose=true");
        assert_eq!(req.path, "/items/42");
        assert_eq!(req.url, "/items/42?verbose=true");
        assert!(req.body.is_none());
    }

    #[test]
    fn test_parse_method_any_case() {
        let req = InboundRequest::parse("post", "/items").unwrap();
        assert_eq!(req.method, Method::POST);
        assert!(InboundRequest::parse("bad method", "/").is_err());
    }

    #[test]
    fn test_parse_query_params() {
        let q = parse_query_params("/search?q=hello%20world&limit=10&limit=20&flag");
        assert_eq!(q.get("q"), Some(&json!("hello world")));
        assert_eq!(q.get("limit"), Some(&json!(["10", "20"])));
        assert_eq!(q.get("flag"), Some(&json!("")));
        assert!(parse_query_params("/search").is_empty());
    }

    #[test]
    fn test_repeated_query_names_collect_in_order() {
        let q = parse_query_params("/s?tags=a&x=1&tags=b&tags=c");
        assert_eq!(q.get("tags"), Some(&json!(["a", "b", "c"])));
        assert_eq!(q.get("x"), Some(&json!("1")));
    }

    #[test]
    fn test_facets_omit_missing_body() {
        let mut req = InboundRequest::new(Method::GET, "/x");
        req.params.insert("id".to_string(), json!("1"));
        assert_eq!(req.facets(), json!({ "params": { "id": "1" }, "query": {} }));

        let req = req.with_body(json!({ "name": "x" }));
        assert_eq!(req.facets()["body"], json!({ "name": "x" }));
    }
}
