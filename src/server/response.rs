use http::StatusCode;
use serde::Serialize;
use serde_json::Value;

/// A response produced by the validator instead of passing the request on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    #[serde(skip_serializing)]
    pub headers: Vec<(String, String)>,
    /// Response body as JSON
    pub body: Value,
}

impl ValidationResponse {
    /// Create a JSON response with default headers
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body,
        }
    }

    /// `400 Bad Request` with body `{ "message": <message> }`
    #[must_use]
    pub fn bad_request(message: &str) -> Self {
        Self::json(400, serde_json::json!({ "message": message }))
    }

    /// The `message` field of the body, if present.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }

    /// Reason phrase for the status line.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        StatusCode::from_u16(self.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown")
    }

    /// Get a header by name (case-insensitive)
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_request() {
        let res = ValidationResponse::bad_request("params.id must match pattern");
        assert_eq!(res.status, 400);
        assert_eq!(res.reason(), "Bad Request");
        assert_eq!(res.message(), Some("params.id must match pattern"));
        assert_eq!(res.get_header("Content-Type"), Some("application/json"));
    }
}
