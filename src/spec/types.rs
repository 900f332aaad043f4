use crate::error::{ConfigError, InterceptError};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;

use super::resolve::resolve;
use crate::validator_cache::SpecVersion;

/// HTTP verbs recognised as operation keys inside a path item.
pub const METHODS: [&str; 8] = [
    "get", "post", "put", "delete", "patch", "options", "head", "trace",
];

/// The only request body content type that is validated.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Where a declared parameter lives in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
    /// Any location this crate does not validate (e.g. `querystring`).
    #[serde(other)]
    Other,
}

impl std::fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParameterLocation::Path => write!(f, "path"),
            ParameterLocation::Query => write!(f, "query"),
            ParameterLocation::Header => write!(f, "header"),
            ParameterLocation::Cookie => write!(f, "cookie"),
            ParameterLocation::Other => write!(f, "other"),
        }
    }
}

/// A single entry of an operation's `parameters` list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParameterMeta {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub schema: Option<Value>,
}

/// An operation's `requestBody`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RequestBodyMeta {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub content: Map<String, Value>,
}

impl RequestBodyMeta {
    /// Schema declared for `application/json`, if any.
    #[must_use]
    pub fn json_schema(&self) -> Option<&Value> {
        self.content
            .get(JSON_CONTENT_TYPE)
            .and_then(|media| media.get("schema"))
    }
}

/// The parts of an operation definition that drive request validation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OperationMeta {
    pub parameters: Vec<ParameterMeta>,
    pub request_body: Option<RequestBodyMeta>,
}

impl OperationMeta {
    /// Read `parameters` and `requestBody` out of a raw operation node.
    ///
    /// Entries that are themselves `$ref`s (`#/components/parameters/...`,
    /// `#/components/requestBodies/...`) are resolved one level before being
    /// deserialized. `location` is only used for error messages.
    pub fn from_value(document: &Value, operation: &Value, location: &str) -> Result<Self, InterceptError> {
        let invalid = |reason: String| ConfigError::InvalidOperation {
            location: location.to_string(),
            reason,
        };

        let mut parameters = Vec::new();
        if let Some(raw) = operation.get("parameters") {
            let entries = raw
                .as_array()
                .ok_or_else(|| invalid("`parameters` must be an array".to_string()))?;
            for entry in entries {
                let Some(entry) = resolve(document, Some(entry))? else {
                    continue;
                };
                let param: ParameterMeta = serde_json::from_value(entry.clone())
                    .map_err(|e| invalid(format!("bad parameter: {e}")))?;
                parameters.push(param);
            }
        }

        let request_body = match resolve(document, operation.get("requestBody"))? {
            Some(body) => Some(
                serde_json::from_value::<RequestBodyMeta>(body.clone())
                    .map_err(|e| invalid(format!("bad requestBody: {e}")))?,
            ),
            None => None,
        };

        Ok(Self {
            parameters,
            request_body,
        })
    }
}

/// A loaded contract document.
///
/// Cheap to clone; the document itself is shared and never mutated after
/// construction.
#[derive(Debug, Clone)]
pub struct ApiSpec {
    document: Arc<Value>,
    version: SpecVersion,
}

impl ApiSpec {
    /// Wrap an already parsed document.
    #[must_use]
    pub fn from_value(document: Value) -> Self {
        let content = serde_json::to_vec(&document).unwrap_or_default();
        Self {
            version: SpecVersion::from_content(1, &content),
            document: Arc::new(document),
        }
    }

    /// The raw document, as used for `$ref` lookups.
    #[must_use]
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Content-derived version used to namespace cached validators.
    #[must_use]
    pub fn version(&self) -> &SpecVersion {
        &self.version
    }

    /// `info.title`, or an empty string.
    #[must_use]
    pub fn title(&self) -> &str {
        self.document
            .pointer("/info/title")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Path templates and their path items, in document order.
    pub fn paths(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.document
            .get("paths")
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|paths| paths.iter())
    }

    /// Operation node for `template` + lowercase `method`, if declared.
    #[must_use]
    pub fn operation(&self, template: &str, method: &str) -> Option<&Value> {
        if !METHODS.contains(&method) {
            return None;
        }
        self.document
            .get("paths")?
            .get(template)?
            .get(method)
            .filter(|op| op.is_object())
    }

    /// Lowercase methods declared on `template`, in document order.
    #[must_use]
    pub fn methods_for(&self, template: &str) -> Vec<&str> {
        self.document
            .get("paths")
            .and_then(|p| p.get(template))
            .and_then(Value::as_object)
            .map(|item| {
                item.keys()
                    .map(String::as_str)
                    .filter(|k| METHODS.contains(k))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl From<Value> for ApiSpec {
    fn from(document: Value) -> Self {
        ApiSpec::from_value(document)
    }
}
