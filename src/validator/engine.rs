//! The boundary between the interceptor and the JSON Schema implementation.
//!
//! The interceptor only ever sees [`SchemaValidator`] and [`CompiledSchema`];
//! [`JsonSchemaEngine`] is the default implementation backed by the
//! `jsonschema` crate.

use crate::error::InterceptError;
use jsonschema::error::ValidationErrorKind;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A user supplied string format predicate (`"format": "<name>"`).
pub type FormatFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// One schema violation reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// Location inside the validated instance, e.g. `["body", "name"]`
    pub instance_path: Vec<String>,
    /// Engine message for this violation
    pub message: String,
}

impl SchemaViolation {
    /// Instance path joined with dots, empty at the root.
    #[must_use]
    pub fn dotted_path(&self) -> String {
        self.instance_path.join(".")
    }

    /// `"<dotted path> <message>"`, or just the message at the root.
    #[must_use]
    pub fn format(&self) -> String {
        let path = self.dotted_path();
        if path.is_empty() {
            self.message.clone()
        } else {
            format!("{path} {}", self.message)
        }
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

/// A schema compiled once and checked many times.
pub trait CompiledSchema: Send + Sync {
    /// Every violation of `instance`, in engine order. Empty means valid.
    fn check(&self, instance: &Value) -> Vec<SchemaViolation>;

    /// Whether `instance` conforms.
    fn is_valid(&self, instance: &Value) -> bool {
        self.check(instance).is_empty()
    }
}

/// Something that turns a JSON Schema into a [`CompiledSchema`].
pub trait SchemaValidator: Send + Sync {
    /// Compile `schema`. A schema the engine rejects is an [`InterceptError::Schema`].
    fn compile(&self, schema: &Value) -> Result<Arc<dyn CompiledSchema>, InterceptError>;
}

/// [`SchemaValidator`] backed by `jsonschema`, with format assertion enabled.
#[derive(Clone, Default)]
pub struct JsonSchemaEngine {
    formats: BTreeMap<String, FormatFn>,
}

impl JsonSchemaEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a named string format.
    #[must_use]
    pub fn with_format(mut self, name: impl Into<String>, check: FormatFn) -> Self {
        self.formats.insert(name.into(), check);
        self
    }

    /// Register every format of `formats`.
    #[must_use]
    pub fn with_formats<'a>(mut self, formats: impl IntoIterator<Item = (&'a String, &'a FormatFn)>) -> Self {
        for (name, check) in formats {
            self.formats.insert(name.clone(), Arc::clone(check));
        }
        self
    }

    /// Names of the registered custom formats.
    pub fn format_names(&self) -> impl Iterator<Item = &str> {
        self.formats.keys().map(String::as_str)
    }
}

impl fmt::Debug for JsonSchemaEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchemaEngine")
            .field("formats", &self.formats.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SchemaValidator for JsonSchemaEngine {
    fn compile(&self, schema: &Value) -> Result<Arc<dyn CompiledSchema>, InterceptError> {
        let mut options = jsonschema::options();
        options.should_validate_formats(true);
        for (name, check) in &self.formats {
            let check = Arc::clone(check);
            options.with_format(name.clone(), move |value: &str| check(value));
        }
        let validator = options.build(schema).map_err(|e| InterceptError::Schema {
            reason: e.to_string(),
        })?;
        Ok(Arc::new(JsonSchemaCompiled { validator }))
    }
}

struct JsonSchemaCompiled {
    validator: jsonschema::Validator,
}

impl CompiledSchema for JsonSchemaCompiled {
    fn check(&self, instance: &Value) -> Vec<SchemaViolation> {
        self.validator
            .iter_errors(instance)
            .map(|error| {
                let mut instance_path: Vec<String> = error
                    .instance_path
                    .to_string()
                    .split('/')
                    .filter(|s| !s.is_empty())
                    .map(|s| s.replace("~1", "/").replace("~0", "~"))
                    .collect();
                // A missing property is reported against its parent object.
                if let ValidationErrorKind::Required { property } = &error.kind {
                    if let Some(name) = property.as_str() {
                        instance_path.push(name.to_string());
                    }
                }
                SchemaViolation {
                    instance_path,
                    message: error.to_string(),
                }
            })
            .collect()
    }
}

/// How many violations end up in a rejection message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Only the first violation.
    #[default]
    First,
    /// Every violation, joined with `"; "`.
    All,
}

impl ErrorMode {
    /// Parse `first` / `all` (case-insensitive).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "first" => Some(ErrorMode::First),
            "all" => Some(ErrorMode::All),
            _ => None,
        }
    }

    /// Formatted messages kept under this mode, in engine order.
    #[must_use]
    pub fn select(self, violations: &[SchemaViolation]) -> Vec<String> {
        match self {
            ErrorMode::First => violations.iter().take(1).map(SchemaViolation::format).collect(),
            ErrorMode::All => violations.iter().map(SchemaViolation::format).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn violation(path: &[&str], message: &str) -> SchemaViolation {
        SchemaViolation {
            instance_path: path.iter().map(|s| s.to_string()).collect(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_format_with_and_without_path() {
        assert_eq!(violation(&["body", "name"], "is bad").format(), "body.name is bad");
        assert_eq!(violation(&[], "is bad").format(), "is bad");
        assert_eq!(violation(&["query", "tags", "0"], "x").dotted_path(), "query.tags.0");
    }

    #[test]
    fn test_error_mode_select() {
        let violations = vec![violation(&["a"], "one"), violation(&["b"], "two")];
        assert_eq!(ErrorMode::First.select(&violations), vec!["a one"]);
        assert_eq!(ErrorMode::All.select(&violations), vec!["a one", "b two"]);
        assert!(ErrorMode::First.select(&[]).is_empty());
        assert_eq!(ErrorMode::parse("ALL"), Some(ErrorMode::All));
        assert_eq!(ErrorMode::parse("nope"), None);
    }

    #[test]
    fn test_engine_reports_type_error_path() {
        let engine = JsonSchemaEngine::new();
        let compiled = engine
            .compile(&json!({
                "type": "object",
                "properties": {
                    "body": { "type": "object", "properties": { "age": { "type": "integer" } } }
                }
            }))
            .unwrap();
        assert!(compiled.is_valid(&json!({ "body": { "age": 3 } })));
        let violations = compiled.check(&json!({ "body": { "age": "three" } }));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].instance_path, vec!["body", "age"]);
        assert!(violations[0].format().starts_with("body.age "));
    }

    #[test]
    fn test_engine_required_appends_property() {
        let engine = JsonSchemaEngine::new();
        let compiled = engine
            .compile(&json!({
                "type": "object",
                "properties": { "body": { "type": "object", "required": ["name"] } },
                "required": ["body"]
            }))
            .unwrap();
        let violations = compiled.check(&json!({ "body": {} }));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].dotted_path(), "body.name");
        assert!(violations[0].message.contains("name"));

        let missing_facet = compiled.check(&json!({}));
        assert_eq!(missing_facet[0].dotted_path(), "body");
    }

    #[test]
    fn test_engine_custom_format() {
        let even: FormatFn = Arc::new(|s: &str| s.parse::<u64>().map(|n| n % 2 == 0).unwrap_or(false));
        let engine = JsonSchemaEngine::new().with_format("even", even);
        assert_eq!(engine.format_names().collect::<Vec<_>>(), vec!["even"]);
        let compiled = engine
            .compile(&json!({ "type": "string", "format": "even" }))
            .unwrap();
        assert!(compiled.is_valid(&json!("42")));
        assert!(!compiled.is_valid(&json!("7")));
    }

    #[test]
    fn test_engine_asserts_builtin_formats() {
        let compiled = JsonSchemaEngine::new()
            .compile(&json!({ "type": "string", "format": "email" }))
            .unwrap();
        assert!(compiled.is_valid(&json!("someone@example.com")));
        assert!(!compiled.is_valid(&json!("not an email")));
    }

    #[test]
    fn test_engine_rejects_invalid_schema() {
        let err = JsonSchemaEngine::new()
            .compile(&json!({ "type": "invalid_type" }))
            .err()
            .unwrap();
        assert!(matches!(err, InterceptError::Schema { .. }));
    }
}
