//! # Request Schema Validation
//!
//! Builds the composite schema for one matched operation and checks a request's
//! facets against it.
//!
//! The composite schema is an object with up to three properties, each present
//! only when the operation declares something for it:
//!
//! ```text
//! {
//!   "type": "object",
//!   "properties": { "body": <body schema>, "params": <path params>, "query": <query params> },
//!   "required": ["body", "params", "query"]
//! }
//! ```
//!
//! Compilation goes through the [`SchemaValidator`] trait so the engine can be
//! swapped; [`JsonSchemaEngine`] is the default.

mod engine;
mod schema;

pub use engine::{CompiledSchema, ErrorMode, FormatFn, JsonSchemaEngine, SchemaValidator, SchemaViolation};
pub use schema::{assemble_request_schema, build_body_schema, build_parameter_schema};

use crate::error::InterceptError;
use crate::spec::{OperationMeta, ParameterLocation, RefMode};
use serde_json::Value;

/// Build the composite request schema for an operation.
///
/// Any unresolvable `$ref` aborts with [`InterceptError::Resolution`].
pub fn request_schema(document: &Value, operation: &OperationMeta, refs: RefMode) -> Result<Value, InterceptError> {
    let body = build_body_schema(document, operation.request_body.as_ref(), refs)?;
    let params = build_parameter_schema(document, &operation.parameters, ParameterLocation::Path, refs)?;
    let query = build_parameter_schema(document, &operation.parameters, ParameterLocation::Query, refs)?;
    Ok(assemble_request_schema(body, params, query))
}
