//! Per-request schema composition.
//!
//! These are pure functions over the document and an operation's declarations;
//! nothing here is cached.

use crate::error::ResolutionError;
use crate::spec::{ParameterLocation, ParameterMeta, RefMode, RequestBodyMeta};
use serde_json::{json, Map, Value};

/// Build the object schema for all parameters declared at `location`.
///
/// Returns `Ok(None)` when no parameter of that location exists, or when none
/// of them has a schema: an object schema without properties is treated as
/// "no constraint", not as something to validate against.
///
/// `required` lists the names of required parameters of that location in
/// declaration order.
pub fn build_parameter_schema(
    document: &Value,
    parameters: &[ParameterMeta],
    location: ParameterLocation,
    refs: RefMode,
) -> Result<Option<Value>, ResolutionError> {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for param in parameters.iter().filter(|p| p.location == location) {
        if let Some(schema) = refs.resolve_owned(document, param.schema.as_ref())? {
            properties.insert(param.name.clone(), schema);
        }
        if param.required {
            required.push(Value::String(param.name.clone()));
        }
    }

    if properties.is_empty() {
        return Ok(None);
    }

    Ok(Some(json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })))
}

/// Resolve the `application/json` schema of a request body.
pub fn build_body_schema(
    document: &Value,
    request_body: Option<&RequestBodyMeta>,
    refs: RefMode,
) -> Result<Option<Value>, ResolutionError> {
    refs.resolve_owned(document, request_body.and_then(RequestBodyMeta::json_schema))
}

/// Combine the facet schemas into the composite request schema.
///
/// Each present facet becomes both a property and a required key, always in the
/// order `body`, `params`, `query`.
#[must_use]
pub fn assemble_request_schema(body: Option<Value>, params: Option<Value>, query: Option<Value>) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for (key, schema) in [("body", body), ("params", params), ("query", query)] {
        if let Some(schema) = schema {
            properties.insert(key.to_string(), schema);
            required.push(Value::String(key.to_string()));
        }
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(location: ParameterLocation, name: &str, required: bool, schema: Option<Value>) -> ParameterMeta {
        ParameterMeta {
            name: name.to_string(),
            location,
            required,
            schema,
        }
    }

    #[test]
    fn test_no_parameters() {
        let doc = json!({});
        assert_eq!(
            build_parameter_schema(&doc, &[], ParameterLocation::Path, RefMode::Single).unwrap(),
            None
        );
    }

    #[test]
    fn test_query_parameter_schema() {
        let doc = json!({});
        let params = vec![param(
            ParameterLocation::Query,
            "q",
            true,
            Some(json!({ "type": "string" })),
        )];
        let schema = build_parameter_schema(&doc, &params, ParameterLocation::Query, RefMode::Single)
            .unwrap()
            .unwrap();
        assert_eq!(schema["type"], json!("object"));
        assert_eq!(schema["properties"]["q"], json!({ "type": "string" }));
        assert_eq!(schema["required"], json!(["q"]));

        assert_eq!(
            build_parameter_schema(&doc, &params, ParameterLocation::Path, RefMode::Single).unwrap(),
            None
        );
    }

    #[test]
    fn test_required_keeps_declaration_order() {
        let doc = json!({});
        let s = Some(json!({ "type": "string" }));
        let params = vec![
            param(ParameterLocation::Path, "b", true, s.clone()),
            param(ParameterLocation::Query, "ignored", true, s.clone()),
            param(ParameterLocation::Path, "a", false, s.clone()),
            param(ParameterLocation::Path, "c", true, s),
        ];
        let schema = build_parameter_schema(&doc, &params, ParameterLocation::Path, RefMode::Single)
            .unwrap()
            .unwrap();
        assert_eq!(schema["required"], json!(["b", "c"]));
        let keys: Vec<&String> = schema["properties"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_schemaless_parameters_give_no_constraint() {
        let doc = json!({});
        let params = vec![param(ParameterLocation::Query, "q", true, None)];
        assert_eq!(
            build_parameter_schema(&doc, &params, ParameterLocation::Query, RefMode::Single).unwrap(),
            None
        );
    }

    #[test]
    fn test_parameter_schema_refs_are_resolved() {
        let doc = json!({ "components": { "schemas": { "Id": { "type": "string", "pattern": "^[0-9]+$" } } } });
        let params = vec![param(
            ParameterLocation::Path,
            "id",
            true,
            Some(json!({ "$ref": "#/components/schemas/Id" })),
        )];
        let schema = build_parameter_schema(&doc, &params, ParameterLocation::Path, RefMode::Single)
            .unwrap()
            .unwrap();
        assert_eq!(schema["properties"]["id"]["pattern"], json!("^[0-9]+$"));

        let broken = vec![param(
            ParameterLocation::Path,
            "id",
            true,
            Some(json!({ "$ref": "#/components/schemas/Nope" })),
        )];
        assert!(build_parameter_schema(&doc, &broken, ParameterLocation::Path, RefMode::Single).is_err());
    }

    #[test]
    fn test_body_schema() {
        let doc = json!({ "components": { "schemas": { "Item": { "type": "object" } } } });
        let body: RequestBodyMeta = serde_json::from_value(json!({
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Item" } } }
        }))
        .unwrap();
        assert_eq!(
            build_body_schema(&doc, Some(&body), RefMode::Single).unwrap(),
            Some(json!({ "type": "object" }))
        );
        assert_eq!(build_body_schema(&doc, None, RefMode::Single).unwrap(), None);

        let xml_only: RequestBodyMeta = serde_json::from_value(json!({
            "content": { "application/xml": { "schema": { "type": "string" } } }
        }))
        .unwrap();
        assert_eq!(build_body_schema(&doc, Some(&xml_only), RefMode::Single).unwrap(), None);
    }

    #[test]
    fn test_assemble_orders_facets() {
        let composite = assemble_request_schema(
            Some(json!({ "type": "object" })),
            Some(json!({ "type": "object", "properties": {} })),
            Some(json!({ "type": "object" })),
        );
        assert_eq!(composite["required"], json!(["body", "params", "query"]));
        let keys: Vec<&String> = composite["properties"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["body", "params", "query"]);
    }

    #[test]
    fn test_assemble_only_present_facets() {
        let composite = assemble_request_schema(None, None, Some(json!({ "type": "object" })));
        assert_eq!(composite["required"], json!(["query"]));
        assert!(composite["properties"].get("body").is_none());

        let empty = assemble_request_schema(None, None, None);
        assert_eq!(empty, json!({ "type": "object", "properties": {}, "required": [] }));
    }
}
