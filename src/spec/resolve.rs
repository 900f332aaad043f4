//! `$ref` resolution against the contract document.
//!
//! [`resolve`] follows exactly one level of indirection: if the target of a
//! reference is itself a reference, it is returned as-is. [`resolve_deep`]
//! inlines reference chains and nested references, failing on cycles.

use crate::error::ResolutionError;
use serde_json::Value;
use std::collections::HashSet;

/// How schema references are resolved when composing request schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefMode {
    /// One level of indirection at the top of the node.
    #[default]
    Single,
    /// Transitive, including references nested in properties and items.
    Deep,
}

impl RefMode {
    /// Resolve `node` under this mode into an owned schema.
    pub fn resolve_owned(self, document: &Value, node: Option<&Value>) -> Result<Option<Value>, ResolutionError> {
        match self {
            RefMode::Single => Ok(resolve(document, node)?.cloned()),
            RefMode::Deep => resolve_deep(document, node),
        }
    }
}

/// Resolve a schema node that may carry a `$ref`.
///
/// * `None` → `Ok(None)`: no schema declared.
/// * `{"$ref": "#/a/b"}` → the node at `a.b` in `document`, or an error if nothing is there.
/// * anything else → returned unchanged.
pub fn resolve<'a>(document: &'a Value, node: Option<&'a Value>) -> Result<Option<&'a Value>, ResolutionError> {
    let Some(node) = node else {
        return Ok(None);
    };
    match node.get("$ref") {
        Some(reference) => lookup(document, reference).map(Some),
        None => Ok(Some(node)),
    }
}

/// Resolve `node` and every reference reachable from it.
pub fn resolve_deep(document: &Value, node: Option<&Value>) -> Result<Option<Value>, ResolutionError> {
    let Some(node) = node else {
        return Ok(None);
    };
    let mut in_progress = HashSet::new();
    inline_refs(document, node, &mut in_progress).map(Some)
}

fn inline_refs(document: &Value, node: &Value, in_progress: &mut HashSet<String>) -> Result<Value, ResolutionError> {
    match node {
        Value::Object(obj) => {
            if let Some(reference @ Value::String(_)) = obj.get("$ref") {
                let key = reference_text(reference);
                if !in_progress.insert(key.clone()) {
                    return Err(ResolutionError::Cycle { reference: key });
                }
                let target = lookup(document, reference)?;
                let resolved = inline_refs(document, target, in_progress);
                in_progress.remove(&key);
                return resolved;
            }
            let mut out = serde_json::Map::with_capacity(obj.len());
            for (k, v) in obj {
                out.insert(k.clone(), inline_refs(document, v, in_progress)?);
            }
            Ok(Value::Object(out))
        }
        Value::Array(items) => items
            .iter()
            .map(|v| inline_refs(document, v, in_progress))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Ok(other.clone()),
    }
}

fn reference_text(reference: &Value) -> String {
    match reference {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Walk a local `#/seg/seg` pointer through the document.
fn lookup<'a>(document: &'a Value, reference: &Value) -> Result<&'a Value, ResolutionError> {
    let text = reference.as_str().ok_or_else(|| ResolutionError::Malformed {
        reference: reference_text(reference),
    })?;
    let path = text
        .strip_prefix("#/")
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ResolutionError::Malformed {
            reference: text.to_string(),
        })?;

    let unresolved = || ResolutionError::Unresolved {
        reference: text.to_string(),
    };

    let mut current = document;
    for raw in path.split('/') {
        let segment = raw.replace("~1", "/").replace("~0", "~");
        current = match current {
            Value::Object(map) => map.get(&segment).ok_or_else(unresolved)?,
            Value::Array(items) => segment
                .parse::<usize>()
                .ok()
                .and_then(|i| items.get(i))
                .ok_or_else(unresolved)?,
            _ => return Err(unresolved()),
        };
    }
    Ok(current)
}
