use super::types::ApiSpec;
use crate::error::ConfigError;
use serde_json::Value;
use std::path::Path;
use tracing::info;

/// Document encodings accepted by [`load_spec_from_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecFormat {
    Yaml,
    Json,
}

impl SpecFormat {
    /// Pick the format from a file extension; anything but `.yaml`/`.yml` is JSON.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => SpecFormat::Yaml,
            _ => SpecFormat::Json,
        }
    }
}

/// Load a contract document from a YAML or JSON file.
///
/// Object key order is preserved, so path templates keep the order in which
/// they were written.
pub fn load_spec(file_path: impl AsRef<Path>) -> Result<ApiSpec, ConfigError> {
    let path = file_path.as_ref();
    let spec_path = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Load {
        path: spec_path.clone(),
        reason: e.to_string(),
    })?;
    let spec = load_spec_from_str(&content, SpecFormat::from_path(path)).map_err(|e| match e {
        ConfigError::Load { reason, .. } => ConfigError::Load {
            path: spec_path.clone(),
            reason,
        },
        other => other,
    })?;
    info!(
        spec_path = %spec_path,
        title = %spec.title(),
        paths_count = spec.paths().count(),
        spec_hash = %spec.version().hash,
        "Specification loaded"
    );
    Ok(spec)
}

/// Parse a contract document held in memory.
pub fn load_spec_from_str(content: &str, format: SpecFormat) -> Result<ApiSpec, ConfigError> {
    let parsed: Result<Value, String> = match format {
        SpecFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        SpecFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
    };
    let document = parsed.map_err(|reason| ConfigError::Load {
        path: "<inline>".to_string(),
        reason,
    })?;
    if !document.is_object() {
        return Err(ConfigError::Load {
            path: "<inline>".to_string(),
            reason: "document root must be a mapping".to_string(),
        });
    }
    Ok(ApiSpec::from_value(document))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(SpecFormat::from_path(Path::new("a/openapi.yaml")), SpecFormat::Yaml);
        assert_eq!(SpecFormat::from_path(Path::new("openapi.yml")), SpecFormat::Yaml);
        assert_eq!(SpecFormat::from_path(Path::new("openapi.json")), SpecFormat::Json);
    }

    #[test]
    fn test_yaml_keeps_path_order() {
        let yaml = r#"
openapi: 3.0.0
info:
  title: Order
  version: "1"
paths:
  /b/{id}:
    get:
      responses:
        "200":
          description: OK
  /a:
    get: {}
"#;
        let spec = load_spec_from_str(yaml, SpecFormat::Yaml).unwrap();
        let keys: Vec<&str> = spec.paths().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["/b/{id}", "/a"]);
        assert_eq!(spec.title(), "Order");
    }

    #[test]
    fn test_rejects_non_mapping_root() {
        let err = load_spec_from_str("[1, 2]", SpecFormat::Json).unwrap_err();
        assert!(matches!(err, ConfigError::Load { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        std::io::Write::write_all(&mut file, br#"{"info":{"title":"File"},"paths":{"/x":{}}}"#).unwrap();
        let spec = load_spec(file.path()).unwrap();
        assert_eq!(spec.title(), "File");
        assert_eq!(spec.paths().count(), 1);
    }

    #[test]
    fn test_missing_file() {
        let err = load_spec("/definitely/not/here.yaml").unwrap_err();
        match err {
            ConfigError::Load { path, .. } => assert_eq!(path, "/definitely/not/here.yaml"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
