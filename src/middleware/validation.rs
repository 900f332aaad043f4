use std::fmt;
use std::sync::Arc;

use http::Method;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{Flow, Middleware};
use crate::error::{ConfigError, InterceptError, RequestValidationError};
use crate::router::RouteTable;
use crate::runtime_config::ValidatorOptions;
use crate::server::{parse_query_params, InboundRequest, ValidationResponse};
use crate::spec::{ApiSpec, OperationMeta, RefMode};
use crate::validator::{request_schema, ErrorMode, JsonSchemaEngine, SchemaValidator};
use crate::validator_cache::{SpecVersion, ValidatorCache};

/// Validates inbound requests against the operation the contract declares for them.
///
/// Per request:
///
/// 1. find the first template (document order) whose matcher accepts the path;
/// 2. look up the operation for the request method, passing through if there is none;
/// 3. build the composite schema from the operation's path/query parameters and
///    JSON body;
/// 4. attach extracted path parameters and parsed query parameters to the request;
/// 5. check `{ body, params, query }` against the composite schema.
///
/// A failing request becomes either a 400 response or, with `call_next`, an
/// [`InterceptError::Validation`]. A broken `$ref` is always an `Err`.
pub struct RequestValidator {
    spec: ApiSpec,
    routes: Arc<RouteTable>,
    engine: Arc<dyn SchemaValidator>,
    cache: ValidatorCache,
    call_next: bool,
    error_mode: ErrorMode,
    refs: RefMode,
}

impl RequestValidator {
    /// Build a validator backed by [`JsonSchemaEngine`] with `options.custom_formats` registered.
    ///
    /// `spec = None` is rejected with [`ConfigError::MissingSpec`].
    pub fn new(spec: Option<ApiSpec>, options: ValidatorOptions) -> Result<Self, ConfigError> {
        let engine = JsonSchemaEngine::new().with_formats(&options.custom_formats);
        Self::with_engine(spec, options, Arc::new(engine))
    }

    /// Build a validator around any [`SchemaValidator`].
    ///
    /// `options.custom_formats` is ignored here; the engine owns its formats.
    pub fn with_engine(
        spec: Option<ApiSpec>,
        options: ValidatorOptions,
        engine: Arc<dyn SchemaValidator>,
    ) -> Result<Self, ConfigError> {
        let spec = spec.ok_or(ConfigError::MissingSpec)?;
        let routes = RouteTable::from_spec(&spec)?;
        let cache = ValidatorCache::new(options.cache_validators);
        cache.set_spec_version(spec.version().clone());

        info!(
            title = %spec.title(),
            routes = routes.len(),
            call_next = options.call_next,
            error_mode = ?options.error_mode,
            deep_refs = options.deep_refs,
            cache_validators = options.cache_validators,
            "Request validator ready"
        );

        Ok(Self {
            refs: options.ref_mode(),
            spec,
            routes: Arc::new(routes),
            engine,
            cache,
            call_next: options.call_next,
            error_mode: options.error_mode,
        })
    }

    /// Swap in a new document, recompiling the route table and invalidating
    /// cached validators.
    ///
    /// On error the current document stays in place.
    pub fn replace_spec(&mut self, spec: ApiSpec) -> Result<(), ConfigError> {
        let routes = RouteTable::from_spec(&spec)?;
        let next = SpecVersion::new(self.cache.spec_version().version + 1, spec.version().hash.clone());
        info!(
            title = %spec.title(),
            routes = routes.len(),
            spec_version = next.version,
            spec_hash = %next.hash,
            "Request validator specification replaced"
        );
        self.cache.set_spec_version(next);
        self.routes = Arc::new(routes);
        self.spec = spec;
        Ok(())
    }

    #[must_use]
    pub fn spec(&self) -> &ApiSpec {
        &self.spec
    }

    /// Compiled templates, in match order.
    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    #[must_use]
    pub fn cache(&self) -> &ValidatorCache {
        &self.cache
    }

    /// The composite schema for `method` on `template`, or `None` when the
    /// template declares no such operation.
    pub fn request_schema(&self, method: &Method, template: &str) -> Result<Option<Value>, InterceptError> {
        let lowercase = method.as_str().to_ascii_lowercase();
        let Some(operation) = self.spec.operation(template, &lowercase) else {
            return Ok(None);
        };
        self.build_schema(method, template, operation).map(Some)
    }

    fn build_schema(&self, method: &Method, template: &str, operation: &Value) -> Result<Value, InterceptError> {
        let location = format!("{method} {template}");
        let meta = OperationMeta::from_value(self.spec.document(), operation, &location)?;
        request_schema(self.spec.document(), &meta, self.refs)
    }

    /// Validate one request.
    pub fn intercept(&self, req: &mut InboundRequest) -> Result<Flow, InterceptError> {
        let Some(matched) = self.routes.match_path(&req.path) else {
            debug!(method = %req.method, path = %req.path, "No route for request, passing through");
            return Ok(Flow::Continue);
        };
        let template = matched.route.template.as_ref();

        let lowercase = req.method.as_str().to_ascii_lowercase();
        let Some(operation) = self.spec.operation(template, &lowercase) else {
            debug!(
                method = %req.method,
                path = %req.path,
                route_pattern = %template,
                "No operation for method, passing through"
            );
            return Ok(Flow::Continue);
        };

        let method = req.method.clone();
        let validator = self
            .cache
            .get_or_compile(&method, template, self.engine.as_ref(), || {
                self.build_schema(&method, template, operation)
            })
            .inspect_err(|e| {
                warn!(
                    method = %method,
                    route_pattern = %template,
                    error = %e,
                    "Failed to build request validator"
                );
            })?;

        req.params = matched.params_object();
        req.query = parse_query_params(&req.url);

        let violations = validator.check(&req.facets());
        if violations.is_empty() {
            debug!(method = %method, path = %req.path, route_pattern = %template, "Request validated");
            return Ok(Flow::Continue);
        }

        let errors = self.error_mode.select(&violations);
        let rejection = RequestValidationError {
            message: errors.join("; "),
            errors,
        };
        warn!(
            method = %method,
            path = %req.path,
            route_pattern = %template,
            violations = violations.len(),
            message = %rejection.message,
            call_next = self.call_next,
            "Request rejected"
        );

        if self.call_next {
            Err(InterceptError::Validation(rejection))
        } else {
            Ok(Flow::Respond(ValidationResponse::bad_request(&rejection.message)))
        }
    }
}

impl Middleware for RequestValidator {
    fn before(&self, req: &mut InboundRequest) -> Result<Flow, InterceptError> {
        self.intercept(req)
    }
}

impl fmt::Debug for RequestValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestValidator")
            .field("title", &self.spec.title())
            .field("routes", &self.routes.len())
            .field("call_next", &self.call_next)
            .field("error_mode", &self.error_mode)
            .field("refs", &self.refs)
            .field("cache", &self.cache)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec() -> ApiSpec {
        ApiSpec::from_value(json!({
            "openapi": "3.0.0",
            "info": { "title": "Items", "version": "1" },
            "paths": {
                "/items/{id}": {
                    "get": {
                        "parameters": [
                            { "in": "path", "name": "id", "required": true,
                              "schema": { "type": "string", "pattern": "^[0-9]+$" } }
                        ]
                    }
                }
            }
        }))
    }

    #[test]
    fn test_missing_spec() {
        let err = RequestValidator::new(None, ValidatorOptions::default()).unwrap_err();
        assert_eq!(err, ConfigError::MissingSpec);
    }

    #[test]
    fn test_request_schema_lookup() {
        let validator = RequestValidator::new(Some(spec()), ValidatorOptions::default()).unwrap();
        let schema = validator
            .request_schema(&Method::GET, "/items/{id}")
            .unwrap()
            .unwrap();
        assert_eq!(schema["required"], json!(["params"]));
        assert!(validator
            .request_schema(&Method::DELETE, "/items/{id}")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_intercept_attaches_facets() {
        let validator = RequestValidator::new(Some(spec()), ValidatorOptions::default()).unwrap();
        let mut req = InboundRequest::new(Method::GET, "/items/42?verbose=1");
        assert!(validator.intercept(&mut req).unwrap().is_continue());
        assert_eq!(req.get_path_param("id"), Some(&json!("42")));
        assert_eq!(req.get_query_param("verbose"), Some(&json!("1")));
    }

    #[test]
    fn test_replace_spec() {
        let mut validator = RequestValidator::new(Some(spec()), ValidatorOptions::default().with_cache(true)).unwrap();
        let mut req = InboundRequest::new(Method::GET, "/items/42");
        validator.intercept(&mut req).unwrap();
        assert_eq!(validator.cache().size(), 1);

        validator
            .replace_spec(ApiSpec::from_value(json!({ "paths": { "/other": {} } })))
            .unwrap();
        assert_eq!(validator.cache().size(), 0);
        assert_eq!(validator.cache().spec_version().version, 2);
        assert_eq!(validator.routes().len(), 1);
        let mut req = InboundRequest::new(Method::GET, "/items/abc");
        assert!(validator.intercept(&mut req).unwrap().is_continue());
    }

    #[test]
    fn test_debug_output() {
        let validator = RequestValidator::new(Some(spec()), ValidatorOptions::default()).unwrap();
        let rendered = format!("{validator:?}");
        assert!(rendered.contains("Items"));
        assert!(rendered.contains("routes: 1"));
    }
}
