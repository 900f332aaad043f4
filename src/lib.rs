//! # oasguard
//!
//! **oasguard** validates inbound HTTP requests against an OpenAPI-style contract
//! document before they reach a handler.
//!
//! ## Overview
//!
//! Given a document with `paths` (template → method → operation) and
//! `components`, the validator:
//!
//! 1. compiles every path template into a matcher, once, in document order;
//! 2. matches each request path against those matchers (first match wins);
//! 3. composes a single JSON Schema from the operation's path parameters, query
//!    parameters and `application/json` body, resolving `$ref`s on the way;
//! 4. checks `{ body, params, query }` against it and either lets the request
//!    through or rejects it.
//!
//! ## Architecture
//!
//! - **[`router`]** - Path template compilation and first-match lookup
//! - **[`spec`]** - Document loading, typed operation views and `$ref` resolution
//! - **[`validator`]** - Parameter/body schema composition and the schema engine boundary
//! - **[`validator_cache`]** - Optional per-operation cache of compiled validators
//! - **[`middleware`]** - [`RequestValidator`] and the middleware trait it implements
//! - **[`server`]** - Request facets and the 400 response type
//! - **[`runtime_config`]** - Validator options and environment defaults
//! - **[`logging`]** - `tracing` subscriber setup for binaries
//! - **[`cli`]** - The `oasguard` command-line tool
//!
//! ### Request Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Server as HTTP server
//!     participant Val as RequestValidator
//!     participant Routes as RouteTable
//!     participant Spec as ApiSpec
//!     participant Cache as ValidatorCache
//!     participant Engine as SchemaValidator
//!
//!     Server->>Val: intercept(&mut request)
//!     Val->>Routes: match_path("/items/42")
//!     alt No template matches
//!         Val-->>Server: Flow::Continue
//!     end
//!     Routes-->>Val: "/items/{id}", {id: "42"}
//!     Val->>Spec: operation("/items/{id}", "get")
//!     alt No operation for method
//!         Val-->>Server: Flow::Continue
//!     end
//!     Val->>Cache: get_or_compile(GET, "/items/{id}")
//!     Cache->>Engine: compile(composite schema)
//!     alt Broken $ref
//!         Val-->>Server: Err(InterceptError::Resolution)
//!     end
//!     Val->>Val: attach params + query to request
//!     Val->>Engine: check({body, params, query})
//!     alt Violations and call_next
//!         Val-->>Server: Err(InterceptError::Validation)
//!     else Violations
//!         Val-->>Server: Flow::Respond(400 {"message": ...})
//!     else Valid
//!         Val-->>Server: Flow::Continue
//!     end
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use http::Method;
//! use oasguard::{ApiSpec, Flow, InboundRequest, RequestValidator, ValidatorOptions};
//! use serde_json::json;
//!
//! let spec = ApiSpec::from_value(json!({
//!     "paths": {
//!         "/items/{id}": {
//!             "get": {
//!                 "parameters": [{
//!                     "in": "path", "name": "id", "required": true,
//!                     "schema": { "type": "string", "pattern": "^[0-9]+$" }
//!                 }]
//!             }
//!         }
//!     }
//! }));
//! let validator = RequestValidator::new(Some(spec), ValidatorOptions::default()).unwrap();
//!
//! let mut ok = InboundRequest::new(Method::GET, "/items/42");
//! assert_eq!(validator.intercept(&mut ok).unwrap(), Flow::Continue);
//!
//! let mut bad = InboundRequest::new(Method::GET, "/items/abc");
//! let Flow::Respond(response) = validator.intercept(&mut bad).unwrap() else {
//!     panic!("expected a rejection");
//! };
//! assert_eq!(response.status, 400);
//! assert!(response.message().unwrap().starts_with("params.id "));
//! ```
//!
//! ## Known Limitations
//!
//! - Routing is first match in declaration order; a literal template declared
//!   after an overlapping parameterised one is never reached.
//! - By default `$ref` resolution is a single level; enable
//!   [`ValidatorOptions::deep_refs`] for chains and nested references.
//! - Only `application/json` bodies are validated. Header and cookie
//!   parameters are not.

pub mod cli;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod router;
pub mod runtime_config;
pub mod server;
pub mod spec;
pub mod validator;
pub mod validator_cache;

pub use error::{ConfigError, InterceptError, RequestValidationError, ResolutionError};
pub use middleware::{Flow, Middleware, MiddlewareChain, RequestValidator};
pub use runtime_config::{RuntimeConfig, ValidatorOptions};
pub use server::{InboundRequest, ValidationResponse};
pub use spec::{load_spec, ApiSpec, RefMode};
pub use validator::{ErrorMode, FormatFn, JsonSchemaEngine, SchemaValidator};
