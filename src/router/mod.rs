//! # Router Module
//!
//! Path template compilation and route lookup.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Compiling OpenAPI path templates (e.g., `/pets/{id}`) into regex matchers
//! - Matching incoming request paths against those templates
//! - Extracting path parameters from the matched path
//!
//! ## Architecture
//!
//! 1. **Compilation**: when the validator is constructed, every template under
//!    `paths` is compiled into a [`PathMatcher`], in document order.
//!
//! 2. **Matching**: for each request, the [`RouteTable`] tests the path against
//!    each matcher in turn and stops at the first hit. There is no "most
//!    specific" ranking: `/a/{x}` declared before `/a/fixed` wins for `/a/fixed`.
//!
//! ## Example
//!
//! ```rust
//! use oasguard::router::PathMatcher;
//!
//! let matcher = PathMatcher::compile("/users/{id}/posts/{postId}").unwrap();
//! assert!(matcher.test("/users/5/posts/9?expand=true"));
//!
//! let params = matcher.extract("/users/5/posts/9").unwrap();
//! assert_eq!(params[0].0.as_ref(), "id");
//! assert_eq!(params[1].1, serde_json::json!("9"));
//! ```

mod core;

pub use core::{
    params_to_object, strip_query, CompiledRoute, ParamVec, PathMatcher, RouteMatch, RouteTable,
    MAX_INLINE_PARAMS,
};
