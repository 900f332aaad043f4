//! # Spec Module
//!
//! Loading the contract document and reading route definitions out of it.
//!
//! The document is kept as a raw [`serde_json::Value`] tree rather than a typed
//! OpenAPI model: `$ref`s are resolved lazily against it at request time, and
//! object key order (which decides route matching precedence) must survive
//! parsing.

mod load;
mod resolve;
mod types;

pub use load::*;
pub use resolve::*;
pub use types::*;
