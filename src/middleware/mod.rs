//! Request middleware.
//!
//! A [`Middleware`] sees each request before its handler and either lets it
//! through, answers it directly, or fails it into the surrounding error channel.
//! [`RequestValidator`] is the contract-driven validation stage.

mod core;
mod validation;

pub use core::{Flow, Middleware, MiddlewareChain};
pub use validation::RequestValidator;
