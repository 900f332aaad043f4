//! Request and response shapes exchanged with the surrounding HTTP stack.

pub mod request;
pub mod response;

pub use request::{parse_query_params, InboundRequest};
pub use response::ValidationResponse;
