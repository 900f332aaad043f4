use crate::error::InterceptError;
use crate::server::{InboundRequest, ValidationResponse};

/// What a middleware decided about a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Hand the request to the next stage.
    Continue,
    /// Stop here and send this response.
    Respond(ValidationResponse),
}

impl Flow {
    #[must_use]
    pub fn is_continue(&self) -> bool {
        matches!(self, Flow::Continue)
    }

    /// The response, if the request was stopped.
    #[must_use]
    pub fn response(&self) -> Option<&ValidationResponse> {
        match self {
            Flow::Continue => None,
            Flow::Respond(res) => Some(res),
        }
    }
}

pub trait Middleware: Send + Sync {
    /// Inspect (and possibly enrich) a request before it reaches the handler.
    ///
    /// `Err` goes to the surrounding error channel.
    fn before(&self, _req: &mut InboundRequest) -> Result<Flow, InterceptError> {
        Ok(Flow::Continue)
    }
}

/// Middlewares run in insertion order until one stops the request.
#[derive(Default)]
pub struct MiddlewareChain {
    stages: Vec<Box<dyn Middleware>>,
}

impl MiddlewareChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, middleware: impl Middleware + 'static) -> Self {
        self.stages.push(Box::new(middleware));
        self
    }

    pub fn push(&mut self, middleware: Box<dyn Middleware>) {
        self.stages.push(middleware);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every stage's `before`; the first `Respond` or `Err` short-circuits.
    pub fn run(&self, req: &mut InboundRequest) -> Result<Flow, InterceptError> {
        for stage in &self.stages {
            match stage.before(req)? {
                Flow::Continue => continue,
                stopped => return Ok(stopped),
            }
        }
        Ok(Flow::Continue)
    }
}
