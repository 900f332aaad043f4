//! Error types for contract loading, `$ref` resolution and request validation.
//!
//! Only [`RequestValidationError`] is ever turned into a client-facing 400.
//! [`ConfigError`] and [`ResolutionError`] mean the contract document itself is
//! broken and must be surfaced to the operator instead.

use std::fmt;

/// Fatal problems with the contract document or interceptor setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No specification document was supplied at construction.
    MissingSpec,
    /// A path template could not be compiled into a matcher.
    InvalidTemplate {
        /// The offending template as written in the document
        template: String,
        /// Why compilation failed
        reason: String,
    },
    /// An operation's `parameters` or `requestBody` has an unexpected shape.
    InvalidOperation {
        /// `"<METHOD> <template>"` of the operation
        location: String,
        /// Deserialization failure detail
        reason: String,
    },
    /// The document could not be read or parsed from disk.
    Load {
        /// Path that was being loaded
        path: String,
        /// I/O or parse failure detail
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingSpec => write!(f, "Invalid spec: no specification document supplied"),
            ConfigError::InvalidTemplate { template, reason } => {
                write!(f, "Invalid path template '{template}': {reason}")
            }
            ConfigError::InvalidOperation { location, reason } => {
                write!(f, "Invalid operation definition at {location}: {reason}")
            }
            ConfigError::Load { path, reason } => {
                write!(f, "Failed to load specification '{path}': {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// A `$ref` that does not lead to a node in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// The reference is well formed but nothing lives at its target.
    Unresolved {
        /// The `$ref` string as written
        reference: String,
    },
    /// The reference is not a local `#/...` pointer, or `$ref` is not a string.
    Malformed {
        /// The `$ref` value rendered as text
        reference: String,
    },
    /// Transitive resolution came back to a reference still being resolved.
    Cycle {
        /// The reference that closed the cycle
        reference: String,
    },
}

impl ResolutionError {
    /// The `$ref` string this error is about.
    #[must_use]
    pub fn reference(&self) -> &str {
        match self {
            ResolutionError::Unresolved { reference }
            | ResolutionError::Malformed { reference }
            | ResolutionError::Cycle { reference } => reference,
        }
    }
}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionError::Unresolved { reference } => {
                write!(f, "Unresolved schema reference '{reference}'")
            }
            ResolutionError::Malformed { reference } => {
                write!(
                    f,
                    "Malformed schema reference '{reference}': expected a local pointer of the form '#/segment/...'"
                )
            }
            ResolutionError::Cycle { reference } => {
                write!(f, "Cyclic schema reference detected at '{reference}'")
            }
        }
    }
}

impl std::error::Error for ResolutionError {}

/// A request that does not conform to its route's composite schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestValidationError {
    /// Client-facing message, `"<dotted path> <validator message>"`
    pub message: String,
    /// Every formatted violation that contributed to `message`
    pub errors: Vec<String>,
}

impl RequestValidationError {
    /// Build an error whose message is the single given violation.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            errors: vec![message.clone()],
            message,
        }
    }
}

impl fmt::Display for RequestValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for RequestValidationError {}

/// Everything that can stop a request inside the interceptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterceptError {
    /// Schema conformance failure, forwarded because `call_next` is set.
    Validation(RequestValidationError),
    /// A `$ref` in the document could not be resolved.
    Resolution(ResolutionError),
    /// The matched operation is malformed.
    Config(ConfigError),
    /// The composite schema was rejected by the schema engine (e.g. a bad `pattern`).
    Schema {
        /// Engine compile error detail
        reason: String,
    },
}

impl InterceptError {
    /// Whether this error is a per-request validation failure rather than a broken contract.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, InterceptError::Validation(_))
    }
}

impl fmt::Display for InterceptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterceptError::Validation(e) => write!(f, "{e}"),
            InterceptError::Resolution(e) => write!(f, "{e}"),
            InterceptError::Config(e) => write!(f, "{e}"),
            InterceptError::Schema { reason } => {
                write!(f, "Failed to compile request schema: {reason}")
            }
        }
    }
}

impl std::error::Error for InterceptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InterceptError::Validation(e) => Some(e),
            InterceptError::Resolution(e) => Some(e),
            InterceptError::Config(e) => Some(e),
            InterceptError::Schema { .. } => None,
        }
    }
}

impl From<ResolutionError> for InterceptError {
    fn from(e: ResolutionError) -> Self {
        InterceptError::Resolution(e)
    }
}

impl From<ConfigError> for InterceptError {
    fn from(e: ConfigError) -> Self {
        InterceptError::Config(e)
    }
}

impl From<RequestValidationError> for InterceptError {
    fn from(e: RequestValidationError) -> Self {
        InterceptError::Validation(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_spec_message() {
        assert_eq!(
            ConfigError::MissingSpec.to_string(),
            "Invalid spec: no specification document supplied"
        );
    }

    #[test]
    fn test_resolution_error_reference() {
        let err = ResolutionError::Unresolved {
            reference: "#/components/schemas/Nope".to_string(),
        };
        assert_eq!(err.reference(), "#/components/schemas/Nope");
        assert!(err.to_string().contains("#/components/schemas/Nope"));
    }

    #[test]
    fn test_intercept_error_classification() {
        let v: InterceptError = RequestValidationError::new("body.name is required").into();
        assert!(v.is_validation());
        assert_eq!(v.to_string(), "body.name is required");

        let r: InterceptError = ResolutionError::Cycle {
            reference: "#/a".to_string(),
        }
        .into();
        assert!(!r.is_validation());
        assert!(std::error::Error::source(&r).is_some());
    }
}
