//! # Runtime Configuration Module
//!
//! Construction options for the request validator, plus environment-driven
//! defaults for them.
//!
//! ## Environment Variables
//!
//! ### `OASGUARD_VALIDATOR_CACHE`
//!
//! `on` / `true` / `1` keeps one compiled validator per operation instead of
//! compiling the composite schema on every request. Default: off.
//!
//! ### `OASGUARD_ERROR_MODE`
//!
//! `first` (default) reports only the first schema violation; `all` joins every
//! violation with `"; "`.
//!
//! ### `OASGUARD_DEEP_REFS`
//!
//! `on` follows `$ref` chains and nested references (with cycle detection)
//! instead of resolving a single level. Default: off.
//!
//! ## Usage
//!
//! ```rust
//! use oasguard::runtime_config::{RuntimeConfig, ValidatorOptions};
//!
//! let options = RuntimeConfig::from_env().apply(ValidatorOptions::default().with_call_next(true));
//! assert!(options.call_next);
//! ```

use crate::spec::RefMode;
use crate::validator::{ErrorMode, FormatFn};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Options recognised by [`RequestValidator::new`](crate::middleware::RequestValidator::new).
#[derive(Clone, Default)]
pub struct ValidatorOptions {
    /// Propagate validation failures as `Err` instead of producing a 400 response
    pub call_next: bool,
    /// Extra string formats, registered on every compiled validator
    pub custom_formats: HashMap<String, FormatFn>,
    /// How many violations end up in the rejection message
    pub error_mode: ErrorMode,
    /// Reuse compiled validators across requests
    pub cache_validators: bool,
    /// Resolve `$ref` chains transitively
    pub deep_refs: bool,
}

impl ValidatorOptions {
    #[must_use]
    pub fn with_call_next(mut self, call_next: bool) -> Self {
        self.call_next = call_next;
        self
    }

    /// Register a custom string format.
    #[must_use]
    pub fn with_format<F>(mut self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.custom_formats.insert(name.into(), Arc::new(check));
        self
    }

    #[must_use]
    pub fn with_error_mode(mut self, error_mode: ErrorMode) -> Self {
        self.error_mode = error_mode;
        self
    }

    #[must_use]
    pub fn with_cache(mut self, cache_validators: bool) -> Self {
        self.cache_validators = cache_validators;
        self
    }

    #[must_use]
    pub fn with_deep_refs(mut self, deep_refs: bool) -> Self {
        self.deep_refs = deep_refs;
        self
    }

    /// Reference resolution mode implied by `deep_refs`.
    #[must_use]
    pub fn ref_mode(&self) -> RefMode {
        if self.deep_refs {
            RefMode::Deep
        } else {
            RefMode::Single
        }
    }
}

impl fmt::Debug for ValidatorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formats: Vec<&String> = self.custom_formats.keys().collect();
        formats.sort();
        f.debug_struct("ValidatorOptions")
            .field("call_next", &self.call_next)
            .field("custom_formats", &formats)
            .field("error_mode", &self.error_mode)
            .field("cache_validators", &self.cache_validators)
            .field("deep_refs", &self.deep_refs)
            .finish()
    }
}

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuntimeConfig {
    pub cache_validators: bool,
    pub error_mode: ErrorMode,
    pub deep_refs: bool,
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| match lookup(key) {
            Some(val) => match parse_flag(&val) {
                Some(on) => on,
                None => {
                    warn!(key = key, value = %val, "Unrecognised boolean, treating as off");
                    false
                }
            },
            None => false,
        };

        let error_mode = match lookup("OASGUARD_ERROR_MODE") {
            Some(val) => ErrorMode::parse(&val).unwrap_or_else(|| {
                warn!(value = %val, "Unrecognised OASGUARD_ERROR_MODE, using 'first'");
                ErrorMode::First
            }),
            None => ErrorMode::First,
        };

        RuntimeConfig {
            cache_validators: flag("OASGUARD_VALIDATOR_CACHE"),
            error_mode,
            deep_refs: flag("OASGUARD_DEEP_REFS"),
        }
    }

    /// Overlay these settings on `options`, keeping its per-call fields.
    #[must_use]
    pub fn apply(self, options: ValidatorOptions) -> ValidatorOptions {
        options
            .with_cache(self.cache_validators)
            .with_error_mode(self.error_mode)
            .with_deep_refs(self.deep_refs)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "on" | "true" | "yes" => Some(true),
        "0" | "off" | "false" | "no" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::from_lookup(lookup(&[]));
        assert_eq!(config, RuntimeConfig::default());
        assert!(!config.cache_validators);
        assert_eq!(config.error_mode, ErrorMode::First);
    }

    #[test]
    fn test_env_values() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("OASGUARD_VALIDATOR_CACHE", "on"),
            ("OASGUARD_ERROR_MODE", "all"),
            ("OASGUARD_DEEP_REFS", "TRUE"),
        ]));
        assert!(config.cache_validators);
        assert_eq!(config.error_mode, ErrorMode::All);
        assert!(config.deep_refs);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("OASGUARD_VALIDATOR_CACHE", "maybe"),
            ("OASGUARD_ERROR_MODE", "some"),
        ]));
        assert!(!config.cache_validators);
        assert_eq!(config.error_mode, ErrorMode::First);
    }

    #[test]
    fn test_apply_keeps_call_next_and_formats() {
        let options = ValidatorOptions::default()
            .with_call_next(true)
            .with_format("even", |s| s.len() % 2 == 0);
        let config = RuntimeConfig {
            cache_validators: true,
            error_mode: ErrorMode::All,
            deep_refs: true,
        };
        let merged = config.apply(options);
        assert!(merged.call_next);
        assert!(merged.cache_validators);
        assert_eq!(merged.ref_mode(), RefMode::Deep);
        assert!(merged.custom_formats.contains_key("even"));
        assert!(format!("{merged:?}").contains("even"));
    }
}
