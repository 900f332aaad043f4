//! # Validator Cache Module
//!
//! Thread-safe cache of compiled request validators, keyed per operation.
//!
//! ## Overview
//!
//! Building and compiling the composite request schema is the expensive part of
//! interception. When enabled, the cache keeps one [`CompiledSchema`] per
//! `(spec version, method, template)` and shares it across requests with `Arc`.
//!
//! ## Cache Key Structure
//!
//! Cache keys are formatted as: `{spec_version}:{spec_hash}:{METHOD}:{template}`
//! - `spec_version`: counter bumped whenever the validator's document is replaced
//! - `spec_hash`: first 16 hex chars of the SHA-256 of the document content
//! - `METHOD`: uppercase HTTP method
//! - `template`: the path template as written in the document
//!
//! ## Thread Safety
//!
//! `Arc<RwLock<HashMap>>`: readers share the lock on hits, a miss takes the write
//! lock only to insert. A poisoned lock is recovered rather than propagated; the
//! map holds no invariant a panicking writer could break.
//!
//! ## Configuration
//!
//! Disabled by default. Enable with `OASGUARD_VALIDATOR_CACHE=on` or
//! [`ValidatorOptions::with_cache`](crate::runtime_config::ValidatorOptions::with_cache).

use crate::error::InterceptError;
use crate::validator::{CompiledSchema, SchemaValidator};
use http::Method;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

/// Version identifier for a contract document
///
/// Combines a monotonic version counter with a content hash, so validators
/// compiled for one document are never served for another.
///
/// # Example
///
/// ```rust
/// use oasguard::validator_cache::SpecVersion;
///
/// let v1 = SpecVersion::new(1, "abc123def456");
/// let v2 = SpecVersion::from_content(2, b"openapi: 3.0.0");
/// assert_ne!(v1, v2);
/// assert_eq!(v2.hash.len(), 16);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpecVersion {
    /// Monotonic version counter
    pub version: u64,
    /// Content hash of the document (first 16 chars of SHA-256)
    pub hash: String,
}

impl SpecVersion {
    pub fn new(version: u64, hash: impl Into<String>) -> Self {
        Self {
            version,
            hash: hash.into(),
        }
    }

    /// Version from raw document content.
    #[must_use]
    pub fn from_content(version: u64, content: &[u8]) -> Self {
        Self {
            version,
            hash: content_hash(content),
        }
    }

    /// `"{version}:{hash}"`
    #[must_use]
    pub fn to_key(&self) -> String {
        format!("{}:{}", self.version, self.hash)
    }
}

impl Default for SpecVersion {
    fn default() -> Self {
        Self {
            version: 1,
            hash: "initial".to_string(),
        }
    }
}

fn content_hash(content: &[u8]) -> String {
    let digest = Sha256::digest(content);
    format!("{digest:x}").chars().take(16).collect()
}

type CacheMap = HashMap<String, Arc<dyn CompiledSchema>>;

/// Thread-safe cache of compiled request validators.
///
/// # Example
///
/// ```rust
/// use http::Method;
/// use oasguard::validator::JsonSchemaEngine;
/// use oasguard::validator_cache::ValidatorCache;
/// use serde_json::json;
///
/// let cache = ValidatorCache::new(true);
/// let engine = JsonSchemaEngine::new();
/// let validator = cache
///     .get_or_compile(&Method::GET, "/items/{id}", &engine, || Ok(json!({ "type": "object" })))
///     .unwrap();
/// assert!(validator.is_valid(&json!({})));
/// assert_eq!(cache.size(), 1);
/// ```
#[derive(Clone)]
pub struct ValidatorCache {
    cache: Arc<RwLock<CacheMap>>,
    enabled: bool,
    spec_version: Arc<RwLock<SpecVersion>>,
}

impl std::fmt::Debug for ValidatorCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorCache")
            .field("enabled", &self.enabled)
            .field("size", &self.size())
            .field("spec_version", &self.spec_version())
            .finish()
    }
}

impl ValidatorCache {
    pub fn new(enabled: bool) -> Self {
        info!(enabled = enabled, "Initializing request validator cache");
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            enabled,
            spec_version: Arc::new(RwLock::new(SpecVersion::default())),
        }
    }

    fn cache_key(spec_version: &SpecVersion, method: &Method, template: &str) -> String {
        format!("{}:{}:{}", spec_version.to_key(), method.as_str(), template)
    }

    fn read_map(&self) -> RwLockReadGuard<'_, CacheMap> {
        self.cache.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_map(&self) -> RwLockWriteGuard<'_, CacheMap> {
        self.cache.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_version(&self) -> RwLockWriteGuard<'_, SpecVersion> {
        self.spec_version
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Get the cached validator for an operation, or build and compile one.
    ///
    /// `build` produces the composite schema and only runs on a miss (or on every
    /// call when the cache is disabled). Errors from `build` or from compilation
    /// are returned and nothing is cached.
    pub fn get_or_compile<F>(
        &self,
        method: &Method,
        template: &str,
        engine: &dyn SchemaValidator,
        build: F,
    ) -> Result<Arc<dyn CompiledSchema>, InterceptError>
    where
        F: FnOnce() -> Result<Value, InterceptError>,
    {
        if !self.enabled {
            return engine.compile(&build()?);
        }

        let spec_version = self.spec_version();
        let key = Self::cache_key(&spec_version, method, template);

        if let Some(validator) = self.read_map().get(&key) {
            debug!(
                method = %method,
                template = template,
                cache_key = %key,
                "Request validator cache hit"
            );
            return Ok(Arc::clone(validator));
        }

        let compiled = engine.compile(&build()?)?;

        let mut cache = self.write_map();
        if let Some(existing) = cache.get(&key) {
            debug!(
                method = %method,
                template = template,
                cache_key = %key,
                "Request validator compiled by another thread"
            );
            return Ok(Arc::clone(existing));
        }
        cache.insert(key.clone(), Arc::clone(&compiled));
        info!(
            method = %method,
            template = template,
            spec_version = spec_version.version,
            spec_hash = %spec_version.hash,
            cache_key = %key,
            cache_size = cache.len(),
            "Request validator compiled and cached"
        );
        Ok(compiled)
    }

    /// Number of cached validators.
    pub fn size(&self) -> usize {
        self.read_map().len()
    }

    /// Adopt a version computed elsewhere (e.g. by [`ApiSpec`](crate::spec::ApiSpec)).
    ///
    /// Entries under a different version are dropped.
    pub fn set_spec_version(&self, spec_version: SpecVersion) {
        let mut cache = self.write_map();
        let mut version = self.write_version();
        if *version != spec_version {
            cache.clear();
            *version = spec_version;
        }
    }

    pub fn spec_version(&self) -> SpecVersion {
        self.spec_version
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}
