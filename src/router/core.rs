//! Router core module - compiled path templates and first-match route lookup.

use crate::error::ConfigError;
use crate::spec::ApiSpec;
use regex::Regex;
use serde_json::{Map, Value};
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{debug, info};

/// Maximum number of path parameters before heap allocation.
/// Most REST APIs have ≤4 path params (e.g., /users/{id}/posts/{postId}).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Extracted path parameters in template order.
///
/// Names are shared with the compiled matcher; values are per-request and are
/// `Value::Null` when an optional placeholder did not capture anything.
pub type ParamVec = SmallVec<[(Arc<str>, Value); MAX_INLINE_PARAMS]>;

/// Drop everything from the first `?` on.
#[inline]
#[must_use]
pub fn strip_query(path: &str) -> &str {
    path.split_once('?').map_or(path, |(p, _)| p)
}

/// A path template compiled into a case-insensitive regex.
///
/// Invariant: the regex has exactly one capture group per entry of
/// `param_names`, in the same order as the placeholders in the template.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    regex: Regex,
    param_names: Vec<Arc<str>>,
}

impl PathMatcher {
    /// Compile an OpenAPI path template.
    ///
    /// | template segment | matches |
    /// |------------------|---------|
    /// | `users`          | the literal `users` (any ASCII case) |
    /// | `{id}`           | one non-empty segment, captured as `id` |
    /// | `{id?}`          | an optional segment; `null` when absent |
    /// | `{file}.json`    | a segment ending in `.json`, prefix captured as `file` |
    ///
    /// A single trailing `/` on the request path is accepted. A segment holding
    /// more than one placeholder (`{a}-{b}`) is rejected.
    pub fn compile(template: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidTemplate {
            template: template.to_string(),
            reason: reason.to_string(),
        };

        let mut pattern = String::with_capacity(template.len() + 16);
        pattern.push_str("(?i)^");
        let mut param_names: Vec<Arc<str>> = Vec::with_capacity(template.matches('{').count());

        for segment in template.split('/').filter(|s| !s.is_empty()) {
            let placeholder = segment
                .strip_prefix('{')
                .and_then(|rest| rest.split_once('}'));
            let Some((inner, suffix)) = placeholder else {
                pattern.push('/');
                pattern.push_str(&regex::escape(segment));
                continue;
            };

            let (name, optional) = match inner.strip_suffix('?') {
                Some(name) => (name, true),
                None => (inner, false),
            };
            if name.is_empty() {
                return Err(invalid("empty placeholder name"));
            }
            if suffix.contains(['{', '}']) {
                return Err(invalid("at most one placeholder per segment"));
            }

            let capture = format!("/([^/]+?){}", regex::escape(suffix));
            if optional {
                pattern.push_str("(?:");
                pattern.push_str(&capture);
                pattern.push_str(")?");
            } else {
                pattern.push_str(&capture);
            }
            param_names.push(Arc::from(name));
        }

        pattern.push_str("/?$");
        let regex = Regex::new(&pattern).map_err(|e| invalid(&e.to_string()))?;
        if regex.captures_len() - 1 != param_names.len() {
            return Err(invalid("capture groups do not line up with placeholders"));
        }

        Ok(Self { regex, param_names })
    }

    /// Whether `path` (query string ignored) matches the template.
    #[inline]
    #[must_use]
    pub fn test(&self, path: &str) -> bool {
        self.regex.is_match(strip_query(path))
    }

    /// Extract placeholder values from `path` (query string ignored).
    ///
    /// Returns `None` when the path does not match.
    #[must_use]
    pub fn extract(&self, path: &str) -> Option<ParamVec> {
        let caps = self.regex.captures(strip_query(path))?;
        Some(
            self.param_names
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    let value = caps
                        .get(i + 1)
                        .map(|m| Value::String(m.as_str().to_string()))
                        .unwrap_or(Value::Null);
                    (Arc::clone(name), value)
                })
                .collect(),
        )
    }

    /// Placeholder names in template order.
    #[must_use]
    pub fn param_names(&self) -> &[Arc<str>] {
        &self.param_names
    }

    /// Number of capture groups in the compiled regex.
    #[must_use]
    pub fn capture_count(&self) -> usize {
        self.regex.captures_len() - 1
    }

    /// The generated regex source, for diagnostics.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// A template from the document together with its matcher.
#[derive(Debug, Clone)]
pub struct CompiledRoute {
    pub template: Arc<str>,
    pub matcher: PathMatcher,
}

/// Result of matching a request path against the route table.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    /// The first route whose matcher accepted the path
    pub route: &'a CompiledRoute,
    /// Path parameters extracted from the URL (e.g., `{id}` → `{"id": "123"}`)
    pub path_params: ParamVec,
}

impl RouteMatch<'_> {
    /// Get a path parameter by name.
    ///
    /// Uses "last write wins" semantics if a name repeats in the template.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&Value> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v)
    }

    /// Path parameters as a JSON object, ready to attach to a request.
    #[must_use]
    pub fn params_object(&self) -> Map<String, Value> {
        params_to_object(&self.path_params)
    }
}

/// Convert extracted parameters into a JSON object (last write wins).
#[must_use]
pub fn params_to_object(params: &ParamVec) -> Map<String, Value> {
    params
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// Path templates compiled once, kept in document declaration order.
///
/// Lookup is a linear first-match scan: the first template whose matcher
/// accepts the path wins, even if a later template is a literal exact match.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<CompiledRoute>,
}

impl RouteTable {
    /// Compile every template under `paths` in the order the document declares them.
    pub fn from_spec(spec: &ApiSpec) -> Result<Self, ConfigError> {
        Self::from_templates(spec.paths().map(|(template, _)| template.as_str()))
    }

    /// Compile an explicit, ordered list of templates.
    pub fn from_templates<'a>(templates: impl IntoIterator<Item = &'a str>) -> Result<Self, ConfigError> {
        let routes = templates
            .into_iter()
            .map(|template| {
                Ok(CompiledRoute {
                    template: Arc::from(template),
                    matcher: PathMatcher::compile(template)?,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let routes_summary: Vec<&str> = routes.iter().take(10).map(|r| r.template.as_ref()).collect();
        info!(
            routes_count = routes.len(),
            routes_summary = ?routes_summary,
            "Route table compiled"
        );

        Ok(Self { routes })
    }

    /// Find the first route matching `path` and extract its parameters.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<RouteMatch<'_>> {
        let matched = self.routes.iter().find_map(|route| {
            route
                .matcher
                .extract(path)
                .map(|path_params| RouteMatch { route, path_params })
        });
        match &matched {
            Some(m) => debug!(
                path = %path,
                route_pattern = %m.route.template,
                path_params = ?m.path_params,
                "Route matched"
            ),
            None => debug!(path = %path, "No route matched"),
        }
        matched
    }

    /// Compiled routes in match order.
    pub fn iter(&self) -> impl Iterator<Item = &CompiledRoute> {
        self.routes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
