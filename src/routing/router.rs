//! Route table mapping resource paths to handlers.
//!
//! # Responsibilities
//! - Store one handler per resource path
//! - Reject duplicate and malformed paths
//! - Resolve a request path to the handler registered at its longest prefix
//!
//! # Design Decisions
//! - Registering a path twice is a configuration error, not last-wins
//! - A registered path serves itself and everything below it:
//!   `/action/foo` also serves `/action/foo/x`, but not `/action/foobar`
//! - Path matching is case-sensitive

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::ConfigurationError;
use crate::http::Handler;

/// Resource path to handler table.
#[derive(Clone, Default)]
pub struct RouteTable {
    routes: BTreeMap<String, Arc<dyn Handler>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` at `path`.
    pub fn insert(
        &mut self,
        path: impl Into<String>,
        handler: Arc<dyn Handler>,
    ) -> Result<(), ConfigurationError> {
        let path = path.into();
        if !path.starts_with('/') {
            return Err(ConfigurationError::InvalidPath(path));
        }
        if self.routes.contains_key(&path) {
            return Err(ConfigurationError::DuplicatePath(path));
        }

        tracing::debug!(path = %path, "Route registered");
        self.routes.insert(path, handler);
        Ok(())
    }

    /// The registered path that is the longest prefix of `request_path`,
    /// with its handler.
    pub fn resolve(&self, request_path: &str) -> Option<(&str, &Arc<dyn Handler>)> {
        self.routes
            .iter()
            .filter(|(path, _)| covers(path, request_path))
            .max_by_key(|(path, _)| path.len())
            .map(|(path, handler)| (path.as_str(), handler))
    }

    /// Registered paths in lexical order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.paths()).finish()
    }
}

/// True if `prefix` is `path` itself or one of its leading segments.
fn covers(prefix: &str, path: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || prefix.ends_with('/'),
        None => false,
    }
}
