//! High-level router API.

use http::Method;

use crate::error::RouteError;
use crate::node::Node;
use crate::params::Params;
use crate::RouteMatch;

/// Radix tree router from `(method, path)` to `T`.
///
/// # Route priority
///
/// 1. static segments (`/users/me`)
/// 2. parameter segments (`/users/{id}`)
/// 3. wildcard segments (`/files/*path`)
#[derive(Debug, Clone)]
pub struct Router<T> {
    root: Node<T>,
    route_count: usize,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Router<T> {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            route_count: 0,
        }
    }

    /// Registers `value` for `method` and `pattern`.
    ///
    /// # Errors
    ///
    /// Fails on malformed patterns, on a method registered twice for the same
    /// pattern, and on parameter names that disagree with an existing route
    /// at the same position.
    pub fn insert(&mut self, method: &Method, pattern: &str, value: T) -> Result<(), RouteError> {
        self.root.insert(method, pattern, value)?;
        self.route_count += 1;
        Ok(())
    }

    /// Looks up the value for a request.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_, T>> {
        let (methods, params) = self.root.match_path(path)?;
        let value = methods.get(method)?;
        Some(RouteMatch::new(value, params))
    }

    /// Methods registered for the pattern matching `path`, empty when no
    /// pattern matches. Used to tell 404 from 405.
    #[must_use]
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        self.root
            .match_path(path)
            .map(|(methods, _)| methods.methods().cloned().collect())
            .unwrap_or_default()
    }

    /// Matches `path` regardless of method.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<Params> {
        self.root.match_path(path).map(|(_, params)| params)
    }

    /// Number of registered `(method, pattern)` pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.route_count
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_new() {
        let router: Router<usize> = Router::new();
        assert!(router.is_empty());
        assert_eq!(router.len(), 0);
    }

    #[test]
    fn test_router_counts_routes() {
        let mut router = Router::new();
        router.insert(&Method::GET, "/a", 0).unwrap();
        router.insert(&Method::POST, "/a", 1).unwrap();
        assert_eq!(router.len(), 2);
    }

    #[test]
    fn test_failed_insert_does_not_count() {
        let mut router = Router::new();
        router.insert(&Method::GET, "/a", 0).unwrap();
        assert!(router.insert(&Method::GET, "/a", 1).is_err());
        assert_eq!(router.len(), 1);
    }

    #[test]
    fn test_match_wildcard() {
        let mut router = Router::new();
        router.insert(&Method::GET, "/static/*file", "assets").unwrap();
        let m = router.match_route(&Method::GET, "/static/css/site.css").unwrap();
        assert_eq!(*m.value, "assets");
        assert_eq!(m.params.get("file"), Some("css/site.css"));
    }

    #[test]
    fn test_allowed_methods_for_unknown_path() {
        let mut router = Router::new();
        router.insert(&Method::GET, "/a", 0).unwrap();
        assert!(router.allowed_methods("/b").is_empty());
        assert!(router.match_path("/b").is_none());
    }
}
