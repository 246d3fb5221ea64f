//! Per-path method table.

use http::Method;
use smallvec::SmallVec;

/// Maps HTTP methods to values for a single path pattern.
///
/// Most paths carry one to four methods, so the table is a small inline
/// vector searched linearly. Any method is accepted, including extension
/// methods.
///
/// # Example
///
/// ```rust
/// use http::Method;
/// use vestibule_router::MethodRouter;
///
/// let mut methods = MethodRouter::new();
/// methods.insert(Method::GET, "list").unwrap();
/// methods.insert(Method::POST, "create").unwrap();
///
/// assert_eq!(methods.get(&Method::GET), Some(&"list"));
/// assert_eq!(methods.get(&Method::DELETE), None);
/// ```
#[derive(Debug, Clone)]
pub struct MethodRouter<T> {
    routes: SmallVec<[(Method, T); 4]>,
}

impl<T> Default for MethodRouter<T> {
    fn default() -> Self {
        Self {
            routes: SmallVec::new(),
        }
    }
}

impl<T> MethodRouter<T> {
    /// Creates an empty method table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a value for `method`.
    ///
    /// Returns the value back if the method is already taken.
    pub fn insert(&mut self, method: Method, value: T) -> Result<(), T> {
        if self.routes.iter().any(|(m, _)| *m == method) {
            return Err(value);
        }
        self.routes.push((method, value));
        Ok(())
    }

    /// Returns the value registered for `method`.
    #[must_use]
    pub fn get(&self, method: &Method) -> Option<&T> {
        self.routes
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, v)| v)
    }

    /// Returns the registered methods in registration order.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.routes.iter().map(|(m, _)| m)
    }

    /// Returns true if no method is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Returns the number of registered methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut methods = MethodRouter::new();
        methods.insert(Method::PUT, 3).unwrap();
        assert_eq!(methods.get(&Method::PUT), Some(&3));
        assert_eq!(methods.get(&Method::GET), None);
        assert_eq!(methods.len(), 1);
    }

    #[test]
    fn test_duplicate_method_is_rejected() {
        let mut methods = MethodRouter::new();
        methods.insert(Method::GET, 1).unwrap();
        assert_eq!(methods.insert(Method::GET, 2), Err(2));
        assert_eq!(methods.get(&Method::GET), Some(&1));
    }

    #[test]
    fn test_extension_method() {
        let purge = Method::from_bytes(b"PURGE").unwrap();
        let mut methods = MethodRouter::new();
        methods.insert(purge.clone(), "purge").unwrap();
        assert_eq!(methods.get(&purge), Some(&"purge"));
    }

    #[test]
    fn test_methods_keep_registration_order() {
        let mut methods = MethodRouter::new();
        methods.insert(Method::POST, ()).unwrap();
        methods.insert(Method::GET, ()).unwrap();
        let order: Vec<_> = methods.methods().cloned().collect();
        assert_eq!(order, vec![Method::POST, Method::GET]);
    }
}
