//! ruta-test: helpers for testing route tables
//!
//! Provides a compact way to declare a route set in tests and, with the
//! `fixtures` feature, a YAML conformance fixture runner.
//!
//! # Example
//!
//! ```
//! use ruta_test::prelude::*;
//!
//! let dispatcher = RouteSet::new()
//!     .route("get", "user/numeric:id", "UserController.show")
//!     .route("get", "post/any:slug?", ("PostController", "show"))
//!     .dispatcher()
//!     .unwrap();
//!
//! let found = dispatcher.dispatch("user/42", "get").into_match().unwrap();
//! assert_eq!(found.param("id"), Some("42"));
//! ```

use std::sync::Arc;

use ruta::prelude::*;

#[cfg(feature = "fixtures")]
pub mod fixture;

/// A route declaration waiting to be registered.
#[derive(Debug, Clone)]
struct Declared {
    verb: String,
    pattern: String,
    response: Response,
}

/// Route set builder for tests.
///
/// Collects routes, then registers them all at once. Registration stops at the
/// first hard error, so a typo in a test pattern fails loudly.
#[derive(Debug, Clone, Default)]
pub struct RouteSet {
    types: Vec<(String, String)>,
    routes: Vec<Declared>,
}

impl RouteSet {
    /// Create an empty route set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter type (builder pattern).
    #[must_use]
    pub fn param_type(mut self, tag: impl Into<String>, fragment: impl Into<String>) -> Self {
        self.types.push((tag.into(), fragment.into()));
        self
    }

    /// Add a route (builder pattern).
    #[must_use]
    pub fn route(
        mut self,
        verb: impl Into<String>,
        pattern: impl Into<String>,
        response: impl Into<Response>,
    ) -> Self {
        self.routes.push(Declared {
            verb: verb.into(),
            pattern: pattern.into(),
            response: response.into(),
        });
        self
    }

    /// Register everything into a fresh table.
    ///
    /// # Errors
    ///
    /// The first registration error met, in declaration order. Warnings
    /// (missing response) do not fail.
    pub fn table(self) -> Result<RouteTable, RouteError> {
        let mut table = RouteTable::new();
        table.set_param_types(self.types)?;
        for route in self.routes {
            table.add_route(&route.verb, &route.pattern, route.response)?;
        }
        Ok(table)
    }

    /// Register everything and wrap the table in a [`Dispatcher`].
    ///
    /// # Errors
    ///
    /// Same as [`table`](Self::table).
    pub fn dispatcher(self) -> Result<Dispatcher, RouteError> {
        self.table().map(|table| Dispatcher::new(Arc::new(table)))
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::RouteSet;
    pub use ruta::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_set_registers_in_order() {
        let table = RouteSet::new()
            .route("get", "b", "B")
            .route("get", "a", "A")
            .table()
            .unwrap();

        let patterns: Vec<&str> = table.rules(Verb::Get).iter().map(Rule::pattern).collect();
        assert_eq!(patterns, vec!["b", "a"]);
    }

    #[test]
    fn test_route_set_custom_type() {
        let dispatcher = RouteSet::new()
            .param_type("hex", "[0-9a-f]+")
            .route("get", "color/hex:code", "Color")
            .dispatcher()
            .unwrap();

        let found = dispatcher.dispatch("color/ff00aa", "get").into_match().unwrap();
        assert_eq!(found.param("code"), Some("ff00aa"));
    }

    #[test]
    fn test_route_set_fails_on_hard_error() {
        let err = RouteSet::new()
            .route("get", "item/uuid:id", "Item")
            .table()
            .unwrap_err();
        assert!(matches!(err, RouteError::UnknownTypeTag { .. }));

        let err = RouteSet::new().route("trace", "x", "X").table().unwrap_err();
        assert!(matches!(err, RouteError::ForbiddenVerb { .. }));
    }

    #[test]
    fn test_shared_dispatcher_across_threads() {
        let dispatcher = Arc::new(
            RouteSet::new()
                .route("get", "user/numeric:id", "show")
                .dispatcher()
                .unwrap(),
        );

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let dispatcher = Arc::clone(&dispatcher);
                std::thread::spawn(move || {
                    let path = format!("user/{i}");
                    let found = dispatcher.dispatch(&path, "get").into_match().unwrap();
                    found.param("id").map(str::to_owned)
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), Some(i.to_string()));
        }
    }
}
