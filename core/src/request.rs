//! Ambient request inputs.
//!
//! The transport layer owns the real request. The dispatcher only needs the
//! raw request target and method, which it reads through [`RequestContext`].

/// Source of the ambient request path and method.
///
/// Implement this for your transport's request type to use
/// [`Dispatcher::dispatch_request`](crate::Dispatcher::dispatch_request).
pub trait RequestContext {
    /// The raw request target, e.g. `/index.php/user/42.html?tab=posts`.
    fn request_path(&self) -> &str;

    /// The request method, in any case.
    fn request_method(&self) -> &str;
}

/// Simple request context.
///
/// Use this for testing or when the transport hands over plain strings.
#[derive(Debug, Clone, Default)]
pub struct Request {
    method: String,
    path: String,
}

impl Request {
    /// Create a builder for `Request`.
    #[must_use]
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    /// Get the request method.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Get the raw request path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl RequestContext for Request {
    fn request_path(&self) -> &str {
        &self.path
    }

    fn request_method(&self) -> &str {
        &self.method
    }
}

/// Builder for `Request`.
#[derive(Debug, Default)]
pub struct RequestBuilder {
    request: Request,
}

impl RequestBuilder {
    /// Set the request method.
    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.request.method = method.into();
        self
    }

    /// Set the raw request path.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.request.path = path.into();
        self
    }

    /// Build the `Request`.
    #[must_use]
    pub fn build(self) -> Request {
        self.request
    }
}
