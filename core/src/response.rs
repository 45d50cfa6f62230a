//! Opaque response descriptors.

use std::fmt;

/// What a rule resolves to.
///
/// The engine never interprets a response; it stores it at registration and
/// hands it back from dispatch. Interpreting it (instantiating a controller,
/// calling a handler) is the caller's job.
///
/// In route files a response is written as a string (`UserController.show`),
/// a two-element list (`[UserController, show]`) or a map
/// (`{ target: UserController, action: show }`).
///
/// ```
/// use ruta::Response;
///
/// assert_eq!(Response::from("home"), Response::handler("home"));
/// assert_eq!(
///     Response::from(("UserController", "show")),
///     Response::action("UserController", "show"),
/// );
/// assert!(Response::from(None::<&str>).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged, from = "ResponseRepr"))]
pub enum Response {
    /// No response was given at registration.
    #[default]
    None,
    /// A flat identifier, e.g. a handler name.
    Handler(String),
    /// A `(target, action)` pair, e.g. controller and method.
    Action { target: String, action: String },
}

impl Response {
    /// A flat identifier response.
    pub fn handler(name: impl Into<String>) -> Self {
        Self::Handler(name.into())
    }

    /// A `(target, action)` response.
    pub fn action(target: impl Into<String>, action: impl Into<String>) -> Self {
        Self::Action {
            target: target.into(),
            action: action.into(),
        }
    }

    /// Returns `true` if no response was given.
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl From<&str> for Response {
    fn from(name: &str) -> Self {
        Self::handler(name)
    }
}

impl From<String> for Response {
    fn from(name: String) -> Self {
        Self::Handler(name)
    }
}

impl<T: Into<String>, A: Into<String>> From<(T, A)> for Response {
    fn from((target, action): (T, A)) -> Self {
        Self::action(target, action)
    }
}

impl<R: Into<Response>> From<Option<R>> for Response {
    fn from(response: Option<R>) -> Self {
        response.map_or(Self::None, Into::into)
    }
}

/// Every shape a response may take in a route file.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum ResponseRepr {
    Missing,
    Handler(String),
    Pair(String, String),
    Action { target: String, action: String },
}

#[cfg(feature = "serde")]
impl From<ResponseRepr> for Response {
    fn from(repr: ResponseRepr) -> Self {
        match repr {
            ResponseRepr::Missing => Self::None,
            ResponseRepr::Handler(name) => Self::Handler(name),
            ResponseRepr::Pair(target, action) | ResponseRepr::Action { target, action } => {
                Self::Action { target, action }
            }
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("(none)"),
            Self::Handler(name) => f.write_str(name),
            Self::Action { target, action } => write!(f, "{target}::{action}"),
        }
    }
}
