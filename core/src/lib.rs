//! ruta - verb-scoped URL routing with typed path parameters
//!
//! Register path patterns against request verbs, then dispatch an incoming
//! path + verb to the first rule that matches, with the typed parameters
//! embedded in the path extracted by name.
//!
//! # Architecture
//!
//! - [`ParamTypes`] — Parameter type registry (`numeric`, `alnum`, `any`, ...)
//! - [`CompiledRule`] — Pattern compiler: `user/numeric:id` → `^user/([0-9]+)$`
//! - [`RouteTable`] — Verb → insertion-ordered rules (first registered, first matched)
//! - [`Dispatcher`] — Literal fast path, then first-match-wins over compiled rules
//!
//! # Pattern Syntax
//!
//! Patterns are `/`-separated segments. A segment is either a literal, matched
//! verbatim (case-insensitively), or a typed parameter:
//!
//! | Segment | Meaning |
//! |---------|---------|
//! | `user` | literal text |
//! | `numeric:id` | required parameter `id` of type `numeric` |
//! | `any:slug?` | optional parameter `slug`; the segment and its `/` may be absent |
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use ruta::prelude::*;
//!
//! let mut table = RouteTable::new();
//! table.add_route("get", "user/numeric:id", "UserController.show").unwrap();
//! table.add_route("get", "post/any:slug?", ("PostController", "show")).unwrap();
//!
//! let dispatcher = Dispatcher::new(Arc::new(table));
//!
//! let found = dispatcher.dispatch("user/42", "GET").into_match().unwrap();
//! assert_eq!(found.response, &Response::handler("UserController.show"));
//! assert_eq!(found.param("id"), Some("42"));
//!
//! let found = dispatcher.dispatch("post", "get").into_match().unwrap();
//! assert_eq!(found.param("slug"), None);
//!
//! assert!(dispatcher.dispatch("user/abc", "get").is_not_found());
//! ```
//!
//! # Warnings vs errors
//!
//! Registration never aborts the application. Problems come back as
//! [`RouteError`] values (and are logged through `tracing`); the caller decides
//! whether to abort, log or ignore. A failed lookup is a normal
//! [`RouteLookup::NotFound`], not an error.

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod dispatcher;
mod param_type;
mod pattern;
mod request;
mod response;
mod table;
mod trace;
mod verb;

#[cfg(feature = "serde")]
mod config;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

pub use dispatcher::{DispatchOptions, Dispatcher, RouteLookup, RouteMatch};
pub use param_type::ParamTypes;
pub use pattern::CompiledRule;
pub use request::{Request, RequestBuilder, RequestContext};
pub use response::Response;
pub use table::{Params, Registered, RouteTable, Rule};
pub use trace::{DispatchTrace, TraceOutcome, TraceStep};
pub use verb::{Verb, VerbSet};

#[cfg(feature = "serde")]
pub use config::{ConfigLoad, DispatchConfig, RouteConfig, RoutesConfig};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use ruta::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        CompiledRule, DispatchOptions, DispatchTrace, Dispatcher, ParamTypes, Params, Registered,
        Request, RequestContext, Response, RouteError, RouteLookup, RouteMatch, RouteTable, Rule,
        Verb, VerbSet,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum length of a raw route pattern.
///
/// Compiled rules are regexes; bounding the source keeps compilation cheap.
pub const MAX_PATTERN_LENGTH: usize = 4096;

/// Maximum compiled size of a single rule's regex, in bytes.
pub const MAX_REGEX_SIZE: usize = 1 << 20;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Problems reported by registration, compilation and dispatch.
///
/// Some variants are warnings in the warn-and-continue sense: the table stays
/// usable and the rest of the routes are unaffected. See [`is_warning`](Self::is_warning).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// Registration for a verb outside the allowed set. The rule is skipped.
    #[error("request verb \"{verb}\" is not allowed — allowed: {}", .allowed.join(", "))]
    ForbiddenVerb {
        /// The verb as given by the caller.
        verb: String,
        /// Verbs currently allowed (for self-correcting messages).
        allowed: Vec<String>,
    },

    /// Registration without a response. The rule is kept with [`Response::None`].
    #[error("undefined response in the rule \"{pattern}\"")]
    MissingResponse {
        /// The pattern registered without a response.
        pattern: String,
    },

    /// A pattern references a parameter type that is not registered.
    #[error("unknown parameter type \"{tag}\" — registered: {}", .available.join(", "))]
    UnknownTypeTag {
        /// The unregistered tag.
        tag: String,
        /// Tags that ARE registered.
        available: Vec<String>,
    },

    /// Dispatch for a verb that has no rules at all.
    #[error("no rules registered for verb \"{verb}\"")]
    NoRulesForVerb {
        /// The (lowercased) verb that was dispatched.
        verb: String,
    },

    /// A parameter type tag is not of the form `[a-z_0-9]+`.
    #[error("invalid parameter type tag \"{tag}\": expected [a-z_0-9]+")]
    InvalidTypeTag {
        /// The rejected tag.
        tag: String,
    },

    /// A parameter type fragment is not a usable regex fragment.
    #[error("invalid fragment for parameter type \"{tag}\": {reason}")]
    InvalidFragment {
        /// The tag being registered.
        tag: String,
        /// Why the fragment was rejected.
        reason: String,
    },

    /// A pattern failed to compile into a matcher.
    #[error("invalid pattern \"{pattern}\": {reason}")]
    InvalidPattern {
        /// The raw pattern.
        pattern: String,
        /// The underlying error message.
        reason: String,
    },

    /// The same parameter name appears twice in one pattern.
    #[error("parameter \"{name}\" appears more than once in \"{pattern}\"")]
    DuplicateParameter {
        /// The raw pattern.
        pattern: String,
        /// The repeated parameter name.
        name: String,
    },

    /// A pattern exceeds [`MAX_PATTERN_LENGTH`].
    #[error("pattern length is {len}, but maximum allowed is {max}")]
    PatternTooLong {
        /// Actual length of the pattern.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },

    /// A route file could not be read or deserialized.
    #[error("invalid config: {reason}")]
    InvalidConfig {
        /// The underlying error message.
        reason: String,
    },
}

impl RouteError {
    /// Returns `true` for the warn-and-continue variants.
    ///
    /// `ForbiddenVerb` and `MissingResponse` come from registration,
    /// `NoRulesForVerb` from dispatch. Everything else is a hard error for the
    /// rule or type that caused it.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::ForbiddenVerb { .. } | Self::MissingResponse { .. } | Self::NoRulesForVerb { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_type_tag_lists_available() {
        let err = RouteError::UnknownTypeTag {
            tag: "uuid".into(),
            available: vec!["alnum".into(), "any".into(), "numeric".into()],
        };
        assert_eq!(
            err.to_string(),
            "unknown parameter type \"uuid\" — registered: alnum, any, numeric"
        );
    }

    #[test]
    fn forbidden_verb_message() {
        let err = RouteError::ForbiddenVerb {
            verb: "trace".into(),
            allowed: vec!["get".into(), "post".into()],
        };
        assert_eq!(
            err.to_string(),
            "request verb \"trace\" is not allowed — allowed: get, post"
        );
    }

    #[test]
    fn warning_classification() {
        assert!(RouteError::MissingResponse {
            pattern: "x".into()
        }
        .is_warning());
        assert!(RouteError::NoRulesForVerb { verb: "put".into() }.is_warning());
        assert!(!RouteError::PatternTooLong { len: 2, max: 1 }.is_warning());
        assert!(!RouteError::UnknownTypeTag {
            tag: "uuid".into(),
            available: vec![],
        }
        .is_warning());
    }

    #[test]
    fn route_types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RouteTable>();
        assert_send_sync::<Dispatcher>();
        assert_send_sync::<RouteError>();
    }
}
