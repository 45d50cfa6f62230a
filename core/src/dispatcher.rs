//! Dispatcher — resolve a request path + verb to one rule.
//!
//! # Algorithm
//!
//! ```text
//! verb (lowercased) ──► no rules for verb? ──► NoRulesForVerb (warn)
//!        │
//!        ▼
//! exact literal pattern == path? ──► Match (static params only)
//!        │
//!        ▼
//! for rule in registration order:
//!     rule matches path? ──► Match (static params + captured params)
//!        │
//!        ▼
//! NotFound
//! ```
//!
//! First match wins: there is no scoring, no longest-match and no retry with
//! another rule once one has matched.
//!
//! # Concurrency
//!
//! A `Dispatcher` holds the table behind an `Arc` and never mutates it. The
//! path being matched lives on the stack of each call, so one dispatcher can
//! serve any number of threads.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::trace::{DispatchTrace, TraceOutcome, TraceStep};
use crate::{Params, RequestContext, Response, RouteError, RouteTable, Rule, Verb};

/// How ambient request paths are normalized before matching.
///
/// Only [`Dispatcher::dispatch_request`] normalizes; an explicit path given
/// to [`Dispatcher::dispatch`] is used as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Base path the application is mounted under (e.g. `/index.php`).
    /// Stripped case-insensitively, only on a segment boundary.
    pub mount_prefix: String,
    /// Suffix removed from the end of the path (e.g. `.html`).
    /// Stripped case-insensitively. Empty disables stripping.
    pub suffix: String,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            mount_prefix: String::new(),
            suffix: ".html".to_owned(),
        }
    }
}

impl DispatchOptions {
    /// Set the mount prefix.
    #[must_use]
    pub fn with_mount_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.mount_prefix = prefix.into();
        self
    }

    /// Set the suffix to strip.
    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Turn a raw request target into the path rules are matched against.
    ///
    /// 1. drop scheme and authority of an absolute URI
    /// 2. drop the query string and fragment
    /// 3. strip the mount prefix and leading `/`
    /// 4. strip the suffix
    ///
    /// ```
    /// use ruta::DispatchOptions;
    ///
    /// let options = DispatchOptions::default().with_mount_prefix("/index.php");
    /// assert_eq!(options.normalize("/index.php/user/42.html?tab=1"), "user/42");
    /// assert_eq!(options.normalize("/user/42"), "user/42");
    /// ```
    #[must_use]
    pub fn normalize<'p>(&self, raw: &'p str) -> &'p str {
        let mut path = raw;

        if let Some((scheme, rest)) = path.split_once("://") {
            if !scheme.is_empty() && !scheme.contains('/') {
                path = rest.find('/').map_or("", |start| &rest[start..]);
            }
        }
        if let Some(end) = path.find(['?', '#']) {
            path = &path[..end];
        }

        path = path.trim_start_matches('/');
        let prefix = self.mount_prefix.trim_matches('/');
        if !prefix.is_empty() {
            let on_boundary = path
                .get(prefix.len()..)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'));
            let head_matches = path
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix));
            if head_matches && on_boundary {
                path = path[prefix.len()..].trim_start_matches('/');
            }
        }

        if !self.suffix.is_empty() {
            if let Some(cut) = path.len().checked_sub(self.suffix.len()) {
                if path
                    .get(cut..)
                    .is_some_and(|tail| tail.eq_ignore_ascii_case(&self.suffix))
                {
                    path = &path[..cut];
                }
            }
        }

        path
    }
}

/// A successful dispatch.
#[derive(Debug, Clone)]
pub struct RouteMatch<'t> {
    /// The rule that matched.
    pub rule: &'t Rule,
    /// The rule's response descriptor, as registered.
    pub response: &'t Response,
    /// Static parameters merged with the parameters captured from the path.
    /// Captured values win on a name collision.
    pub params: Params,
}

impl<'t> RouteMatch<'t> {
    /// The verb of the matched rule.
    #[must_use]
    pub fn verb(&self) -> Verb {
        self.rule.verb()
    }

    /// The raw pattern of the matched rule.
    #[must_use]
    pub fn pattern(&self) -> &'t str {
        self.rule.pattern()
    }

    /// A parameter as a string, if present and a string.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).and_then(Value::as_str)
    }
}

impl PartialEq for RouteMatch<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.verb() == other.verb()
            && self.pattern() == other.pattern()
            && self.response == other.response
            && self.params == other.params
    }
}

/// Result of a dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteLookup<'t> {
    /// A rule matched.
    Match(RouteMatch<'t>),
    /// The verb has rules, but none matched the path.
    NotFound,
    /// The verb has no rules at all. Reported as a warning.
    NoRulesForVerb {
        /// The lowercased verb.
        verb: String,
    },
}

impl<'t> RouteLookup<'t> {
    /// Returns `true` if a rule matched.
    #[must_use]
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match(_))
    }

    /// Returns `true` for both `NotFound` and `NoRulesForVerb`.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        !self.is_match()
    }

    /// The match, if any.
    #[must_use]
    pub fn into_match(self) -> Option<RouteMatch<'t>> {
        match self {
            Self::Match(found) => Some(found),
            Self::NotFound | Self::NoRulesForVerb { .. } => None,
        }
    }

    /// The match, if any, by reference.
    #[must_use]
    pub fn as_match(&self) -> Option<&RouteMatch<'t>> {
        match self {
            Self::Match(found) => Some(found),
            Self::NotFound | Self::NoRulesForVerb { .. } => None,
        }
    }

    /// The warning attached to this lookup (`NoRulesForVerb`), if any.
    #[must_use]
    pub fn warning(&self) -> Option<RouteError> {
        match self {
            Self::NoRulesForVerb { verb } => Some(RouteError::NoRulesForVerb { verb: verb.clone() }),
            Self::Match(_) | Self::NotFound => None,
        }
    }
}

/// Resolves requests against a shared [`RouteTable`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use ruta::prelude::*;
///
/// let mut table = RouteTable::new();
/// table.add_route("get", "user/numeric:id", "UserController.show").unwrap();
/// table.add_route("get", "user/new", "UserController.create").unwrap();
///
/// let dispatcher = Dispatcher::new(Arc::new(table))
///     .with_options(DispatchOptions::default().with_mount_prefix("/index.php"));
///
/// let request = Request::builder()
///     .method("GET")
///     .path("/index.php/user/new.html")
///     .build();
/// let found = dispatcher.dispatch_request(&request).into_match().unwrap();
/// assert_eq!(found.response, &Response::handler("UserController.create"));
///
/// let lookup = dispatcher.dispatch("user/1", "post");
/// assert!(matches!(lookup, RouteLookup::NoRulesForVerb { .. }));
/// ```
#[derive(Debug, Clone)]
pub struct Dispatcher {
    table: Arc<RouteTable>,
    options: DispatchOptions,
}

impl Dispatcher {
    /// Create a dispatcher with default [`DispatchOptions`].
    #[must_use]
    pub fn new(table: Arc<RouteTable>) -> Self {
        Self {
            table,
            options: DispatchOptions::default(),
        }
    }

    /// Replace the normalization options.
    #[must_use]
    pub fn with_options(mut self, options: DispatchOptions) -> Self {
        self.options = options;
        self
    }

    /// The table this dispatcher reads.
    #[must_use]
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// The normalization options.
    #[must_use]
    pub fn options(&self) -> &DispatchOptions {
        &self.options
    }

    /// Dispatch an already-normalized `path` under `verb` (any case).
    pub fn dispatch(&self, path: &str, verb: &str) -> RouteLookup<'_> {
        lookup(&self.table, path, verb, None)
    }

    /// Dispatch the ambient request: path normalized per [`DispatchOptions`],
    /// verb taken from the request method.
    pub fn dispatch_request<R: RequestContext + ?Sized>(&self, request: &R) -> RouteLookup<'_> {
        let path = self.options.normalize(request.request_path());
        lookup(&self.table, path, request.request_method(), None)
    }

    /// Dispatch like [`dispatch`](Self::dispatch) and record every rule tested.
    ///
    /// The trace's outcome is always what `dispatch` returns for the same input.
    #[must_use]
    pub fn dispatch_with_trace(&self, path: &str, verb: &str) -> DispatchTrace {
        let mut steps = Vec::new();
        let outcome = TraceOutcome::from(&lookup(&self.table, path, verb, Some(&mut steps)));
        DispatchTrace {
            path: path.to_owned(),
            verb: verb.trim().to_ascii_lowercase(),
            steps,
            outcome,
        }
    }
}

fn lookup<'t>(
    table: &'t RouteTable,
    path: &str,
    verb: &str,
    mut steps: Option<&mut Vec<TraceStep>>,
) -> RouteLookup<'t> {
    let verb = verb.trim().to_ascii_lowercase();
    let Some(rules) = Verb::parse(&verb).and_then(|checked| table.verb_rules(checked)) else {
        warn!(%verb, path, "no rules registered for verb");
        return RouteLookup::NoRulesForVerb { verb };
    };

    if let Some(rule) = rules.literal(path) {
        debug!(%verb, path, "literal route matched");
        return RouteLookup::Match(RouteMatch {
            rule,
            response: rule.response(),
            params: rule.params().clone(),
        });
    }

    for (index, rule) in rules.rules().iter().enumerate() {
        let captures = rule.compiled().captures(path);
        if let Some(steps) = steps.as_deref_mut() {
            steps.push(TraceStep {
                index,
                pattern: rule.pattern().to_owned(),
                regex: rule.compiled().regex().as_str().to_owned(),
                matched: captures.is_some(),
            });
        }
        if let Some(captures) = captures {
            let mut params = rule.params().clone();
            params.extend(
                captures
                    .into_iter()
                    .map(|(name, value)| (name.to_owned(), Value::String(value.to_owned()))),
            );
            debug!(%verb, path, pattern = rule.pattern(), "route matched");
            return RouteLookup::Match(RouteMatch {
                rule,
                response: rule.response(),
                params,
            });
        }
    }

    RouteLookup::NotFound
}
