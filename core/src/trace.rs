//! Dispatch trace types for debugging route resolution.
//!
//! A trace records every rule the dispatcher tested, in order, and what it
//! finally decided. Use [`Dispatcher::dispatch_with_trace`](crate::Dispatcher::dispatch_with_trace)
//! to see why a path resolved to a rule (or to none).
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use ruta::{Dispatcher, RouteTable};
//!
//! let mut table = RouteTable::new();
//! table.add_route("get", "user/numeric:id", "show").unwrap();
//! table.add_route("get", "user/alnum:name", "by_name").unwrap();
//!
//! let trace = Dispatcher::new(Arc::new(table)).dispatch_with_trace("user/bob", "get");
//! for step in &trace.steps {
//!     println!("rule[{}] {}: matched={}", step.index, step.pattern, step.matched);
//! }
//! assert!(trace.outcome.is_match());
//! ```

use std::fmt;

use crate::{Params, Response, RouteLookup};

/// Trace of one dispatch.
///
/// # INV: `outcome` == `dispatch()` result
///
/// The `outcome` field always describes what
/// [`Dispatcher::dispatch`](crate::Dispatcher::dispatch) returns for the same
/// path and verb.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchTrace {
    /// The path as given.
    pub path: String,
    /// The verb, lowercased.
    pub verb: String,
    /// Each rule tested by the ordered walk. Stops after the first match.
    /// Empty when the literal fast path answered.
    pub steps: Vec<TraceStep>,
    /// The final decision.
    pub outcome: TraceOutcome,
}

impl DispatchTrace {
    /// Returns `true` if the exact-literal lookup answered without walking rules.
    #[must_use]
    pub fn fast_path(&self) -> bool {
        self.outcome.is_match() && self.steps.is_empty()
    }
}

impl fmt::Display for DispatchTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.verb, self.path)?;
        if self.fast_path() {
            writeln!(f, "  literal lookup hit")?;
        }
        for step in &self.steps {
            let mark = if step.matched { "match" } else { "-" };
            writeln!(f, "  [{}] {} => {} ({mark})", step.index, step.pattern, step.regex)?;
        }
        write!(f, "  result: {}", self.outcome)
    }
}

/// One rule tested during the ordered walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceStep {
    /// Position in the verb's rule list (0-based).
    pub index: usize,
    /// The raw pattern.
    pub pattern: String,
    /// The compiled regular expression.
    pub regex: String,
    /// Did the rule match the path?
    pub matched: bool,
}

/// Owned form of a [`RouteLookup`].
#[derive(Debug, Clone, PartialEq)]
pub enum TraceOutcome {
    /// A rule matched.
    Matched {
        /// Pattern of the matching rule.
        pattern: String,
        /// Its response.
        response: Response,
        /// Merged parameters.
        params: Params,
    },
    /// No rule matched.
    NotFound,
    /// The verb has no rules.
    NoRulesForVerb {
        /// The lowercased verb.
        verb: String,
    },
}

impl TraceOutcome {
    /// Returns `true` if a rule matched.
    #[must_use]
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }
}

impl From<&RouteLookup<'_>> for TraceOutcome {
    fn from(lookup: &RouteLookup<'_>) -> Self {
        match lookup {
            RouteLookup::Match(found) => Self::Matched {
                pattern: found.pattern().to_owned(),
                response: found.response.clone(),
                params: found.params.clone(),
            },
            RouteLookup::NotFound => Self::NotFound,
            RouteLookup::NoRulesForVerb { verb } => Self::NoRulesForVerb { verb: verb.clone() },
        }
    }
}

impl fmt::Display for TraceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Matched {
                pattern,
                response,
                params,
            } => {
                write!(f, "{pattern} -> {response}")?;
                for (name, value) in params {
                    write!(f, " {name}={value}")?;
                }
                Ok(())
            }
            Self::NotFound => f.write_str("not found"),
            Self::NoRulesForVerb { verb } => write!(f, "no rules for verb {verb}"),
        }
    }
}
