//! `RouteTable` — rule registration
//!
//! Rules are grouped by verb. Within a verb they keep registration order,
//! which is what dispatch walks: first registered, first matched.
//!
//! # Registration policy
//!
//! | Situation | Result | Rule registered? |
//! |-----------|--------|------------------|
//! | verb not allowed | `Err(ForbiddenVerb)` | no |
//! | pattern does not compile | `Err(UnknownTypeTag / ...)` | no |
//! | response missing | `Ok`, with `warning: Some(MissingResponse)` | yes, with [`Response::None`] |
//! | `(verb, pattern)` seen before | `Ok`, with `replaced: true` | yes, in the old position |
//!
//! Every rejected or degraded registration is also logged at `warn` level.
//!
//! # Compilation
//!
//! Rules are compiled when registered, against the table's own [`ParamTypes`].
//! Changing a parameter type recompiles every rule, so a compiled rule never
//! lags behind the registry.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};

use crate::{CompiledRule, ParamTypes, Response, RouteError, Verb, VerbSet};

/// Static parameters attached to a rule, and the merged parameter map
/// returned by dispatch.
pub type Params = BTreeMap<String, serde_json::Value>;

/// A registered rule: compiled pattern + response + static parameters.
#[derive(Debug, Clone)]
pub struct Rule {
    verb: Verb,
    compiled: CompiledRule,
    response: Response,
    params: Params,
}

impl Rule {
    /// The verb this rule is registered under.
    #[must_use]
    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// The raw pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.compiled.source()
    }

    /// The compiled pattern.
    #[must_use]
    pub fn compiled(&self) -> &CompiledRule {
        &self.compiled
    }

    /// The response descriptor, exactly as registered.
    #[must_use]
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// Static parameters given at registration.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }
}

/// Outcome of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registered {
    /// The verb the rule was registered under.
    pub verb: Verb,
    /// `true` if an earlier rule with the same verb and pattern was overwritten.
    pub replaced: bool,
    /// A non-fatal problem with the registration (`MissingResponse`).
    pub warning: Option<RouteError>,
}

/// Rules of one verb, in registration order.
#[derive(Debug, Clone, Default)]
pub(crate) struct VerbRules {
    rules: Vec<Rule>,
    by_pattern: HashMap<String, usize>,
}

impl VerbRules {
    /// Insert or overwrite in place. Returns `true` if overwritten.
    fn insert(&mut self, rule: Rule) -> bool {
        if let Some(&index) = self.by_pattern.get(rule.pattern()) {
            self.rules[index] = rule;
            return true;
        }
        self.by_pattern
            .insert(rule.pattern().to_owned(), self.rules.len());
        self.rules.push(rule);
        false
    }

    pub(crate) fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub(crate) fn get(&self, pattern: &str) -> Option<&Rule> {
        self.by_pattern.get(pattern).map(|&index| &self.rules[index])
    }

    /// Exact-string lookup restricted to parameterless rules.
    ///
    /// A path that happens to spell out a parameterized pattern's source
    /// (`user/numeric:id`) does not hit this path.
    pub(crate) fn literal(&self, path: &str) -> Option<&Rule> {
        self.get(path).filter(|rule| rule.compiled.is_literal())
    }
}

/// Verb → ordered rules, plus the parameter types and allowed verbs used to
/// validate registrations.
///
/// Registration takes `&mut self`; dispatch only ever reads. Build the table at
/// startup, then share it (e.g. `Arc<RouteTable>`) with a [`Dispatcher`](crate::Dispatcher).
///
/// # Example
///
/// ```
/// use ruta::{RouteError, RouteTable, Verb};
///
/// let mut table = RouteTable::new();
/// table.add_route("get", "user/numeric:id", "UserController.show").unwrap();
///
/// let err = table.add_route("trace", "debug", "Debug.trace").unwrap_err();
/// assert!(matches!(err, RouteError::ForbiddenVerb { .. }));
///
/// let registered = table.add_route("post", "user", None::<&str>).unwrap();
/// assert!(registered.warning.is_some());
///
/// assert_eq!(table.len(), 2);
/// assert_eq!(table.rules(Verb::Get)[0].pattern(), "user/numeric:id");
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    types: ParamTypes,
    allowed: VerbSet,
    verbs: HashMap<Verb, VerbRules>,
}

impl RouteTable {
    /// An empty table with the default parameter types and allowed verbs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty table using the given parameter types.
    #[must_use]
    pub fn with_param_types(types: ParamTypes) -> Self {
        Self {
            types,
            ..Self::default()
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Registration
    // ═══════════════════════════════════════════════════════════════════════

    /// Register `pattern` under `verb`.
    ///
    /// `response` is anything convertible into a [`Response`]: a `&str`, a
    /// `(target, action)` tuple, or an `Option` of either (`None` registers
    /// with a `MissingResponse` warning).
    ///
    /// # Errors
    ///
    /// - [`RouteError::ForbiddenVerb`] — `verb` is unknown or not allowed
    /// - any error of [`CompiledRule::compile`]
    ///
    /// In both cases nothing is registered.
    pub fn add_route(
        &mut self,
        verb: &str,
        pattern: &str,
        response: impl Into<Response>,
    ) -> Result<Registered, RouteError> {
        self.add_route_with_params(verb, pattern, response, Params::new())
    }

    /// Register `pattern` under `verb` with static parameters.
    ///
    /// Static parameters are returned by every dispatch to this rule; values
    /// extracted from the path override them on a name collision.
    ///
    /// # Errors
    ///
    /// Same as [`add_route`](Self::add_route).
    pub fn add_route_with_params(
        &mut self,
        verb: &str,
        pattern: &str,
        response: impl Into<Response>,
        params: Params,
    ) -> Result<Registered, RouteError> {
        let Some(checked) = Verb::parse(verb).filter(|v| self.allowed.contains(*v)) else {
            warn!(verb, pattern, "request verb without permission, rule skipped");
            return Err(RouteError::ForbiddenVerb {
                verb: verb.to_owned(),
                allowed: self.allowed.names(),
            });
        };

        let compiled = CompiledRule::compile(pattern, &self.types).inspect_err(|error| {
            warn!(verb = %checked, pattern, %error, "rule rejected");
        })?;

        let response = response.into();
        let warning = response.is_none().then(|| {
            warn!(verb = %checked, pattern, "undefined response in rule");
            RouteError::MissingResponse {
                pattern: pattern.to_owned(),
            }
        });

        let replaced = self.verbs.entry(checked).or_default().insert(Rule {
            verb: checked,
            compiled,
            response,
            params,
        });
        debug!(verb = %checked, pattern, replaced, "route registered");

        Ok(Registered {
            verb: checked,
            replaced,
            warning,
        })
    }

    /// Narrow the allowed verbs to their intersection with `verbs`.
    ///
    /// Never widens the set: names outside it, or that are not verbs at all,
    /// are ignored. Rules already registered are kept.
    pub fn set_allowed_verbs<I, S>(&mut self, verbs: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed.narrow(verbs);
        debug!(allowed = ?self.allowed, "allowed verbs narrowed");
    }

    /// Register (or replace) a parameter type and recompile every rule.
    ///
    /// # Errors
    ///
    /// Any error of [`ParamTypes::register`] or [`CompiledRule::compile`]. On
    /// error neither the types nor the rules change.
    pub fn set_param_type(
        &mut self,
        tag: impl Into<String>,
        fragment: impl Into<String>,
    ) -> Result<(), RouteError> {
        let mut types = self.types.clone();
        types.register(tag, fragment)?;
        self.replace_param_types(types)
    }

    /// Register several parameter types at once and recompile every rule.
    ///
    /// # Errors
    ///
    /// Same as [`set_param_type`](Self::set_param_type); all-or-nothing.
    pub fn set_param_types<I, K, V>(&mut self, types: I) -> Result<(), RouteError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut staged = self.types.clone();
        staged.register_all(types)?;
        self.replace_param_types(staged)
    }

    fn replace_param_types(&mut self, types: ParamTypes) -> Result<(), RouteError> {
        // Compile everything first so a failure leaves the table untouched.
        let mut recompiled: HashMap<Verb, Vec<CompiledRule>> = HashMap::new();
        for (verb, rules) in &self.verbs {
            let compiled = rules
                .rules
                .iter()
                .map(|rule| CompiledRule::compile(rule.pattern(), &types))
                .collect::<Result<Vec<_>, _>>()?;
            recompiled.insert(*verb, compiled);
        }

        for (verb, rules) in &mut self.verbs {
            if let Some(compiled) = recompiled.remove(verb) {
                for (rule, compiled) in rules.rules.iter_mut().zip(compiled) {
                    rule.compiled = compiled;
                }
            }
        }
        self.types = types;
        debug!(types = self.types.len(), "parameter types updated, rules recompiled");
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Introspection
    // ═══════════════════════════════════════════════════════════════════════

    /// The parameter types rules are compiled against.
    #[must_use]
    pub fn param_types(&self) -> &ParamTypes {
        &self.types
    }

    /// The verbs registration currently accepts.
    #[must_use]
    pub fn allowed_verbs(&self) -> VerbSet {
        self.allowed
    }

    /// Rules registered under `verb`, in registration order.
    #[must_use]
    pub fn rules(&self, verb: Verb) -> &[Rule] {
        self.verbs.get(&verb).map(VerbRules::rules).unwrap_or_default()
    }

    /// The rule registered under `verb` for exactly `pattern`.
    #[must_use]
    pub fn get(&self, verb: Verb, pattern: &str) -> Option<&Rule> {
        self.verbs.get(&verb).and_then(|rules| rules.get(pattern))
    }

    /// Verbs that have at least one rule, in canonical order.
    #[must_use]
    pub fn verbs(&self) -> Vec<Verb> {
        let mut verbs: Vec<Verb> = self.verbs.keys().copied().collect();
        verbs.sort_unstable();
        verbs
    }

    /// Total number of rules across all verbs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.verbs.values().map(|rules| rules.rules.len()).sum()
    }

    /// Returns `true` if no rule is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn verb_rules(&self, verb: Verb) -> Option<&VerbRules> {
        self.verbs.get(&verb)
    }
}
