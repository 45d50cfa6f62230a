//! Request verbs and the allowed-verb set.
//!
//! Verbs are a closed enum so that registration checks a value rather than
//! intercepting arbitrary method names. [`VerbSet`] is the validation set
//! consulted at registration time; it can only ever shrink.

use std::fmt;
use std::str::FromStr;

/// An HTTP-style request verb.
///
/// Parsing is case-insensitive; the canonical spelling is lowercase.
///
/// ```
/// use ruta::Verb;
///
/// assert_eq!("GET".parse::<Verb>(), Ok(Verb::Get));
/// assert_eq!(Verb::Options.as_str(), "options");
/// assert!("frobnicate".parse::<Verb>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Verb {
    Get,
    Post,
    Delete,
    Head,
    Put,
    Options,
    Connect,
    Trace,
    Patch,
}

impl Verb {
    /// Every verb the engine knows, in canonical order.
    pub const ALL: [Verb; 9] = [
        Verb::Get,
        Verb::Post,
        Verb::Delete,
        Verb::Head,
        Verb::Put,
        Verb::Options,
        Verb::Connect,
        Verb::Trace,
        Verb::Patch,
    ];

    /// Lowercase name of the verb.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::Post => "post",
            Verb::Delete => "delete",
            Verb::Head => "head",
            Verb::Put => "put",
            Verb::Options => "options",
            Verb::Connect => "connect",
            Verb::Trace => "trace",
            Verb::Patch => "patch",
        }
    }

    /// Parse a verb name, ignoring ASCII case.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|verb| verb.as_str().eq_ignore_ascii_case(name.trim()))
    }

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl FromStr for Verb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown verb \"{s}\""))
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of verbs rules may be registered under.
///
/// Defaults to `get, post, delete, head, put, options, connect`. The set is
/// narrowed by intersection only: [`narrow`](Self::narrow) can never add a
/// verb that is not already present.
///
/// ```
/// use ruta::{Verb, VerbSet};
///
/// let mut allowed = VerbSet::default();
/// allowed.narrow(["get", "post", "trace", "bogus"]);
///
/// assert!(allowed.contains(Verb::Get));
/// assert!(allowed.contains(Verb::Post));
/// assert!(!allowed.contains(Verb::Trace)); // never in the default set
/// assert_eq!(allowed.len(), 2);
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct VerbSet {
    bits: u16,
}

impl VerbSet {
    /// An empty set.
    #[must_use]
    pub fn empty() -> Self {
        Self { bits: 0 }
    }

    /// Returns `true` if the verb is in the set.
    #[must_use]
    pub fn contains(&self, verb: Verb) -> bool {
        self.bits & verb.bit() != 0
    }

    /// Intersect the set with the given verb names.
    ///
    /// Names that do not parse as a [`Verb`] contribute nothing.
    pub fn narrow<I, S>(&mut self, verbs: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let requested = verbs
            .into_iter()
            .filter_map(|name| Verb::parse(name.as_ref()))
            .fold(0u16, |bits, verb| bits | verb.bit());
        self.bits &= requested;
    }

    /// Iterate the verbs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = Verb> + '_ {
        Verb::ALL.into_iter().filter(|verb| self.contains(*verb))
    }

    /// Lowercase names of the verbs in the set.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.iter().map(|verb| verb.as_str().to_owned()).collect()
    }

    /// Number of verbs in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Returns `true` if no verb is allowed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }
}

impl Default for VerbSet {
    fn default() -> Self {
        [
            Verb::Get,
            Verb::Post,
            Verb::Delete,
            Verb::Head,
            Verb::Put,
            Verb::Options,
            Verb::Connect,
        ]
        .into_iter()
        .collect()
    }
}

impl FromIterator<Verb> for VerbSet {
    fn from_iter<I: IntoIterator<Item = Verb>>(iter: I) -> Self {
        Self {
            bits: iter.into_iter().fold(0, |bits, verb| bits | verb.bit()),
        }
    }
}

impl fmt::Debug for VerbSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
