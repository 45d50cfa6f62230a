//! Pattern compiler: raw route pattern → anchored regex + ordered parameter names.
//!
//! One walk over the `/`-separated segments emits the regex and the parameter
//! name list together. Literal text is escaped and parameter fragments are
//! validated as non-capturing when registered, so the `i`-th capturing group
//! is always the `i`-th declared parameter.
//!
//! ```text
//! user/numeric:id          →  ^user/([0-9]+)$                 [id]
//! post/any:slug?           →  ^post(?:/([^\n]+)?)?$           [slug]
//! archive/numeric:y/alnum:m →  ^archive/([0-9]+)/([a-z_0-9]+)$ [y, m]
//! ```

use regex::{Regex, RegexBuilder};

use crate::param_type::is_ident;
use crate::{ParamTypes, RouteError, MAX_PATTERN_LENGTH, MAX_REGEX_SIZE};

/// A compiled route pattern.
///
/// Derived deterministically from the source pattern and the [`ParamTypes`]
/// it was compiled against. Matching is anchored and case-insensitive, and
/// `.` never matches a line break.
///
/// # Example
///
/// ```
/// use ruta::{CompiledRule, ParamTypes};
///
/// let rule = CompiledRule::compile("user/numeric:id", &ParamTypes::default()).unwrap();
/// assert_eq!(rule.param_names(), ["id"]);
/// assert_eq!(rule.captures("user/42"), Some(vec![("id", "42")]));
/// assert_eq!(rule.captures("user/abc"), None);
/// ```
#[derive(Debug, Clone)]
pub struct CompiledRule {
    source: String,
    regex: Regex,
    param_names: Vec<String>,
}

/// One `/`-separated piece of a raw pattern.
#[derive(Debug, PartialEq, Eq)]
enum Segment<'p> {
    Literal(&'p str),
    Param {
        tag: &'p str,
        name: &'p str,
        optional: bool,
    },
}

impl<'p> Segment<'p> {
    /// Parse against the `tag:name` / `tag:name?` grammar; anything else is literal.
    fn parse(raw: &'p str) -> Self {
        let (body, optional) = match raw.strip_suffix('?') {
            Some(body) => (body, true),
            None => (raw, false),
        };
        match body.split_once(':') {
            Some((tag, name)) if is_ident(tag) && is_ident(name) => Segment::Param {
                tag,
                name,
                optional,
            },
            _ => Segment::Literal(raw),
        }
    }
}

impl CompiledRule {
    /// Compile `pattern` against the given parameter types.
    ///
    /// # Errors
    ///
    /// - [`RouteError::PatternTooLong`] — pattern exceeds [`MAX_PATTERN_LENGTH`]
    /// - [`RouteError::UnknownTypeTag`] — a parameter segment names an unregistered type
    /// - [`RouteError::DuplicateParameter`] — a parameter name is used twice
    /// - [`RouteError::InvalidPattern`] — the resulting regex failed to build
    pub fn compile(pattern: &str, types: &ParamTypes) -> Result<Self, RouteError> {
        if pattern.len() > MAX_PATTERN_LENGTH {
            return Err(RouteError::PatternTooLong {
                len: pattern.len(),
                max: MAX_PATTERN_LENGTH,
            });
        }

        let mut expr = String::with_capacity(pattern.len() + 8);
        let mut param_names: Vec<String> = Vec::new();
        expr.push('^');

        for (index, raw) in pattern.split('/').enumerate() {
            let leading = index > 0;
            match Segment::parse(raw) {
                Segment::Literal(text) => {
                    if leading {
                        expr.push('/');
                    }
                    expr.push_str(&regex::escape(text));
                }
                Segment::Param {
                    tag,
                    name,
                    optional,
                } => {
                    let fragment = types.resolve(tag)?;
                    if param_names.iter().any(|n| n == name) {
                        return Err(RouteError::DuplicateParameter {
                            pattern: pattern.to_owned(),
                            name: name.to_owned(),
                        });
                    }
                    param_names.push(name.to_owned());

                    // The separator belongs to the segment: an absent optional
                    // segment takes its `/` with it.
                    match (optional, leading) {
                        (false, false) => expr.push_str(&format!("({fragment})")),
                        (false, true) => expr.push_str(&format!("/({fragment})")),
                        (true, false) => expr.push_str(&format!("({fragment})?")),
                        (true, true) => expr.push_str(&format!("(?:/({fragment})?)?")),
                    }
                }
            }
        }
        expr.push('$');

        let regex = RegexBuilder::new(&expr)
            .case_insensitive(true)
            .dot_matches_new_line(false)
            .size_limit(MAX_REGEX_SIZE)
            .build()
            .map_err(|e| RouteError::InvalidPattern {
                pattern: pattern.to_owned(),
                reason: e.to_string(),
            })?;

        if regex.captures_len() != param_names.len() + 1 {
            return Err(RouteError::InvalidPattern {
                pattern: pattern.to_owned(),
                reason: format!(
                    "{} capturing groups for {} parameters",
                    regex.captures_len() - 1,
                    param_names.len()
                ),
            });
        }

        Ok(Self {
            source: pattern.to_owned(),
            regex,
            param_names,
        })
    }

    /// The raw pattern this rule was compiled from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The compiled regex.
    #[must_use]
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Parameter names in capture order.
    #[must_use]
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Returns `true` if the pattern declares no parameters.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        self.param_names.is_empty()
    }

    /// Returns `true` if `path` matches.
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Match `path` and return `(name, value)` for every parameter whose group
    /// took part in the match, in declaration order.
    ///
    /// Returns `None` if the path does not match. A parameter whose optional
    /// segment is absent is left out; a group that matched empty text (a
    /// custom fragment such as `[0-9]*`) is kept with an empty value.
    #[must_use]
    pub fn captures<'s, 'p>(&'s self, path: &'p str) -> Option<Vec<(&'s str, &'p str)>> {
        let caps = self.regex.captures(path)?;
        Some(
            self.param_names
                .iter()
                .enumerate()
                .filter_map(|(index, name)| {
                    caps.get(index + 1)
                        .map(|m| (name.as_str(), m.as_str()))
                })
                .collect(),
        )
    }
}
