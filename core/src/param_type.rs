//! `ParamTypes` — Parameter type registry
//!
//! Maps a type tag (`numeric`, `alnum`, `any`, ...) to the regex fragment that
//! constrains a parameter's text. The compiler wraps each fragment in exactly
//! one capturing group, so fragments themselves must not capture.
//!
//! # Defaults
//!
//! | Tag | Fragment | Matches |
//! |-----|----------|---------|
//! | `numeric` | `[0-9]+` | digits |
//! | `alnum` | `[a-z_0-9]+` | letters, digits and underscore (case-insensitive) |
//! | `any` | `[^\n]+` | everything except a line break, `/` included |

use std::collections::BTreeMap;

use regex::Regex;

use crate::{RouteError, MAX_PATTERN_LENGTH};

const DEFAULT_TYPES: [(&str, &str); 3] = [
    ("numeric", "[0-9]+"),
    ("alnum", "[a-z_0-9]+"),
    ("any", "[^\\n]+"),
];

/// Returns `true` if `ident` matches `[a-z_0-9]+`.
///
/// Shared by type tags and parameter names.
pub(crate) fn is_ident(ident: &str) -> bool {
    !ident.is_empty()
        && ident
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
}

/// Registry of parameter types.
///
/// Last write wins: registering an existing tag replaces its fragment.
///
/// # Example
///
/// ```
/// use ruta::ParamTypes;
///
/// let mut types = ParamTypes::default();
/// types.register("hex", "[0-9a-f]+").unwrap();
///
/// assert_eq!(types.resolve("hex").unwrap(), "[0-9a-f]+");
/// assert_eq!(types.resolve("numeric").unwrap(), "[0-9]+");
/// assert!(types.resolve("uuid").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamTypes {
    types: BTreeMap<String, String>,
}

impl ParamTypes {
    /// A registry with no types at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            types: BTreeMap::new(),
        }
    }

    /// Register a type, replacing any previous fragment for `tag`.
    ///
    /// # Errors
    ///
    /// - [`RouteError::InvalidTypeTag`] if `tag` is not `[a-z_0-9]+`
    /// - [`RouteError::InvalidFragment`] if `fragment` does not compile or
    ///   contains a capturing group
    pub fn register(
        &mut self,
        tag: impl Into<String>,
        fragment: impl Into<String>,
    ) -> Result<(), RouteError> {
        let (tag, fragment) = (tag.into(), fragment.into());
        validate(&tag, &fragment)?;
        self.types.insert(tag, fragment);
        Ok(())
    }

    /// Register several types at once.
    ///
    /// Either every entry is applied or, on the first invalid one, none is.
    ///
    /// # Errors
    ///
    /// Same as [`register`](Self::register).
    pub fn register_all<I, K, V>(&mut self, types: I) -> Result<(), RouteError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let staged = types
            .into_iter()
            .map(|(tag, fragment)| {
                let (tag, fragment) = (tag.into(), fragment.into());
                validate(&tag, &fragment).map(|()| (tag, fragment))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.types.extend(staged);
        Ok(())
    }

    /// Look up the fragment for `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::UnknownTypeTag`] (listing the registered tags) if
    /// `tag` is not registered.
    pub fn resolve(&self, tag: &str) -> Result<&str, RouteError> {
        self.types
            .get(tag)
            .map(String::as_str)
            .ok_or_else(|| RouteError::UnknownTypeTag {
                tag: tag.to_owned(),
                available: self.types.keys().cloned().collect(),
            })
    }

    /// Returns `true` if `tag` is registered.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.types.contains_key(tag)
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Registered `(tag, fragment)` pairs, sorted by tag.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.types.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for ParamTypes {
    fn default() -> Self {
        Self {
            types: DEFAULT_TYPES
                .iter()
                .map(|(tag, fragment)| ((*tag).to_owned(), (*fragment).to_owned()))
                .collect(),
        }
    }
}

fn validate(tag: &str, fragment: &str) -> Result<(), RouteError> {
    if !is_ident(tag) {
        return Err(RouteError::InvalidTypeTag {
            tag: tag.to_owned(),
        });
    }
    let invalid = |reason: String| RouteError::InvalidFragment {
        tag: tag.to_owned(),
        reason,
    };
    if fragment.is_empty() {
        return Err(invalid("fragment is empty".into()));
    }
    if fragment.len() > MAX_PATTERN_LENGTH {
        return Err(invalid(format!(
            "fragment length is {}, but maximum allowed is {MAX_PATTERN_LENGTH}",
            fragment.len()
        )));
    }
    // Unbalanced parentheses can parse once wrapped (`a)|(?:b`), so the bare
    // fragment must be a valid regex on its own.
    Regex::new(fragment).map_err(|e| invalid(e.to_string()))?;
    // Parse it the way the compiler will embed it, inside a group.
    let grouped = Regex::new(&format!("(?:{fragment})")).map_err(|e| invalid(e.to_string()))?;
    // captures_len counts the implicit whole-match group.
    if grouped.captures_len() != 1 {
        return Err(invalid(
            "fragment must not contain capturing groups; use (?:...) instead".into(),
        ));
    }
    Ok(())
}
