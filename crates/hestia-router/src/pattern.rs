//! Route path patterns.
//!
//! A pattern is a `/`-separated list of segments. Three segment kinds exist:
//!
//! | Syntax | Kind | Matches |
//! |--------|------|---------|
//! | `users` | literal | exactly `users` |
//! | `:id` or `{id}` | named parameter | any single non-empty segment |
//! | `*` or `*rest` | wildcard (last segment only) | the remaining path, possibly empty |

use std::borrow::Cow;
use std::fmt;

use crate::error::PatternError;
use crate::params::Params;

/// One parsed segment of a [`PathPattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A literal segment that must match exactly.
    Literal(String),
    /// A named parameter capturing one segment.
    Param(String),
    /// A trailing wildcard, optionally capturing the rest of the path by name.
    Wildcard(Option<String>),
}

/// A parsed route path pattern.
///
/// # Example
///
/// ```rust
/// use hestia_router::PathPattern;
///
/// let pattern = PathPattern::parse("/post/:id").unwrap();
/// let params = pattern.matches("/post/42").unwrap();
///
/// assert_eq!(params.get("id"), Some("42"));
/// assert!(pattern.matches("/post").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parses a pattern string.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] when the pattern does not start with `/`, a
    /// parameter has an empty or invalid name, a parameter name repeats, or a
    /// wildcard is followed by further segments.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        if !pattern.starts_with('/') {
            return Err(PatternError::missing_leading_slash(pattern));
        }

        let raw_segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
        let mut segments = Vec::with_capacity(raw_segments.len());
        let mut names: Vec<String> = Vec::new();

        for (idx, raw) in raw_segments.iter().enumerate() {
            let segment = if let Some(name) = raw.strip_prefix(':') {
                Segment::Param(validate_name(pattern, name)?.to_string())
            } else if let Some(name) = raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Segment::Param(validate_name(pattern, name)?.to_string())
            } else if let Some(name) = raw.strip_prefix('*') {
                if idx + 1 != raw_segments.len() {
                    return Err(PatternError::wildcard_not_last(pattern));
                }
                if name.is_empty() {
                    Segment::Wildcard(None)
                } else {
                    Segment::Wildcard(Some(validate_name(pattern, name)?.to_string()))
                }
            } else {
                Segment::Literal((*raw).to_string())
            };

            if let Segment::Param(name) | Segment::Wildcard(Some(name)) = &segment {
                if names.contains(name) {
                    return Err(PatternError::duplicate_param(pattern, name));
                }
                names.push(name.clone());
            }

            segments.push(segment);
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    /// Returns the pattern exactly as it was registered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the names of all capturing segments in pattern order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Param(name) | Segment::Wildcard(Some(name)) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Returns `true` if the pattern captures a parameter called `name`.
    #[must_use]
    pub fn declares(&self, name: &str) -> bool {
        self.param_names().any(|n| n == name)
    }

    /// Matches a concrete request path, returning captured parameters.
    ///
    /// Empty segments are ignored, so `/post/42/` matches `/post/:id`.
    #[must_use]
    pub fn matches(&self, path: &str) -> Option<Params> {
        let mut actual = path.split('/').filter(|s| !s.is_empty());
        let mut params = Params::new();

        for segment in &self.segments {
            match segment {
                Segment::Literal(expected) => {
                    if actual.next()? != expected.as_str() {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = actual.next()?;
                    params.push(name.as_str(), decode(value));
                }
                Segment::Wildcard(name) => {
                    let rest: Vec<&str> = actual.by_ref().collect();
                    if let Some(name) = name {
                        params.push(name.as_str(), decode(&rest.join("/")));
                    }
                    return Some(params);
                }
            }
        }

        if actual.next().is_some() {
            None
        } else {
            Some(params)
        }
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn validate_name<'a>(pattern: &str, name: &'a str) -> Result<&'a str, PatternError> {
    if name.is_empty() {
        return Err(PatternError::empty_param_name(pattern));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(PatternError::invalid_param_name(pattern, name));
    }
    Ok(name)
}

fn decode(raw: &str) -> String {
    urlencoding::decode(raw).map_or_else(|_| raw.to_string(), Cow::into_owned)
}
