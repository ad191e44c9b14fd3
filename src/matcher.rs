//! Location rules and the pure matcher that finds field values in file text.
//!
//! A [`Locator`] either names an exact literal (legacy mode) or a regular
//! expression anchored on the field's syntactic role. Pattern locators may
//! mark the part to replace with capture groups named `value` or `value_*`;
//! the first such group that participates becomes the match span, so the key,
//! quotes and whitespace around the value are never touched.

use regex::Regex;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("invalid pattern '{pattern}': {message}")]
    Invalid { pattern: String, message: String },

    #[error("literal location rule must not be empty")]
    EmptyLiteral,
}

/// Where a field lives inside a file.
#[derive(Clone)]
pub enum Locator {
    /// Exact text, every occurrence.
    Literal(String),
    /// Field-anchored regular expression.
    Pattern(CompiledPattern),
}

#[derive(Clone)]
pub struct CompiledPattern {
    regex: Regex,
    /// Group indices whose names start with `value`, in declaration order.
    value_groups: Vec<usize>,
}

/// Byte range `[start, end)` of one located value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
}

impl MatchSpan {
    pub fn as_str<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

impl Locator {
    /// Literal locator. Empty text is rejected since it would match everywhere.
    pub fn literal(text: impl Into<String>) -> Result<Self, PatternError> {
        let text = text.into();
        if text.is_empty() {
            return Err(PatternError::EmptyLiteral);
        }
        Ok(Locator::Literal(text))
    }

    /// Compile a bare regular expression.
    pub fn pattern(source: &str) -> Result<Self, PatternError> {
        let regex = Regex::new(source).map_err(|e| PatternError::Invalid {
            pattern: source.to_string(),
            message: e.to_string(),
        })?;
        let value_groups = regex
            .capture_names()
            .enumerate()
            .filter_map(|(idx, name)| match name {
                Some(n) if n == "value" || n.starts_with("value_") => Some(idx),
                _ => None,
            })
            .collect();
        Ok(Locator::Pattern(CompiledPattern {
            regex,
            value_groups,
        }))
    }

    /// Parse a user-authored rule: either a bare regex or `/body/flags`.
    ///
    /// Only a trailing segment made of the flags `gimsuxy` marks the delimited
    /// form; `/foo/bar` is a bare regex with literal slashes. Scanning is
    /// always global, so `g`, `y` (sticky) and `u` are dropped. `i`, `m`, `s`
    /// and `x` become inline flags.
    pub fn parse(source: &str) -> Result<Self, PatternError> {
        let Some((body, flags)) = split_delimited(source) else {
            return Self::pattern(source);
        };

        let mut inline = String::new();
        for flag in flags.chars().filter(|c| INLINE_FLAGS.contains(*c)) {
            if !inline.contains(flag) {
                inline.push(flag);
            }
        }

        if inline.is_empty() {
            Self::pattern(body)
        } else {
            Self::pattern(&format!("(?{inline}){body}"))
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Locator::Literal(_))
    }
}

const JS_FLAGS: &str = "gimsuxy";
const INLINE_FLAGS: &str = "imsx";

/// `/body/flags` -> (body, flags). Anything else is treated as a bare regex.
fn split_delimited(source: &str) -> Option<(&str, &str)> {
    let rest = source.strip_prefix('/')?;
    let close = rest.rfind('/')?;
    let (body, flags) = (&rest[..close], &rest[close + 1..]);
    if body.is_empty() || !flags.chars().all(|c| JS_FLAGS.contains(c)) {
        return None;
    }
    Some((body, flags))
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Literal(text) => write!(f, "literal {text:?}"),
            Locator::Pattern(p) => write!(f, "pattern /{}/", p.regex.as_str()),
        }
    }
}

impl fmt::Debug for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Find every location of a rule in `text`, front to back, non-overlapping.
pub fn locate(text: &str, locator: &Locator) -> Vec<MatchSpan> {
    match locator {
        Locator::Literal(needle) => text
            .match_indices(needle.as_str())
            .map(|(start, m)| MatchSpan {
                start,
                end: start + m.len(),
            })
            .collect(),
        Locator::Pattern(p) => p
            .regex
            .captures_iter(text)
            .filter_map(|caps| {
                let m = p
                    .value_groups
                    .iter()
                    .find_map(|&idx| caps.get(idx))
                    .or_else(|| caps.get(0))?;
                Some(MatchSpan {
                    start: m.start(),
                    end: m.end(),
                })
            })
            .collect(),
    }
}
