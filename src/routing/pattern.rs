//! Route pattern compilation and matching.
//!
//! # Responsibilities
//! - Split a pattern into literal text and `{name}` placeholders
//! - Compile placeholders into single-segment captures (never crossing `/`)
//! - Derive the parameter-stripped skeleton used for 400 diagnostics
//! - Substitute placeholders for URL building and self-tests
//!
//! # Design Decisions
//! - Literal text is regex-escaped; only placeholders are dynamic
//! - Trailing slashes are ignored when matching (request paths are normalized
//!   the same way)
//! - Captures are positional, in left-to-right order; names are informational

use std::sync::LazyLock;

use regex::{NoExpand, Regex};

use crate::error::RouterError;

/// A placeholder for matching: a segment-local `{name}`.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^/}]+\}").expect("placeholder regex is valid"));

/// A placeholder for substitution: anything between braces.
static SUBSTITUTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^}]+\}").expect("substitution regex is valid"));

/// Capture for one path segment.
const SEGMENT_CAPTURE: &str = "([^/]+)";

/// A compiled route pattern.
#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    matcher: Regex,
    param_count: usize,
}

impl PathPattern {
    /// Compile `pattern` into a matcher.
    pub fn compile(pattern: &str) -> Result<Self, RouterError> {
        let trimmed = pattern.trim_end_matches('/');
        let mut source = String::with_capacity(trimmed.len() + 16);
        source.push('^');

        let mut last = 0;
        let mut param_count = 0;
        for placeholder in PLACEHOLDER.find_iter(trimmed) {
            source.push_str(&regex::escape(&trimmed[last..placeholder.start()]));
            source.push_str(SEGMENT_CAPTURE);
            last = placeholder.end();
            param_count += 1;
        }
        source.push_str(&regex::escape(&trimmed[last..]));
        source.push('$');

        let matcher = Regex::new(&source).map_err(|e| RouterError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            raw: pattern.to_string(),
            matcher,
            param_count,
        })
    }

    /// The pattern as registered.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Number of `{name}` placeholders.
    pub fn param_count(&self) -> usize {
        self.param_count
    }

    /// True if the pattern has no placeholders.
    pub fn is_literal(&self) -> bool {
        self.param_count == 0
    }

    pub fn matches(&self, path: &str) -> bool {
        self.matcher.is_match(path)
    }

    /// Positional captures if `path` matches.
    pub fn captures(&self, path: &str) -> Option<Vec<String>> {
        let caps = self.matcher.captures(path)?;
        Some(
            caps.iter()
                .skip(1)
                .flatten()
                .map(|m| m.as_str().to_string())
                .collect(),
        )
    }

    /// The pattern with every placeholder removed, e.g. `/x/{id}` → `/x/`.
    pub fn skeleton(&self) -> String {
        PLACEHOLDER
            .replace_all(self.raw.trim_end_matches('/'), "")
            .into_owned()
    }

    /// True if `path` is this pattern's skeleton, i.e. the literal part matched
    /// but the parameter segment is absent.
    pub fn is_missing_parameter(&self, path: &str) -> bool {
        let skeleton = self.skeleton();
        !skeleton.is_empty() && path.trim_end_matches('/') == skeleton.trim_end_matches('/')
    }

    /// Replace every placeholder with `value`.
    pub fn fill(&self, value: &str) -> String {
        SUBSTITUTION
            .replace_all(&self.raw, NoExpand(value))
            .into_owned()
    }
}

/// Replace placeholders left to right with `params`.
///
/// Extra params are ignored; missing params leave the remaining placeholders
/// in the output untouched.
pub fn substitute<S: AsRef<str>>(pattern: &str, params: &[S]) -> String {
    let mut path = pattern.to_string();
    for param in params {
        path = SUBSTITUTION
            .replacen(&path, 1, NoExpand(param.as_ref()))
            .into_owned();
    }
    path
}
