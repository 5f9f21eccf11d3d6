//! Ordered `(matcher, extractor)` rule lists evaluated first-match-wins.
//!
//! Every line-oriented detector keeps its heuristics as a static table of
//! [`Rule`]s so each rule can be tested on its own and the priority order is
//! visible in one place.

use regex::{Captures, Regex};
use std::ops::Range;

pub struct Rule<T> {
    pub name: &'static str,
    pub pattern: Regex,
    extract: fn(&Captures<'_>) -> Option<T>,
}

impl<T> Rule<T> {
    /// Builds a rule from a pattern literal. Only used for static tables,
    /// so an invalid pattern is a programming error.
    pub fn new(name: &'static str, pattern: &str, extract: fn(&Captures<'_>) -> Option<T>) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern)
                .unwrap_or_else(|err| panic!("invalid pattern for rule {}: {}", name, err)),
            extract,
        }
    }

    pub fn is_match(&self, line: &str) -> bool {
        self.pattern.is_match(line)
    }

    /// An extractor returning `None` rejects the match, letting the next
    /// rule try the line.
    pub fn apply(&self, line: &str) -> Option<T> {
        let caps = self.pattern.captures(line)?;
        (self.extract)(&caps)
    }

    /// Every accepted match in `line`, left to right, with its byte span.
    pub fn apply_all<'a>(&'a self, line: &'a str) -> impl Iterator<Item = (Range<usize>, T)> + 'a {
        self.pattern.captures_iter(line).filter_map(move |caps| {
            let span = caps.get(0)?.range();
            (self.extract)(&caps).map(|value| (span, value))
        })
    }
}

/// Runs `rules` in order and returns the first accepted extraction along
/// with the name of the rule that produced it.
pub fn first_match<T>(rules: &[Rule<T>], line: &str) -> Option<(&'static str, T)> {
    rules
        .iter()
        .find_map(|rule| rule.apply(line).map(|value| (rule.name, value)))
}

/// Text of capture group `idx`, trimmed, or `""` when it did not take part.
pub fn group<'t>(caps: &Captures<'t>, idx: usize) -> &'t str {
    caps.get(idx).map(|m| m.as_str().trim()).unwrap_or("")
}
