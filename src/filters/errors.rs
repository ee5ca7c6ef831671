//! Error types for `filters` module

use std::fmt;

use crate::config::property_filter::{Field, Kind};

/// Where in the configuration a failing pattern came from.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Location {
    /// Index of the entry in `property_filters`.
    pub rule: usize,
    pub field: Field,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "property_filters[{}].{}", self.rule, self.field)
    }
}

/// Failure to compile a configured pattern into a
/// [`StringMatcher`](crate::filters::StringMatcher).
///
/// Only ever raised while building matchers, never while evaluating them.
#[derive(Debug, thiserror::Error)]
#[error(
    "invalid {kind} pattern {pattern:?}{}: {source}",
    .location.map(|l| format!(" at {l}")).unwrap_or_default()
)]
pub struct PatternCompileError {
    pub kind: Kind,
    pub pattern: String,
    pub location: Option<Location>,
    #[source]
    pub source: regex::Error,
}

impl PatternCompileError {
    #[must_use]
    pub(crate) fn at(mut self, rule: usize, field: Field) -> Self {
        self.location = Some(Location { rule, field });
        self
    }
}
