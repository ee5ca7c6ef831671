use std::fmt;
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::property_filter::{Kind, PatternSpec};
use crate::filters::errors::PatternCompileError;

lazy_static! {
    static ref MATCH_ANY: Arc<StringMatcher> = Arc::new(StringMatcher {
        kind: Kind::Glob,
        pattern: "*".to_string(),
        negate: false,
        compiled: Compiled::Any,
    });
}

#[derive(Clone)]
enum Compiled {
    /// Unset slot; equivalent to `/^.*$/` without running a regex.
    Any,
    Literal,
    /// Globs are translated to an anchored regex at construction time.
    Anchored(Regex),
}

/// An immutable predicate over strings compiled from one [`PatternSpec`].
#[derive(Clone)]
pub struct StringMatcher {
    kind: Kind,
    pattern: String,
    negate: bool,
    compiled: Compiled,
}

impl StringMatcher {
    /// Compiles `spec`. Fails if the regex (or translated glob) is invalid.
    pub fn new(spec: &PatternSpec) -> Result<Self, PatternCompileError> {
        let compiled = match spec.kind {
            Kind::Literal => Compiled::Literal,
            Kind::Glob => Compiled::Anchored(compile(spec, &glob_to_regex(&spec.pattern))?),
            Kind::Regex => {
                // The pattern must be valid on its own; otherwise an unbalanced
                // `)` could close the anchoring group below.
                compile(spec, &spec.pattern)?;
                Compiled::Anchored(compile(spec, &format!("^(?:{})$", spec.pattern))?)
            }
        };

        Ok(StringMatcher {
            kind: spec.kind,
            pattern: spec.pattern.clone(),
            negate: spec.negate,
            compiled,
        })
    }

    /// The shared matcher standing in for unset rule slots.
    #[must_use]
    pub fn any() -> Arc<StringMatcher> {
        Arc::clone(&MATCH_ANY)
    }

    #[must_use]
    pub fn matches(&self, input: &str) -> bool {
        let matched = match &self.compiled {
            Compiled::Any => true,
            Compiled::Literal => input == self.pattern,
            Compiled::Anchored(re) => re.is_match(input),
        };
        matched != self.negate
    }

    /// True only for the shared sentinel returned by [`StringMatcher::any`].
    #[must_use]
    pub fn is_match_any(&self) -> bool {
        matches!(self.compiled, Compiled::Any)
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn is_negated(&self) -> bool {
        self.negate
    }
}

impl fmt::Debug for StringMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringMatcher")
            .field("kind", &self.kind)
            .field("pattern", &self.pattern)
            .field("negate", &self.negate)
            .finish_non_exhaustive()
    }
}

fn compile(spec: &PatternSpec, expression: &str) -> Result<Regex, PatternCompileError> {
    Regex::new(expression).map_err(|source| PatternCompileError {
        kind: spec.kind,
        pattern: spec.pattern.clone(),
        location: None,
        source,
    })
}

/// `*` becomes `.*`, `?` becomes `.`, everything else is escaped.
fn glob_to_regex(glob: &str) -> String {
    let mut expression = String::with_capacity(glob.len() + 8);
    expression.push_str("(?s)^");
    let mut literal = [0u8; 4];
    for c in glob.chars() {
        match c {
            '*' => expression.push_str(".*"),
            '?' => expression.push('.'),
            _ => expression.push_str(&regex::escape(c.encode_utf8(&mut literal))),
        }
    }
    expression.push('$');
    expression
}
