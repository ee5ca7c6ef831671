use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;

/// How a configured pattern is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    /// Exact string equality.
    Literal,
    /// `*` matches any run of characters, `?` exactly one.
    Glob,
    /// Regular expression, matched against the whole input.
    Regex,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::Literal => "literal",
            Kind::Glob => "glob",
            Kind::Regex => "regex",
        })
    }
}

/// The four slots of a property filter, named after their configuration keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    DimensionName,
    DimensionValue,
    PropertyName,
    PropertyValue,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::DimensionName,
        Field::DimensionValue,
        Field::PropertyName,
        Field::PropertyValue,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Field::DimensionName => "dimension_name",
            Field::DimensionValue => "dimension_value",
            Field::PropertyName => "property_name",
            Field::PropertyValue => "property_value",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded pattern: what to match, how, and whether the result is inverted.
///
/// Decodes from either a string shorthand or a tagged map:
///
/// ```yaml
/// dimension_name: "k8s.pod.uid"          # literal
/// dimension_value: "web-*"               # glob (`*` or `?` present)
/// property_name: "/^(team|owner)$/"      # regex, slash delimited
/// property_value: "!prod"                # leading `!` negates
/// # or
/// dimension_name:
///   type: regex
///   pattern: "k8s\\..*"
///   negate: true
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PatternSpec {
    pub kind: Kind,
    pub pattern: String,
    pub negate: bool,
}

impl PatternSpec {
    #[must_use]
    pub fn new(kind: Kind, pattern: impl Into<String>) -> Self {
        PatternSpec {
            kind,
            pattern: pattern.into(),
            negate: false,
        }
    }

    #[must_use]
    pub fn literal(pattern: impl Into<String>) -> Self {
        PatternSpec::new(Kind::Literal, pattern)
    }

    #[must_use]
    pub fn glob(pattern: impl Into<String>) -> Self {
        PatternSpec::new(Kind::Glob, pattern)
    }

    #[must_use]
    pub fn regex(pattern: impl Into<String>) -> Self {
        PatternSpec::new(Kind::Regex, pattern)
    }

    #[must_use]
    pub fn negated(mut self) -> Self {
        self.negate = !self.negate;
        self
    }

    /// Decode the string shorthand.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let (negate, body) = match raw.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };

        let spec = if body.len() >= 2 && body.starts_with('/') && body.ends_with('/') {
            PatternSpec::regex(&body[1..body.len() - 1])
        } else if body.contains(['*', '?']) {
            PatternSpec::glob(body)
        } else {
            PatternSpec::literal(body)
        };

        PatternSpec { negate, ..spec }
    }
}

impl From<&str> for PatternSpec {
    fn from(raw: &str) -> Self {
        PatternSpec::parse(raw)
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TaggedPattern {
    #[serde(rename = "type")]
    kind: Kind,
    pattern: String,
    #[serde(default)]
    negate: bool,
}

impl<'de> Deserialize<'de> for PatternSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = JsonValue::deserialize(deserializer)?;

        match value {
            JsonValue::String(s) => Ok(PatternSpec::parse(&s)),
            JsonValue::Number(n) => Ok(PatternSpec::literal(n.to_string())),
            JsonValue::Object(_) => {
                let tagged: TaggedPattern = serde_json::from_value(value).map_err(|e| {
                    D::Error::custom(format!("invalid pattern specification: {e}"))
                })?;
                Ok(PatternSpec {
                    kind: tagged.kind,
                    pattern: tagged.pattern,
                    negate: tagged.negate,
                })
            }
            other => Err(D::Error::custom(format!(
                "expected a string or a map for a pattern, got {other}"
            ))),
        }
    }
}

/// One `property_filters` entry. Unset fields match everything.
///
/// Examples:
/// - `dimension_name: "k8s.pod.uid"`: no updates at all for that dimension.
/// - `dimension_value: "some.value"`: no updates for any dimension with that value.
/// - `property_name: "some.property"`: never send `some.property` on any dimension.
/// - `property_name` + `property_value`: never send that property with that value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyFilter {
    pub dimension_name: Option<PatternSpec>,
    pub dimension_value: Option<PatternSpec>,
    pub property_name: Option<PatternSpec>,
    pub property_value: Option<PatternSpec>,
}

impl PropertyFilter {
    #[must_use]
    pub fn with(mut self, field: Field, spec: impl Into<PatternSpec>) -> Self {
        let spec = Some(spec.into());
        match field {
            Field::DimensionName => self.dimension_name = spec,
            Field::DimensionValue => self.dimension_value = spec,
            Field::PropertyName => self.property_name = spec,
            Field::PropertyValue => self.property_value = spec,
        }
        self
    }

    #[must_use]
    pub fn get(&self, field: Field) -> Option<&PatternSpec> {
        match field {
            Field::DimensionName => self.dimension_name.as_ref(),
            Field::DimensionValue => self.dimension_value.as_ref(),
            Field::PropertyName => self.property_name.as_ref(),
            Field::PropertyValue => self.property_value.as_ref(),
        }
    }

    /// True when no field is set, i.e. the entry would suppress everything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        Field::ALL.iter().all(|field| self.get(*field).is_none())
    }
}

pub fn deserialize_property_filters<'de, D>(
    deserializer: D,
) -> Result<Vec<PropertyFilter>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: JsonValue = Deserialize::deserialize(deserializer)?;

    match value {
        JsonValue::Null => Ok(Vec::new()),
        JsonValue::String(s) if s.trim().is_empty() => Ok(Vec::new()),
        JsonValue::String(s) => serde_json::from_str(&s)
            .map_err(|e| D::Error::custom(format!("failed to parse property filters: {e}"))),
        JsonValue::Array(a) => a
            .into_iter()
            .enumerate()
            .map(|(index, v)| {
                serde_json::from_value(v).map_err(|e| {
                    D::Error::custom(format!("failed to parse property filter {index}: {e}"))
                })
            })
            .collect(),
        other => Err(D::Error::custom(format!(
            "expected a list of property filters, got {other}"
        ))),
    }
}
