use std::sync::Arc;

use crate::config::property_filter::{Field, PropertyFilter};
use crate::filters::errors::PatternCompileError;
use crate::filters::string_matcher::StringMatcher;

/// One dimension/property tuple to evaluate. Property fields are empty when a
/// dimension is evaluated on its own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub dimension_name: &'a str,
    pub dimension_value: &'a str,
    pub property_name: &'a str,
    pub property_value: &'a str,
}

impl<'a> Candidate<'a> {
    #[must_use]
    pub fn dimension(dimension_name: &'a str, dimension_value: &'a str) -> Self {
        Candidate {
            dimension_name,
            dimension_value,
            ..Candidate::default()
        }
    }

    #[must_use]
    pub fn property(
        dimension_name: &'a str,
        dimension_value: &'a str,
        property_name: &'a str,
        property_value: &'a str,
    ) -> Self {
        Candidate {
            dimension_name,
            dimension_value,
            property_name,
            property_value,
        }
    }

    #[must_use]
    pub fn get(&self, field: Field) -> &'a str {
        match field {
            Field::DimensionName => self.dimension_name,
            Field::DimensionValue => self.dimension_value,
            Field::PropertyName => self.property_name,
            Field::PropertyValue => self.property_value,
        }
    }
}

/// Conjunction of four matchers, one per [`Field`]. Unset slots hold the
/// shared [`StringMatcher::any`] sentinel.
#[derive(Clone, Debug)]
pub struct PropertyRule {
    dimension_name: Arc<StringMatcher>,
    dimension_value: Arc<StringMatcher>,
    property_name: Arc<StringMatcher>,
    property_value: Arc<StringMatcher>,
}

impl Default for PropertyRule {
    /// A rule with every slot unset; matches everything.
    fn default() -> Self {
        PropertyRule {
            dimension_name: StringMatcher::any(),
            dimension_value: StringMatcher::any(),
            property_name: StringMatcher::any(),
            property_value: StringMatcher::any(),
        }
    }
}

impl PropertyRule {
    /// Compiles every set field of `filter`. The error carries the failing
    /// field but not the rule index, which only the caller knows.
    pub fn new(filter: &PropertyFilter) -> Result<Self, (Field, PatternCompileError)> {
        let slot = |field: Field| match filter.get(field) {
            Some(spec) => StringMatcher::new(spec)
                .map(Arc::new)
                .map_err(|e| (field, e)),
            None => Ok(StringMatcher::any()),
        };

        Ok(PropertyRule {
            dimension_name: slot(Field::DimensionName)?,
            dimension_value: slot(Field::DimensionValue)?,
            property_name: slot(Field::PropertyName)?,
            property_value: slot(Field::PropertyValue)?,
        })
    }

    #[must_use]
    pub fn matcher(&self, field: Field) -> &StringMatcher {
        match field {
            Field::DimensionName => &self.dimension_name,
            Field::DimensionValue => &self.dimension_value,
            Field::PropertyName => &self.property_name,
            Field::PropertyValue => &self.property_value,
        }
    }

    /// True when every slot matches its field of `candidate`. Slots are
    /// checked in [`Field::ALL`] order and stop at the first miss.
    #[must_use]
    pub fn matches(&self, candidate: &Candidate<'_>) -> bool {
        Field::ALL
            .iter()
            .all(|field| self.matcher(*field).matches(candidate.get(*field)))
    }

    #[must_use]
    pub fn is_set(&self, field: Field) -> bool {
        !self.matcher(field).is_match_any()
    }

    /// A match on a rule without property slots drops the whole dimension
    /// update instead of a single property.
    #[must_use]
    pub fn targets_whole_dimension(&self) -> bool {
        !self.is_set(Field::PropertyName) && !self.is_set(Field::PropertyValue)
    }

    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        Field::ALL.iter().all(|field| !self.is_set(*field))
    }
}
