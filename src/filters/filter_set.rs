//! Ordered, immutable set of property rules.
//!
//! A `FilterSet` is built once from configuration and then shared by
//! reference between every worker that needs a suppression decision. It holds
//! no interior mutability, so concurrent calls need no locking.

use tracing::{debug, trace, warn};

use crate::config::property_filter::PropertyFilter;
use crate::filters::errors::PatternCompileError;
use crate::filters::property_rule::{Candidate, PropertyRule};

#[derive(Clone, Debug, Default)]
pub struct FilterSet {
    rules: Vec<PropertyRule>,
}

impl FilterSet {
    /// Compiles every filter, in order.
    ///
    /// Either every pattern compiles or no set is returned; the error names
    /// the offending entry and field.
    pub fn new(filters: &[PropertyFilter]) -> Result<Self, PatternCompileError> {
        let rules = filters
            .iter()
            .enumerate()
            .map(|(index, filter)| {
                PropertyRule::new(filter).map_err(|(field, e)| e.at(index, field))
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (index, rule) in rules.iter().enumerate() {
            if rule.is_unconstrained() {
                warn!(
                    "DIMFILTER | Property filter {} has no fields set and suppresses every dimension update",
                    index
                );
            }
        }
        debug!("DIMFILTER | Built filter set with {} rule(s)", rules.len());

        Ok(FilterSet { rules })
    }

    /// Evaluates `candidate` against every rule in configuration order.
    ///
    /// Returns `(true, Some(i))` for the first matching rule `i`, and
    /// `(false, None)` when no rule matches. An empty set never suppresses.
    #[must_use]
    pub fn should_suppress(&self, candidate: &Candidate<'_>) -> (bool, Option<usize>) {
        match self.first_match(candidate, |_| true) {
            Some(index) => {
                trace!("DIMFILTER | {:?} matched property filter {}", candidate, index);
                (true, Some(index))
            }
            None => (false, None),
        }
    }

    /// Index of the first rule accepted by `eligible` that matches `candidate`.
    pub(crate) fn first_match(
        &self,
        candidate: &Candidate<'_>,
        eligible: impl Fn(&PropertyRule) -> bool,
    ) -> Option<usize> {
        self.rules
            .iter()
            .position(|rule| eligible(rule) && rule.matches(candidate))
    }

    #[must_use]
    pub fn rules(&self) -> &[PropertyRule] {
        &self.rules
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&PropertyRule> {
        self.rules.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::config::property_filter::{Field, Kind, PatternSpec};
    use crate::filters::errors::Location;

    fn dimension_name(pattern: &str) -> PropertyFilter {
        PropertyFilter::default().with(Field::DimensionName, pattern)
    }

    #[test]
    fn test_empty_set_never_suppresses() {
        let set = FilterSet::new(&[]).unwrap();
        assert!(set.is_empty());
        assert_eq!(
            set.should_suppress(&Candidate::dimension("host", "web-1")),
            (false, None)
        );
        assert_eq!(set.should_suppress(&Candidate::default()), (false, None));
    }

    #[test]
    fn test_later_rule_reported_when_earlier_misses() {
        let set = FilterSet::new(&[dimension_name("pod"), dimension_name("host")]).unwrap();
        assert_eq!(
            set.should_suppress(&Candidate::dimension("host", "web-1")),
            (true, Some(1))
        );
    }

    #[test]
    fn test_earliest_rule_wins() {
        let set = FilterSet::new(&[dimension_name("h*"), dimension_name("host")]).unwrap();
        assert_eq!(
            set.should_suppress(&Candidate::dimension("host", "web-1")),
            (true, Some(0))
        );
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_no_rule_matches() {
        let set = FilterSet::new(&[dimension_name("pod"), dimension_name("node")]).unwrap();
        assert_eq!(
            set.should_suppress(&Candidate::dimension("host", "web-1")),
            (false, None)
        );
    }

    #[test]
    fn test_invalid_regex_fails_whole_set() {
        let result = FilterSet::new(&[
            dimension_name("host"),
            PropertyFilter::default()
                .with(Field::PropertyName, "team")
                .with(Field::PropertyValue, PatternSpec::regex("(payments")),
        ]);
        let err = result.unwrap_err();
        assert_eq!(err.kind, Kind::Regex);
        assert_eq!(
            err.location,
            Some(Location {
                rule: 1,
                field: Field::PropertyValue
            })
        );
    }

    #[test]
    fn test_unbalanced_regex_fails_whole_set() {
        for pattern in ["a)(b", "a)|(b", ")("] {
            let err = FilterSet::new(&[
                dimension_name("host"),
                PropertyFilter::default().with(Field::DimensionName, PatternSpec::regex(pattern)),
            ])
            .expect_err("unbalanced groups must not compile");
            assert_eq!(err.pattern, pattern);
            assert_eq!(
                err.location,
                Some(Location {
                    rule: 1,
                    field: Field::DimensionName
                })
            );
        }
    }

    #[test]
    fn test_unconstrained_rule_is_accepted() {
        let set = FilterSet::new(&[PropertyFilter::default()]).unwrap();
        assert!(set.get(0).unwrap().is_unconstrained());
        assert_eq!(
            set.should_suppress(&Candidate::property("", "", "", "")),
            (true, Some(0))
        );
    }

    #[test]
    fn test_filter_set_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FilterSet>();
    }

    proptest! {
        #[test]
        fn empty_set_suppresses_nothing(
            a in "\\PC*", b in "\\PC*", c in "\\PC*", d in "\\PC*",
        ) {
            let set = FilterSet::default();
            prop_assert_eq!(set.should_suppress(&Candidate::property(&a, &b, &c, &d)), (false, None));
        }

        // The reported index is the first rule that matches on its own.
        #[test]
        fn reports_first_individually_matching_rule(name in "[a-c]{1,3}") {
            let filters = [dimension_name("c*"), dimension_name("?b*"), dimension_name("a*")];
            let set = FilterSet::new(&filters).unwrap();
            let candidate = Candidate::dimension(&name, "");
            let expected = set.rules().iter().position(|r| r.matches(&candidate));
            prop_assert_eq!(set.should_suppress(&candidate), (expected.is_some(), expected));
        }
    }
}
