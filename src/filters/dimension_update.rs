use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::filters::filter_set::FilterSet;
use crate::filters::property_rule::{Candidate, PropertyRule};

/// Metadata update for one dimension, as sent to the backend.
///
/// A `None` property value asks the backend to remove that property.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DimensionUpdate {
    pub name: String,
    pub value: String,
    pub properties: BTreeMap<String, Option<String>>,
    pub tags: BTreeSet<String>,
}

impl DimensionUpdate {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        DimensionUpdate {
            name: name.into(),
            value: value.into(),
            ..DimensionUpdate::default()
        }
    }

    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: Option<&str>) -> Self {
        self.properties.insert(name.into(), value.map(String::from));
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.tags.is_empty()
    }
}

impl FilterSet {
    /// Applies the set to a whole dimension update.
    ///
    /// Returns `None` when a rule without property fields matches the
    /// dimension, or when filtering left nothing to send. Otherwise every
    /// property and tag matched by a property rule is removed. Tags are
    /// evaluated as properties with an empty value.
    #[must_use]
    pub fn filter_dimension_update(&self, mut update: DimensionUpdate) -> Option<DimensionUpdate> {
        if self.is_empty() {
            return Some(update);
        }

        let dimension = Candidate::dimension(&update.name, &update.value);
        if let Some(index) = self.first_match(&dimension, PropertyRule::targets_whole_dimension) {
            debug!(
                "DIMFILTER | Dropping update for dimension {}={} (property filter {})",
                update.name, update.value, index
            );
            return None;
        }

        let was_empty = update.is_empty();
        let (name, value) = (update.name.as_str(), update.value.as_str());
        let targets_property = |rule: &PropertyRule| !rule.targets_whole_dimension();

        update.properties.retain(|property_name, property_value| {
            let candidate = Candidate::property(
                name,
                value,
                property_name,
                property_value.as_deref().unwrap_or_default(),
            );
            self.first_match(&candidate, targets_property).is_none()
        });
        update.tags.retain(|tag| {
            let candidate = Candidate::property(name, value, tag, "");
            self.first_match(&candidate, targets_property).is_none()
        });

        if update.is_empty() && !was_empty {
            debug!(
                "DIMFILTER | Every property of dimension {}={} was filtered, dropping update",
                update.name, update.value
            );
            return None;
        }
        Some(update)
    }
}
