//! Dimension and property suppression.
//!
//! Configured [`PropertyFilter`](crate::config::property_filter::PropertyFilter)
//! entries compile into a [`FilterSet`]: an OR over [`PropertyRule`]s, each an
//! AND over up to four [`StringMatcher`]s.

pub mod dimension_update;
pub mod errors;
pub mod filter_set;
pub mod property_rule;
pub mod string_matcher;

pub use dimension_update::DimensionUpdate;
pub use errors::{Location, PatternCompileError};
pub use filter_set::FilterSet;
pub use property_rule::{Candidate, PropertyRule};
pub use string_matcher::StringMatcher;
