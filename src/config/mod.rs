pub mod log_level;
pub mod property_filter;

use std::path::Path;

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use serde::Deserialize;
use tracing::error;

use crate::config::{
    log_level::LogLevel,
    property_filter::{deserialize_property_filters, PropertyFilter},
};
use crate::filters::{FilterSet, PatternCompileError};
use crate::{CONFIG_FILE_NAME, ENV_PREFIX};

#[derive(Debug, PartialEq, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub log_level: LogLevel,
    #[serde(deserialize_with = "deserialize_property_filters")]
    pub property_filters: Vec<PropertyFilter>,
}

impl Config {
    /// Compiles `property_filters` into the set used by the export pipeline.
    pub fn filter_set(&self) -> Result<FilterSet, PatternCompileError> {
        FilterSet::new(&self.property_filters)
    }
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse dimfilter config: {0}")]
    ParseError(String),
    #[error("property_filters[{0}] has no fields set")]
    EmptyPropertyFilter(usize),
}

/// Loads `dimfilter.yaml` from `config_directory`, then applies
/// `DIMFILTER_`-prefixed environment overrides.
///
/// A missing file is not an error; every field has a default.
pub fn get_config(config_directory: &Path) -> Result<Config, ConfigError> {
    let path = config_directory.join(CONFIG_FILE_NAME);

    let figment = Figment::new()
        .merge(Yaml::file(&path))
        .merge(Env::prefixed(ENV_PREFIX));

    let config: Config = figment.extract().map_err(|err| {
        error!("Failed to parse dimfilter config: {err}");
        ConfigError::ParseError(err.to_string())
    })?;

    // An entry with no field set would suppress every update; refuse it here
    // rather than silently exporting nothing.
    if let Some(index) = config.property_filters.iter().position(PropertyFilter::is_empty) {
        error!("property_filters[{index}] has no fields set");
        return Err(ConfigError::EmptyPropertyFilter(index));
    }

    Ok(config)
}

#[cfg(test)]
pub mod tests {
    use super::*;

    use crate::config::property_filter::{Field, PatternSpec};
    use crate::filters::Candidate;

    #[test]
    fn test_defaults_without_file() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            let config = get_config(Path::new("")).expect("should parse config");
            assert_eq!(config, Config::default());
            assert_eq!(config.log_level, LogLevel::Warn);
            assert!(config.filter_set().expect("should compile").is_empty());
            Ok(())
        });
    }

    #[test]
    fn test_parse_property_filters_from_yaml() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "dimfilter.yaml",
                r#"
                log_level: debug
                property_filters:
                  - dimension_name: k8s.pod.uid
                  - dimension_name: "host"
                    property_name: "/team|owner/"
                    property_value: "!prod-*"
                  - dimension_value:
                      type: regex
                      pattern: "web-\\d+"
                      negate: true
                  - property_value: 8080
            "#,
            )?;
            let config = get_config(Path::new("")).expect("should parse config");
            assert_eq!(config.log_level, LogLevel::Debug);
            assert_eq!(
                config.property_filters,
                vec![
                    PropertyFilter::default().with(Field::DimensionName, "k8s.pod.uid"),
                    PropertyFilter::default()
                        .with(Field::DimensionName, "host")
                        .with(Field::PropertyName, PatternSpec::regex("team|owner"))
                        .with(Field::PropertyValue, PatternSpec::glob("prod-*").negated()),
                    PropertyFilter::default().with(
                        Field::DimensionValue,
                        PatternSpec::regex("web-\\d+").negated()
                    ),
                    PropertyFilter::default()
                        .with(Field::PropertyValue, PatternSpec::literal("8080")),
                ]
            );
            Ok(())
        });
    }

    #[test]
    fn test_parse_property_filters_from_env() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env(
                "DIMFILTER_PROPERTY_FILTERS",
                r#"[{"dimension_name":"k8s.*.uid"},{"property_name":"team","property_value":"payments"}]"#,
            );
            jail.create_file(
                "dimfilter.yaml",
                r"
                property_filters:
                  - dimension_name: from-yaml
            ",
            )?;
            let config = get_config(Path::new("")).expect("should parse config");
            assert_eq!(
                config.property_filters,
                vec![
                    PropertyFilter::default().with(Field::DimensionName, "k8s.*.uid"),
                    PropertyFilter::default()
                        .with(Field::PropertyName, "team")
                        .with(Field::PropertyValue, "payments"),
                ]
            );
            Ok(())
        });
    }

    #[test]
    fn test_parse_log_level_from_env() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("DIMFILTER_LOG_LEVEL", "TRACE");
            let config = get_config(Path::new("")).expect("should parse config");
            assert_eq!(config.log_level, LogLevel::Trace);
            Ok(())
        });
    }

    #[test]
    fn test_reject_empty_property_filter() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "dimfilter.yaml",
                r"
                property_filters:
                  - dimension_name: host
                  - {}
            ",
            )?;
            let config = get_config(Path::new("")).expect_err("should reject empty filter");
            assert_eq!(config, ConfigError::EmptyPropertyFilter(1));
            Ok(())
        });
    }

    #[test]
    fn test_reject_malformed_property_filter() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "dimfilter.yaml",
                r"
                property_filters:
                  - dimension_nmae: host
            ",
            )?;
            let config = get_config(Path::new("")).expect_err("should reject unknown key");
            assert!(matches!(config, ConfigError::ParseError(_)));
            Ok(())
        });
    }

    #[test]
    fn test_invalid_regex_fails_at_filter_set() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "dimfilter.yaml",
                r#"
                property_filters:
                  - dimension_name: "/(k8s/"
            "#,
            )?;
            let config = get_config(Path::new("")).expect("patterns compile later");
            let err = config.filter_set().expect_err("should reject bad regex");
            assert_eq!(err.pattern, "(k8s");
            assert!(err.to_string().contains("property_filters[0].dimension_name"));
            Ok(())
        });
    }

    #[test]
    fn test_filter_set_from_config() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "dimfilter.yaml",
                r#"
                property_filters:
                  - dimension_name: "k8s.*.uid"
            "#,
            )?;
            let set = get_config(Path::new(""))
                .expect("should parse config")
                .filter_set()
                .expect("should compile");
            assert_eq!(
                set.should_suppress(&Candidate::dimension("k8s.pod.uid", "abc")),
                (true, Some(0))
            );
            assert_eq!(
                set.should_suppress(&Candidate::dimension("k8s.uid", "abc")),
                (false, None)
            );
            Ok(())
        });
    }
}
