//! Crate for the `dimfilter` project
//!
//! Decides, per outgoing dimension update, whether a dimension or one of its
//! properties should be suppressed before it is exported.
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(unused_extern_crates)]
#![deny(unused_allocation)]
#![deny(unused_assignments)]
#![deny(unused_comparisons)]
#![deny(unreachable_pub)]
#![deny(missing_copy_implementations)]
#![deny(missing_debug_implementations)]
#![allow(missing_docs)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod filters;
pub mod logger;

/// Prefix of the environment variables read by [`config::get_config`].
pub const ENV_PREFIX: &str = "DIMFILTER_";

/// Name of the YAML file read by [`config::get_config`].
pub const CONFIG_FILE_NAME: &str = "dimfilter.yaml";

/// Environment variable pointing at the directory holding the YAML file.
pub const CONFIG_DIR_ENV: &str = "DIMFILTER_CONFIG_DIR";
