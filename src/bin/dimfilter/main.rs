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

//! Reads tab-separated candidates from stdin and prints one decision per line:
//!
//! ```text
//! dimension_name<TAB>dimension_value[<TAB>property_name<TAB>property_value]
//! ```
//!
//! Output is `suppress<TAB><rule index>` or `keep`. Malformed lines are
//! logged and skipped.

use std::{
    env,
    io::{self, BufRead, BufWriter, Error, ErrorKind, Result, Write},
    path::Path,
    process,
};

use dimfilter::{
    config::{self, Config},
    filters::{Candidate, FilterSet},
    logger, CONFIG_DIR_ENV,
};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config = load_config();
    enable_logging_subsystem(&config);

    let filter_set = match config.filter_set() {
        Ok(filter_set) => filter_set,
        Err(e) => {
            error!("Refusing to start with invalid property filters: {e}");
            process::exit(1);
        }
    };
    debug!("Loaded {} property filter(s)", filter_set.len());

    let stdin = io::stdin();
    let mut out = BufWriter::new(io::stdout().lock());
    evaluate_lines(&filter_set, stdin.lock(), &mut out)?;
    out.flush()
}

fn load_config() -> Config {
    let config_directory = env::var(CONFIG_DIR_ENV).unwrap_or_else(|_| ".".to_string());
    match config::get_config(Path::new(&config_directory)) {
        Ok(config) => config,
        Err(e) => {
            // Logging is not set up yet.
            eprintln!("Error loading configuration from {config_directory}: {e}");
            process::exit(1);
        }
    }
}

fn evaluate_lines(filter_set: &FilterSet, input: impl BufRead, out: &mut impl Write) -> Result<()> {
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match evaluate_line(filter_set, &line) {
            Ok(decision) => writeln!(out, "{decision}")?,
            Err(e) => error!("Skipping malformed line {line:?}: {e}"),
        }
    }
    Ok(())
}

fn evaluate_line(filter_set: &FilterSet, line: &str) -> Result<String> {
    let fields: Vec<&str> = line.split('\t').collect();
    let candidate = match fields.as_slice() {
        [name, value] => Candidate::dimension(name, value),
        [name, value, property_name, property_value] => {
            Candidate::property(name, value, property_name, property_value)
        }
        _ => {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!("expected 2 or 4 tab-separated fields, got {}", fields.len()),
            ));
        }
    };

    Ok(match filter_set.should_suppress(&candidate) {
        (true, Some(index)) => format!("suppress\t{index}"),
        _ => "keep".to_string(),
    })
}

fn enable_logging_subsystem(config: &Config) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(config.log_level.as_level_filter().into())
        .from_env_lossy();
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(false)
        .without_time()
        .event_format(logger::Formatter)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set up logging: {e}");
    }

    debug!("Logging subsystem enabled");
}
