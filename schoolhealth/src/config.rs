use std::{env, path::PathBuf, str::FromStr};

use dotenv::dotenv;
use log::warn;
use schoolhealth_growth::MissingReferencePolicy;

pub const DEFAULT_MIN_BIRTH_YEAR: i32 = 2000;

/// Runtime settings, read from the environment (and `.env`, if present).
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub export_dir: PathBuf,
    pub log_config: PathBuf,
    pub missing_reference: MissingReferencePolicy,
    pub min_birth_year: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            export_dir: PathBuf::from("."),
            log_config: PathBuf::from("log4rs.yml"),
            missing_reference: MissingReferencePolicy::Strict,
            min_birth_year: DEFAULT_MIN_BIRTH_YEAR,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Builds the configuration from a variable lookup. Unparsable values
    /// fall back to the defaults with a warning.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            data_dir: var("SCHOOLHEALTH_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            export_dir: var("SCHOOLHEALTH_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.export_dir),
            log_config: var("SCHOOLHEALTH_LOG_CONFIG")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_config),
            missing_reference: parse_or(
                &var,
                "SCHOOLHEALTH_ZSCORE_MODE",
                defaults.missing_reference,
            ),
            min_birth_year: parse_or(&var, "SCHOOLHEALTH_MIN_BIRTH_YEAR", defaults.min_birth_year),
        }
    }
}

fn parse_or<T: FromStr>(var: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> T {
    match var(name) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid value \"{}\" for {}", raw, name);
            default
        }),
        None => default,
    }
}
