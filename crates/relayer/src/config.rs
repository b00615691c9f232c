//! Relayer configuration

pub mod error;

use core::fmt::{Display, Error as FmtError, Formatter};
use std::{
    fs,
    fs::File,
    io::Write,
    path::Path,
};

use serde_derive::{Deserialize, Serialize};

use ibc_multihop_types::core::ics33_multihop::{DEFAULT_MAX_HOPS, MIN_MAX_HOPS};

pub use error::Error;

pub mod default {
    use super::*;

    pub fn max_hops() -> usize {
        DEFAULT_MAX_HOPS
    }

    pub fn verify_generated_proofs() -> bool {
        true
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub global: GlobalConfig,
    #[serde(default)]
    pub multihop: MultihopConfig,
}

impl Config {
    /// Checks the invariants that deserialization alone cannot enforce.
    pub fn validate(&self) -> Result<(), Error> {
        self.multihop.validate()
    }
}

/// Log levels are wrappers over [`tracing_core::Level`].
///
/// [`tracing_core::Level`]: https://docs.rs/tracing-core/0.1.17/tracing_core/struct.Level.html
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    pub log_level: LogLevel,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MultihopConfig {
    /// Upper bound on the number of connection hops of a channel path.
    #[serde(default = "default::max_hops")]
    pub max_hops: usize,

    /// Whether generated proof bundles are verified against the receiving
    /// chain's consensus state before being handed out.
    #[serde(default = "default::verify_generated_proofs")]
    pub verify_generated_proofs: bool,
}

impl Default for MultihopConfig {
    fn default() -> Self {
        Self {
            max_hops: default::max_hops(),
            verify_generated_proofs: default::verify_generated_proofs(),
        }
    }
}

impl MultihopConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_hops < MIN_MAX_HOPS {
            return Err(Error::invalid_max_hops(self.max_hops, MIN_MAX_HOPS));
        }

        Ok(())
    }
}

/// Attempt to load and parse the TOML config file as a `Config`.
pub fn load(path: impl AsRef<Path>) -> Result<Config, Error> {
    let config_toml = fs::read_to_string(&path).map_err(Error::io)?;

    let config = toml::from_str::<Config>(&config_toml[..]).map_err(Error::decode)?;
    config.validate()?;

    Ok(config)
}

/// Serialize the given `Config` as TOML to the given config file.
pub fn store(config: &Config, path: impl AsRef<Path>) -> Result<(), Error> {
    let mut file = if path.as_ref().exists() {
        fs::OpenOptions::new().write(true).truncate(true).open(path)
    } else {
        File::create(path)
    }
    .map_err(Error::io)?;

    store_writer(config, &mut file)
}

/// Serialize the given `Config` as TOML to the given writer.
pub(crate) fn store_writer(config: &Config, mut writer: impl Write) -> Result<(), Error> {
    let toml_config = toml::to_string_pretty(&config).map_err(Error::encode)?;

    writeln!(writer, "{toml_config}").map_err(Error::io)?;

    Ok(())
}
