//! Engine configuration.
//!
//! The configuration names the concrete implementation of the operation
//! surface to load at startup. It is deliberately small: the protocol core
//! has no tunable cryptographic parameters, since the cipher suite is fixed
//! by [`suite`].

pub mod suite;

use serde::{Deserialize, Serialize};
use std::{path::Path, str::FromStr};
use strum::Display;

use crate::error::OpaqueGateError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "snake_case")]
pub struct Config {
    pub provider: ProviderKind,
}

impl Config {
    pub fn load(config_path: impl AsRef<Path>) -> Result<Config, OpaqueGateError> {
        let config_string = std::fs::read_to_string(config_path)?;
        let config = Self::from_str(&config_string)?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderKind::InProcess,
        }
    }
}

impl FromStr for Config {
    type Err = OpaqueGateError;

    fn from_str(config_string: &str) -> Result<Self, Self::Err> {
        let config: Config = toml::from_str(config_string)?;
        Ok(config)
    }
}

/// Which implementation of the operation surface to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProviderKind {
    /// Run every flow in-process on top of the primitives library.
    InProcess,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_from_str() {
        let config_str = r#"
            provider = "in_process"
        "#;

        // Destructure so the test breaks when fields are added
        let Config { provider } = Config::from_str(config_str).unwrap();
        assert_eq!(provider, ProviderKind::InProcess);
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let config_str = r#"
            provider = "out_of_process"
        "#;
        assert!(Config::from_str(config_str).is_err());
    }

    #[test]
    fn default_runs_in_process() {
        assert_eq!(Config::default().provider, ProviderKind::InProcess);
        assert_eq!(ProviderKind::InProcess.to_string(), "in_process");
    }
}
