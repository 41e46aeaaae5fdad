use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::normalize::NormalizationRules;

/// Target used when a configuration file leaves it out
pub const DEFAULT_TARGET: &str = "RED";

/// Analysis settings loaded from TOML
///
/// # Example TOML
/// ```toml
/// target = "RED"
///
/// [normalization]
/// ARSH = "HARSH"
/// BLEW = "BLUE"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Category whose probability is reported
    #[serde(default = "default_target")]
    pub target: String,

    /// Corrections applied before aggregation
    #[serde(default)]
    pub normalization: NormalizationRules,
}

fn default_target() -> String {
    DEFAULT_TARGET.to_string()
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            target: default_target(),
            normalization: NormalizationRules::none(),
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// Returns error if the file can't be read, isn't valid TOML, has unknown
    /// keys, an empty target, or an invalid normalization rule.
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read config file: {}", path.as_ref().display())
        })?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).context("Failed to parse TOML analysis configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Configuration compiled into the binary
    ///
    /// Uses the embedded catstat-default.toml for zero-config operation.
    pub fn builtin() -> Result<Self> {
        const DEFAULT_TOML: &str = include_str!("../catstat-default.toml");
        Self::from_toml_str(DEFAULT_TOML).context("Failed to parse embedded catstat-default.toml")
    }

    fn validate(&self) -> Result<()> {
        if self.target.trim().is_empty() {
            bail!("Config target must not be empty");
        }
        self.normalization.validate()
    }

    /// Replace the configured target
    pub fn with_target(mut self, target: Option<String>) -> Self {
        if let Some(target) = target {
            self.target = target;
        }
        self
    }
}
