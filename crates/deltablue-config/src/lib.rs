//! Configuration system for DeltaBlue.
//!
//! Load solver configuration from TOML or YAML files to control the
//! self-checking level and the parameters of value changes without code
//! changes.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use deltablue_config::{EnvironmentMode, SolverConfig};
//! use deltablue_core::Strength;
//!
//! let config = SolverConfig::from_toml_str(r#"
//!     environment_mode = "fast_assert"
//!
//!     [edit]
//!     strength = "strong_preferred"
//!     repeat = 10
//! "#).unwrap();
//!
//! assert_eq!(config.environment_mode, EnvironmentMode::FastAssert);
//! assert_eq!(config.edit.strength, Strength::StrongPreferred);
//! assert_eq!(config.stay.strength, Strength::Normal);
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use deltablue_config::SolverConfig;
//!
//! let config = SolverConfig::load("deltablue.toml").unwrap_or_default();
//! // Proceeds with defaults if file doesn't exist
//! ```

use std::path::Path;

use deltablue_core::{AssertMode, EditOptions, Strength};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main solver configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SolverConfig {
    /// Environment mode controlling how much the solver checks itself.
    #[serde(default)]
    pub environment_mode: EnvironmentMode,

    /// Random seed for generated workloads.
    #[serde(default)]
    pub random_seed: Option<u64>,

    /// Parameters of value changes.
    #[serde(default)]
    pub edit: EditConfig,

    /// Default strength for stay constraints.
    #[serde(default)]
    pub stay: StayConfig,
}

impl SolverConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist, contains invalid TOML, or fails
    /// [`validate`](Self::validate).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::from_toml_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Sets the environment mode.
    pub fn with_environment_mode(mut self, mode: EnvironmentMode) -> Self {
        self.environment_mode = mode;
        self
    }

    /// Sets the random seed.
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Sets the strength of the edit constraints used for value changes.
    pub fn with_edit_strength(mut self, strength: Strength) -> Self {
        self.edit.strength = strength;
        self
    }

    /// Sets how many times each change is applied.
    pub fn with_edit_repeat(mut self, repeat: u32) -> Self {
        self.edit.repeat = repeat;
        self
    }

    /// Sets the default stay strength.
    pub fn with_stay_strength(mut self, strength: Strength) -> Self {
        self.stay.strength = strength;
        self
    }

    /// Checks values that parse but cannot work.
    ///
    /// An edit at `weakest` can never override anything, and a repeat count
    /// of zero would never assign the new value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.edit.strength == Strength::Weakest {
            return Err(ConfigError::Invalid(
                "edit.strength must be stronger than weakest".to_string(),
            ));
        }
        if self.edit.repeat == 0 {
            return Err(ConfigError::Invalid(
                "edit.repeat must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Environment mode affecting solver self-checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentMode {
    /// No self-checks.
    #[default]
    Production,

    /// Graph invariants are checked after every constraint change.
    FastAssert,

    /// Also validates every plan before it runs.
    FullAssert,
}

impl EnvironmentMode {
    /// The solver assert mode this environment runs with.
    pub fn assert_mode(self) -> AssertMode {
        match self {
            EnvironmentMode::Production => AssertMode::Off,
            EnvironmentMode::FastAssert => AssertMode::Fast,
            EnvironmentMode::FullAssert => AssertMode::Full,
        }
    }
}

/// Edit configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EditConfig {
    /// Strength of the temporary edit constraint.
    #[serde(default = "default_edit_strength")]
    pub strength: Strength,

    /// Number of times a change is assigned and propagated.
    #[serde(default = "default_edit_repeat")]
    pub repeat: u32,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            strength: default_edit_strength(),
            repeat: default_edit_repeat(),
        }
    }
}

impl EditConfig {
    pub fn options(&self) -> EditOptions {
        EditOptions {
            strength: self.strength,
            repeat: self.repeat,
        }
    }
}

fn default_edit_strength() -> Strength {
    Strength::Preferred
}

fn default_edit_repeat() -> u32 {
    1
}

/// Stay configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct StayConfig {
    #[serde(default = "default_stay_strength")]
    pub strength: Strength,
}

impl Default for StayConfig {
    fn default() -> Self {
        Self {
            strength: default_stay_strength(),
        }
    }
}

fn default_stay_strength() -> Strength {
    Strength::Normal
}
