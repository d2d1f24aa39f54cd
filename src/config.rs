//! Reasoning configuration.
//!
//! One field per configuration axis, all independent. Stored as TOML:
//!
//! ```toml
//! semantics = "preferred-credulous"
//! transposition = true
//! restricted_rebutting = false
//! valuation = "last-link"
//! min_strength = 0.0
//! max_argument_depth = 64
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::argument::ValuationKind;
use crate::argument::builder::DEFAULT_MAX_DEPTH;
use crate::error::ConfigError;
use crate::reasoner::Semantics;

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Settings for one reasoning session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasonerConfig {
    /// Acceptance semantics.
    pub semantics: Semantics,
    /// Whether strict rules get contrapositive rules.
    pub transposition: bool,
    /// Whether a defeasible argument may not rebut a strict-topped one.
    pub restricted_rebutting: bool,
    /// Argument strength computation.
    pub valuation: ValuationKind,
    /// Minimum strength of the seed arguments of a query.
    pub min_strength: f64,
    /// Maximum nesting of sub-arguments.
    pub max_argument_depth: usize,
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            semantics: Semantics::default(),
            transposition: false,
            restricted_rebutting: false,
            valuation: ValuationKind::default(),
            min_strength: 0.0,
            max_argument_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ReasonerConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if !(0.0..=1.0).contains(&self.min_strength) {
            return Err(ConfigError::InvalidThreshold {
                value: self.min_strength,
            });
        }
        Ok(())
    }

    /// Parse and validate a TOML document. Missing fields take defaults.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Self::parse(content, "<inline>")
    }

    /// Load and validate a config from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Save the config to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    fn parse(content: &str, origin: &str) -> ConfigResult<Self> {
        let parse_error = |e: toml::de::Error| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        };
        let table: toml::Table = toml::from_str(content).map_err(parse_error)?;

        // axis values go through FromStr so an unknown one names the alternatives
        if let Some(value) = table.get("semantics").and_then(toml::Value::as_str) {
            value.parse::<Semantics>()?;
        }
        if let Some(value) = table.get("valuation").and_then(toml::Value::as_str) {
            value.parse::<ValuationKind>()?;
        }

        let config: Self = toml::Value::Table(table).try_into().map_err(parse_error)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ReasonerConfig::default();
        assert_eq!(config.semantics, Semantics::Grounded);
        assert_eq!(config.valuation, ValuationKind::WeakestLink);
        assert!(!config.transposition);
        assert!(!config.restricted_rebutting);
        assert_eq!(config.max_argument_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config = ReasonerConfig::from_toml_str(
            "semantics = \"preferred-credulous\"\nvaluation = \"last-link\"\n",
        )
        .unwrap();
        assert_eq!(config.semantics, Semantics::PreferredCredulous);
        assert_eq!(config.valuation, ValuationKind::LastLink);
        assert_eq!(config.min_strength, 0.0);
    }

    #[test]
    fn unknown_axis_value_is_unsupported() {
        let err = ReasonerConfig::from_toml_str("semantics = \"stable\"\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnsupportedValue { axis: "semantics", ref value, .. } if value == "stable"
        ));

        let err = ReasonerConfig::from_toml_str("valuation = \"average\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedValue { axis: "valuation", .. }));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = ReasonerConfig::from_toml_str("semantics = \n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        let err = ReasonerConfig::from_toml_str("transposition = \"yes\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn threshold_out_of_range_is_rejected() {
        let err = ReasonerConfig::from_toml_str("min_strength = 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidThreshold { value } if value == 1.5));
    }

    #[test]
    fn config_roundtrip_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("reasoner.toml");
        let config = ReasonerConfig {
            semantics: Semantics::PreferredCredulous,
            transposition: true,
            restricted_rebutting: true,
            valuation: ValuationKind::LastLink,
            min_strength: 0.25,
            max_argument_depth: 12,
        };
        config.save(&path).unwrap();
        assert_eq!(ReasonerConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = ReasonerConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
