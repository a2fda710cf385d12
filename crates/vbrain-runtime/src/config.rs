//! Brain-wide configuration
//!
//! Every neuron in a network reads the same [`BrainConfig`]. It carries the
//! global weight adaptation rates, the weight given to a source the first time
//! it is seen, the per-state threshold amplifiers and the sensory stamina
//! model.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "serde")]
use std::path::Path;

use crate::{error::*, fsm::FsmState};

/// Threshold multipliers, one per FSM state
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct Amplifiers {
    /// Factor while resting
    pub resting: f64,
    /// Factor while depolarized
    pub depolarized: f64,
    /// Factor while refractory
    pub refractory: f64,
}

impl Default for Amplifiers {
    fn default() -> Self {
        Self {
            resting: 1.0,
            depolarized: f64::MAX, // no firing while depolarized
            refractory: 1.5,
        }
    }
}

impl Amplifiers {
    /// Amplifier for `state`
    pub fn factor(&self, state: FsmState) -> f64 {
        match state {
            FsmState::Resting => self.resting,
            FsmState::Depolarized => self.depolarized,
            FsmState::Refractory => self.refractory,
        }
    }
}

/// Stamina model of sensory neurons
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct SensoryConfig {
    /// Stamina of a freshly created sensory neuron
    pub initial_stamina: f64,
    /// Stamina spent per successful fire
    pub depletion_rate: f64,
    /// Stamina regained per tick
    pub recovery_rate: f64,
}

impl Default for SensoryConfig {
    fn default() -> Self {
        Self {
            initial_stamina: 1.0,
            depletion_rate: 0.25,
            recovery_rate: 0.05,
        }
    }
}

/// Configuration shared by every neuron of a network
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct BrainConfig {
    /// Multiplier applied to weights of contributing sources on fire
    pub growth_rate: f64,
    /// Multiplier applied to weights that are not reinforced
    pub decay_rate: f64,
    /// Weight installed for a source the first time it is aggregated
    pub initial_weight: f64,
    /// Threshold given to neurons created without an explicit one
    pub default_threshold: f64,
    /// Per-state threshold amplifiers
    pub amplifiers: Amplifiers,
    /// Sensory stamina model
    pub sensory: SensoryConfig,
}

impl Default for BrainConfig {
    fn default() -> Self {
        Self {
            growth_rate: 1.1,
            decay_rate: 0.9,
            initial_weight: 1.0,
            default_threshold: 1.0,
            amplifiers: Amplifiers::default(),
            sensory: SensoryConfig::default(),
        }
    }
}

fn positive(parameter: &str, value: f64) -> Result<()> {
    if value.is_nan() || value <= 0.0 {
        return Err(BrainError::invalid_parameter(
            parameter,
            value.to_string(),
            "> 0.0",
        ));
    }
    Ok(())
}

fn finite_positive(parameter: &str, value: f64) -> Result<()> {
    positive(parameter, value)?;
    if !value.is_finite() {
        return Err(BrainError::invalid_parameter(
            parameter,
            value.to_string(),
            "finite",
        ));
    }
    Ok(())
}

/// Thresholds must be finite and positive
pub(crate) fn check_threshold(threshold: f64) -> Result<()> {
    finite_positive("threshold", threshold)
}

fn rate(parameter: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(BrainError::invalid_parameter(
            parameter,
            value.to_string(),
            "finite and >= 0.0",
        ));
    }
    Ok(())
}

impl BrainConfig {
    /// Validate all parameters
    pub fn validate(&self) -> Result<()> {
        finite_positive("growth_rate", self.growth_rate)?;
        finite_positive("decay_rate", self.decay_rate)?;
        finite_positive("initial_weight", self.initial_weight)?;
        finite_positive("default_threshold", self.default_threshold)?;

        positive("amplifiers.resting", self.amplifiers.resting)?;
        positive("amplifiers.depolarized", self.amplifiers.depolarized)?;
        positive("amplifiers.refractory", self.amplifiers.refractory)?;

        let stamina = self.sensory.initial_stamina;
        if !(0.0..=1.0).contains(&stamina) {
            return Err(BrainError::invalid_parameter(
                "sensory.initial_stamina",
                stamina.to_string(),
                "within [0.0, 1.0]",
            ));
        }
        rate("sensory.depletion_rate", self.sensory.depletion_rate)?;
        rate("sensory.recovery_rate", self.sensory.recovery_rate)?;
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl BrainConfig {
    /// Parse and validate a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| BrainError::config_parse(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file, falling back to defaults when it is absent
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml_str(&content)
        } else {
            log::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Render the configuration as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| BrainError::config_parse(format!("Failed to serialize config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BrainConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.growth_rate, 1.1);
        assert_eq!(config.decay_rate, 0.9);
        assert_eq!(config.initial_weight, 1.0);
    }

    #[test]
    fn test_amplifier_lookup() {
        let amplifiers = Amplifiers::default();
        assert_eq!(amplifiers.factor(FsmState::Resting), 1.0);
        assert_eq!(amplifiers.factor(FsmState::Depolarized), f64::MAX);
        assert_eq!(amplifiers.factor(FsmState::Refractory), 1.5);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = BrainConfig::default();
        config.decay_rate = 0.0;
        assert!(matches!(
            config.validate(),
            Err(BrainError::InvalidParameter { .. })
        ));

        let mut config = BrainConfig::default();
        config.initial_weight = f64::NAN;
        assert!(config.validate().is_err());

        for threshold in [0.0, -1.0, f64::INFINITY, f64::NAN] {
            let mut config = BrainConfig::default();
            config.default_threshold = threshold;
            assert!(matches!(
                config.validate(),
                Err(BrainError::InvalidParameter { .. })
            ));
        }

        let mut config = BrainConfig::default();
        config.sensory.initial_stamina = 1.5;
        assert!(config.validate().is_err());

        let mut config = BrainConfig::default();
        config.sensory.recovery_rate = -0.1;
        assert!(config.validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = BrainConfig::from_toml_str(
            r#"
            growth_rate = 1.5

            [sensory]
            depletion_rate = 0.5
            "#,
        )
        .unwrap();

        assert_eq!(config.growth_rate, 1.5);
        assert_eq!(config.decay_rate, 0.9);
        assert_eq!(config.sensory.depletion_rate, 0.5);
        assert_eq!(config.sensory.recovery_rate, 0.05);
        assert_eq!(config.amplifiers, Amplifiers::default());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_invalid_toml() {
        let result = BrainConfig::from_toml_str("growth_rate = \"fast\"");
        assert!(matches!(result, Err(BrainError::ConfigParse { .. })));

        let result = BrainConfig::from_toml_str("decay_rate = -1.0");
        assert!(matches!(result, Err(BrainError::InvalidParameter { .. })));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brain.toml");

        let missing = BrainConfig::load_from_file(&path).unwrap();
        assert_eq!(missing, BrainConfig::default());

        let mut config = BrainConfig::default();
        config.amplifiers.refractory = 2.0;
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

        let loaded = BrainConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
