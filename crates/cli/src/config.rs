use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings read from an optional TOML file; command-line flags override them.
///
/// ```toml
/// [oscillator]
/// period = 14
///
/// [verify]
/// column = "PSO"
/// tolerance = 0.0001
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PsoConfig {
    pub oscillator: OscillatorConfig,
    pub verify: VerifyConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OscillatorConfig {
    /// Stochastic lookback in bars.
    pub period: usize,
}

impl Default for OscillatorConfig {
    fn default() -> Self {
        Self { period: 14 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Reference column holding the expected oscillator values.
    pub column: String,
    /// Maximum absolute difference accepted per row.
    pub tolerance: f64,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            column: "PSO".to_string(),
            tolerance: 1e-4,
        }
    }
}

impl PsoConfig {
    /// Read the config file if one was given, otherwise fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_toml(&raw)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        tracing::debug!(path = %path.display(), ?config, "Loaded config");
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.oscillator.period == 0 {
            anyhow::bail!("oscillator.period must be > 0");
        }
        if !(self.verify.tolerance.is_finite() && self.verify.tolerance >= 0.0) {
            anyhow::bail!("verify.tolerance must be a non-negative number");
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PsoConfig::load(None).unwrap();
        assert_eq!(config.oscillator.period, 14);
        assert_eq!(config.verify.column, "PSO");
        assert_eq!(config.verify.tolerance, 1e-4);
    }

    #[test]
    fn test_partial_override() {
        let config = PsoConfig::from_toml("[oscillator]\nperiod = 9\n").unwrap();
        assert_eq!(config.oscillator.period, 9);
        assert_eq!(config.verify, VerifyConfig::default());
    }

    #[test]
    fn test_rejects_zero_period() {
        assert!(PsoConfig::from_toml("[oscillator]\nperiod = 0\n").is_err());
    }

    #[test]
    fn test_rejects_negative_tolerance() {
        assert!(PsoConfig::from_toml("[verify]\ntolerance = -1.0\n").is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = PsoConfig {
            oscillator: OscillatorConfig { period: 21 },
            verify: VerifyConfig {
                column: "pso_ref".to_string(),
                tolerance: 0.001,
            },
        };
        let raw = config.to_toml().unwrap();
        assert_eq!(PsoConfig::from_toml(&raw).unwrap(), config);
    }
}
