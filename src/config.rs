//! Engine configuration, loadable from a TOML file.
//!
//! ```toml
//! scale = 2
//! adjustment = "overshoot"   # or "clamp"
//! currency = "EUR"
//! ```

use crate::core::money::{clamp_scale, DEFAULT_SCALE, MAX_SCALE};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use thiserror::Error;

/// How a recommendation adjusts the balances of its two players.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentMode {
    /// Apply the full amount; a balance may cross zero and flip sign.
    #[default]
    Overshoot,
    /// Move the balance toward zero but never past it.
    Clamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Decimal places every amount is rounded to.
    pub scale: u32,
    pub adjustment: AdjustmentMode,
    /// Currency label used in reports. Not used in arithmetic.
    pub currency: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            adjustment: AdjustmentMode::default(),
            currency: "EUR".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn with_adjustment(mut self, adjustment: AdjustmentMode) -> Self {
        self.adjustment = adjustment;
        self
    }

    /// Set the scale, clamped to [`MAX_SCALE`].
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = clamp_scale(scale);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scale > MAX_SCALE {
            return Err(ConfigError::InvalidScale {
                scale: self.scale,
                max: MAX_SCALE,
            });
        }
        Ok(())
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("scale {scale} exceeds the supported maximum of {max}")]
    InvalidScale { scale: u32, max: u32 },
}

/// Load an [`EngineConfig`] from a TOML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let path = path.as_ref();
    log::debug!("loading engine configuration from {}", path.display());
    let contents = fs::read_to_string(path)?;
    EngineConfig::from_toml(&contents)
}
