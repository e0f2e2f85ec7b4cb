use std::fs;
use std::io::ErrorKind;
use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ClickerError, Result};

pub const CONFIG_PATH: &str = "config.json";

pub const TARGET_CPS_RANGE: RangeInclusive<u32> = 1..=50;
pub const DEFAULT_TARGET_CPS: u32 = 12;
pub const DEFAULT_MIN_CPS: u32 = 3;

fn default_target_cps() -> u32 {
    DEFAULT_TARGET_CPS
}

fn default_min_cps() -> u32 {
    DEFAULT_MIN_CPS
}

/// Rates for one engine run. `min_cps` must stay strictly below `target_cps`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_target_cps")]
    pub target_cps: u32,
    #[serde(default = "default_min_cps")]
    pub min_cps: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_cps: DEFAULT_TARGET_CPS,
            min_cps: DEFAULT_MIN_CPS,
        }
    }
}

impl EngineConfig {
    pub fn new(target_cps: u32, min_cps: u32) -> Result<Self> {
        let config = Self { target_cps, min_cps };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !TARGET_CPS_RANGE.contains(&self.target_cps) {
            return Err(ClickerError::ConfigurationInvalid(format!(
                "target_cps={} is outside {}..={}",
                self.target_cps,
                TARGET_CPS_RANGE.start(),
                TARGET_CPS_RANGE.end()
            )));
        }
        if self.min_cps >= self.target_cps {
            return Err(ClickerError::ConfigurationInvalid(format!(
                "min_cps={} must be below target_cps={}",
                self.min_cps, self.target_cps
            )));
        }
        Ok(())
    }

    /// Pulls both rates back into their domain, lowering `min_cps` if needed.
    pub fn clamped(self) -> Self {
        let target_cps = self
            .target_cps
            .clamp(*TARGET_CPS_RANGE.start(), *TARGET_CPS_RANGE.end());
        Self {
            target_cps,
            min_cps: self.min_cps.min(target_cps - 1),
        }
    }

    /// Reads the config file. `Ok(None)` means the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let parsed: Self = serde_json::from_str(&text)?;
        let config = parsed.clamped();
        if config != parsed {
            warn!(?parsed, ?config, "clamped out-of-range config values");
        }
        debug!(?config, path = %path.display(), "loaded config");
        Ok(Some(config))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string(self)?)?;
        debug!(config = ?self, path = %path.display(), "saved config");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_min_below_target() {
        assert!(EngineConfig::new(12, 3).is_ok());
        assert!(EngineConfig::new(1, 0).is_ok());
        assert!(EngineConfig::new(50, 49).is_ok());
    }

    #[test]
    fn rejects_min_not_below_target() {
        assert!(matches!(
            EngineConfig::new(10, 10),
            Err(ClickerError::ConfigurationInvalid(_))
        ));
        assert!(matches!(
            EngineConfig::new(5, 9),
            Err(ClickerError::ConfigurationInvalid(_))
        ));
    }

    #[test]
    fn rejects_target_out_of_domain() {
        assert!(EngineConfig::new(0, 0).is_err());
        assert!(EngineConfig::new(51, 3).is_err());
    }

    #[test]
    fn clamped_fixes_both_fields() {
        let config = EngineConfig { target_cps: 80, min_cps: 90 }.clamped();
        assert_eq!(config, EngineConfig { target_cps: 50, min_cps: 49 });
        assert!(config.validate().is_ok());

        let config = EngineConfig { target_cps: 0, min_cps: 0 }.clamped();
        assert_eq!(config, EngineConfig { target_cps: 1, min_cps: 0 });
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = EngineConfig::load(&dir.path().join(CONFIG_PATH)).unwrap();
        assert_eq!(loaded, None);
    }

    #[test]
    fn saved_config_is_loaded_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_PATH);
        let config = EngineConfig::new(20, 7).unwrap();
        config.save(&path).unwrap();
        assert_eq!(EngineConfig::load(&path).unwrap(), Some(config));
    }

    #[test]
    fn absent_fields_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_PATH);
        fs::write(&path, r#"{"target_cps": 30}"#).unwrap();
        let config = EngineConfig::load(&path).unwrap().unwrap();
        assert_eq!(config, EngineConfig { target_cps: 30, min_cps: DEFAULT_MIN_CPS });
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_PATH);
        fs::write(&path, "not json").unwrap();
        assert!(matches!(EngineConfig::load(&path), Err(ClickerError::Json(_))));
    }
}
