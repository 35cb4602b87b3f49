// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Configuration
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::error::{PsyfiError, PsyfiResult};

/// Deterministic-runtime configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbxConfig {
    /// Runtime contract version.
    pub version: String,

    /// Enforce reproducible execution.
    /// Default: true.
    pub deterministic: bool,

    /// Seed used when deterministic and no explicit seed is given.
    /// Default: 1337.
    pub default_seed: u64,

    /// Record module chain and parameters into the provenance ledger.
    pub track_provenance: bool,

    /// Maintain step/grid/entropy counters.
    pub track_metrics: bool,
}

impl Default for AbxConfig {
    fn default() -> Self {
        Self {
            version: "1.3".to_string(),
            deterministic: true,
            default_seed: 1337,
            track_provenance: true,
            track_metrics: true,
        }
    }
}

/// Top-level kernel configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PsyfiConfig {
    pub abx: AbxConfig,

    /// Default field width when a caller does not specify one.
    /// Default: 64.
    pub default_width: usize,

    /// Default field height when a caller does not specify one.
    /// Default: 64.
    pub default_height: usize,

    /// Upper bound on `width * height` accepted by `validate_grid_size`.
    /// Default: 1024 * 1024.
    pub max_grid_size: usize,
}

impl Default for PsyfiConfig {
    fn default() -> Self {
        Self {
            abx: AbxConfig::default(),
            default_width: 64,
            default_height: 64,
            max_grid_size: 1024 * 1024,
        }
    }
}

impl PsyfiConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> PsyfiResult<()> {
        if self.max_grid_size == 0 {
            return Err(PsyfiError::Configuration(
                "max_grid_size must be > 0".to_string(),
            ));
        }
        if self.default_width == 0 || self.default_height == 0 {
            return Err(PsyfiError::Configuration(format!(
                "default grid must be non-empty, got {}x{}",
                self.default_width, self.default_height
            )));
        }
        self.validate_grid_size(self.default_width, self.default_height)
    }

    /// Reject grids that are empty or exceed `max_grid_size` cells.
    pub fn validate_grid_size(&self, width: usize, height: usize) -> PsyfiResult<()> {
        if width == 0 || height == 0 {
            return Err(PsyfiError::Configuration(format!(
                "grid must be non-empty, got {width}x{height}"
            )));
        }
        let grid_size = width.saturating_mul(height);
        if grid_size > self.max_grid_size {
            return Err(PsyfiError::Configuration(format!(
                "grid size {grid_size} exceeds maximum {}",
                self.max_grid_size
            )));
        }
        Ok(())
    }

    /// Load from JSON string.
    pub fn from_json(json: &str) -> PsyfiResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| PsyfiError::Configuration(format!("JSON parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(PsyfiConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_seed() {
        let cfg = PsyfiConfig::default();
        assert!(cfg.abx.deterministic);
        assert_eq!(cfg.abx.default_seed, 1337);
        assert_eq!(cfg.abx.version, "1.3");
    }

    #[test]
    fn test_grid_size_within_limit() {
        let cfg = PsyfiConfig::default();
        assert!(cfg.validate_grid_size(512, 512).is_ok());
        assert!(cfg.validate_grid_size(1024, 1024).is_ok());
    }

    #[test]
    fn test_grid_size_exceeds_limit() {
        let cfg = PsyfiConfig::default();
        let err = cfg.validate_grid_size(2048, 1024).unwrap_err();
        assert!(matches!(err, PsyfiError::Configuration(_)));
    }

    #[test]
    fn test_empty_grid_rejected() {
        let cfg = PsyfiConfig::default();
        assert!(cfg.validate_grid_size(0, 16).is_err());
    }

    #[test]
    fn test_from_json_partial() {
        let cfg = PsyfiConfig::from_json(r#"{"max_grid_size": 4096, "abx": {"default_seed": 7}}"#)
            .unwrap();
        assert_eq!(cfg.max_grid_size, 4096);
        assert_eq!(cfg.abx.default_seed, 7);
        assert!(cfg.abx.deterministic);
        assert_eq!(cfg.default_width, 64);
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        assert!(PsyfiConfig::from_json("not json").is_err());
        assert!(PsyfiConfig::from_json(r#"{"max_grid_size": 100}"#).is_err());
    }
}
