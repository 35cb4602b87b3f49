// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Kuramoto Parameters
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use psyfi_types::{PsyfiError, PsyfiResult};

/// Upper bound on `coupling_strength`, shared with the safety table.
pub const MAX_COUPLING: f64 = 2.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouplingType {
    /// Unweighted mean over the four neighbours.
    #[default]
    Symmetric,
    /// Neighbour-magnitude weighted mean.
    Asymmetric,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KuramotoParams {
    pub coupling_type: CouplingType,

    /// Default: 0.5. Range [0, 2].
    pub coupling_strength: f64,

    /// Base natural frequency. Default: 1.0.
    pub natural_freq_base: f64,

    /// Frequency gain along rows (row / height). Default: 0.5.
    pub freq_depth_scale: f64,

    /// Frequency gain from normalised magnitude. Default: 0.1.
    pub freq_brightness_scale: f64,

    /// Default: 10. Must be ≥ 1.
    pub steps: u32,

    /// Default: 0.1. Must be > 0.
    pub dt: f64,
}

impl Default for KuramotoParams {
    fn default() -> Self {
        Self {
            coupling_type: CouplingType::Symmetric,
            coupling_strength: 0.5,
            natural_freq_base: 1.0,
            freq_depth_scale: 0.5,
            freq_brightness_scale: 0.1,
            steps: 10,
            dt: 0.1,
        }
    }
}

impl KuramotoParams {
    pub fn validate(&self) -> PsyfiResult<()> {
        if !(0.0..=MAX_COUPLING).contains(&self.coupling_strength) {
            return Err(PsyfiError::Validation(format!(
                "coupling_strength must be in [0, {MAX_COUPLING}], got {}",
                self.coupling_strength
            )));
        }
        if self.steps == 0 {
            return Err(PsyfiError::Validation("steps must be >= 1".to_string()));
        }
        if !(self.dt > 0.0 && self.dt.is_finite()) {
            return Err(PsyfiError::Validation(format!(
                "dt must be finite and > 0, got {}",
                self.dt
            )));
        }
        let scales = [
            self.natural_freq_base,
            self.freq_depth_scale,
            self.freq_brightness_scale,
        ];
        if scales.iter().any(|v| !v.is_finite()) {
            return Err(PsyfiError::Validation(
                "frequency parameters must be finite".to_string(),
            ));
        }
        Ok(())
    }
}
