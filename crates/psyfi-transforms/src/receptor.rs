// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Receptor Modulation
// ─────────────────────────────────────────────────────────────────────
//! Receptor densities → divisive-normalization parameters.
//!
//! Heuristic linear mapping around a baseline density of 1.0:
//! - 5-HT2A lowers V: `V / (1 + 0.3·(h5ht2a − 1))`
//! - GABA raises V: `V · (1 + 0.2·(gaba − 1))`
//! - σ1 lowers P: `P · (1 − 0.1·(sigma1 − 1))`
//!
//! Results are clamped to `P ∈ [0.1, 3]`, `V ∈ [0, 5]`. Dopamine density
//! is carried on the profile but does not enter the mapping.

use serde::{Deserialize, Serialize};

use psyfi_types::{clamp_score, PsyfiResult};

use crate::bounds::require_non_negative;
use crate::normalization::NormalizationParams;

pub const P_RANGE: (f64, f64) = (0.1, 3.0);
pub const V_RANGE: (f64, f64) = (0.0, 5.0);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceptorProfile {
    pub h5ht2a_density: f64,
    pub gaba_density: f64,
    pub dopamine_density: f64,
    pub sigma1_density: f64,
}

impl Default for ReceptorProfile {
    fn default() -> Self {
        Self::baseline()
    }
}

impl ReceptorProfile {
    pub fn baseline() -> Self {
        Self {
            h5ht2a_density: 1.0,
            gaba_density: 1.0,
            dopamine_density: 1.0,
            sigma1_density: 1.0,
        }
    }

    /// Elevated 5-HT2A with mildly reduced inhibition.
    pub fn psychedelic_agonist() -> Self {
        Self {
            h5ht2a_density: 3.0,
            gaba_density: 0.8,
            dopamine_density: 1.2,
            sigma1_density: 1.5,
        }
    }

    pub fn validate(&self) -> PsyfiResult<()> {
        require_non_negative("h5ht2a_density", self.h5ht2a_density)?;
        require_non_negative("gaba_density", self.gaba_density)?;
        require_non_negative("dopamine_density", self.dopamine_density)?;
        require_non_negative("sigma1_density", self.sigma1_density)
    }
}

/// Pure parameter mapping; the surround radius passes through.
pub fn modulate_normalization(
    base: &NormalizationParams,
    receptors: &ReceptorProfile,
) -> PsyfiResult<NormalizationParams> {
    receptors.validate()?;

    let mut v = base.v / (1.0 + 0.3 * (receptors.h5ht2a_density - 1.0));
    v *= 1.0 + 0.2 * (receptors.gaba_density - 1.0);
    let p = base.p * (1.0 - 0.1 * (receptors.sigma1_density - 1.0));

    Ok(NormalizationParams {
        p: clamp_score(p, P_RANGE.0, P_RANGE.1),
        v: clamp_score(v, V_RANGE.0, V_RANGE.1),
        surround_radius: base.surround_radius,
    })
}
