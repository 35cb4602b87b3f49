// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Gestalt Completion
// ─────────────────────────────────────────────────────────────────────
//! Perceptual closure by binary morphology on the magnitude plane.
//!
//! The magnitude is thresholded at its median, closed then opened with a
//! square element of side `⌊1 + 4·closure_bias⌋`. Cells switched on by the
//! morphology take the mean magnitude. Alongside the field a
//! [`GestaltProfile`] is returned:
//! - simplicity: fraction of cells on after opening
//! - closure: filled / (originally off + 1), capped at 1
//! - invariance: Pearson correlation of old and new magnitude, floored at 0

use serde::{Deserialize, Serialize};

use psyfi_core::{ndimage, Field};
use psyfi_types::{GestaltProfile, PsyfiResult};

use crate::bounds::require_unit;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestaltParams {
    /// Default: 0.5.
    pub closure_bias: f64,
}

impl Default for GestaltParams {
    fn default() -> Self {
        Self { closure_bias: 0.5 }
    }
}

impl GestaltParams {
    pub fn validate(&self) -> PsyfiResult<()> {
        require_unit("closure_bias", self.closure_bias)
    }

    pub fn element_size(&self) -> usize {
        (1.0 + 4.0 * self.closure_bias) as usize
    }
}

pub fn apply_gestalt_completion(
    field: &Field,
    params: &GestaltParams,
) -> PsyfiResult<(Field, GestaltProfile)> {
    params.validate()?;
    let (width, height) = (field.width(), field.height());
    let (magnitudes, phases) = field.to_polar();

    let threshold = ndimage::median(&magnitudes);
    let binary: Vec<bool> = magnitudes.iter().map(|&m| m > threshold).collect();
    let size = params.element_size();
    let closed = ndimage::binary_closing(&binary, width, height, size);
    let opened = ndimage::binary_opening(&closed, width, height, size);

    let mean_mag = ndimage::mean(&magnitudes);
    let mut filled_mag = magnitudes.clone();
    let mut filled = 0usize;
    for (i, (&on, &was)) in opened.iter().zip(binary.iter()).enumerate() {
        if on && !was {
            filled_mag[i] = mean_mag;
            filled += 1;
        }
    }

    let n = magnitudes.len() as f64;
    let simplicity = opened.iter().filter(|&&b| b).count() as f64 / n;
    let unfilled = binary.iter().filter(|&&b| !b).count();
    let closure = if unfilled > 0 {
        (filled as f64 / (unfilled as f64 + 1.0)).min(1.0)
    } else {
        0.0
    };
    let invariance = ndimage::pearson(&magnitudes, &filled_mag)
        .unwrap_or(1.0)
        .max(0.0);

    log::debug!(
        "gestalt: element={size} filled={filled} simplicity={simplicity:.3} closure={closure:.3}"
    );
    let profile = GestaltProfile::new(simplicity, closure, invariance);
    let out = field.with_polar(&filled_mag, &phases)?;
    Ok((out, profile))
}
