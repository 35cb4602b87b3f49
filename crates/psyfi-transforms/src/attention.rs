// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Attention Gain
// ─────────────────────────────────────────────────────────────────────
//! Magnitude gain `1 + gain·exp(-d²/2σ²)` around a focus point, with
//! `σ = 0.25·min(w, h)`. Phase is unchanged.

use serde::{Deserialize, Serialize};

use psyfi_core::{ndimage, Complex64, Field};
use psyfi_types::PsyfiResult;

use crate::bounds::{require_non_negative, require_unit};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttentionParams {
    pub focus_x: f64,
    pub focus_y: f64,
    /// Extra gain at the focus. Default: 0.5.
    pub gain: f64,
}

impl Default for AttentionParams {
    fn default() -> Self {
        Self {
            focus_x: 0.5,
            focus_y: 0.5,
            gain: 0.5,
        }
    }
}

impl AttentionParams {
    pub fn validate(&self) -> PsyfiResult<()> {
        require_unit("focus_x", self.focus_x)?;
        require_unit("focus_y", self.focus_y)?;
        require_non_negative("gain", self.gain)
    }
}

pub fn apply_attention(field: &Field, params: &AttentionParams) -> PsyfiResult<Field> {
    params.validate()?;
    let (width, height) = (field.width(), field.height());
    let sigma = 0.25 * width.min(height) as f64;
    let mask = ndimage::gaussian_spot(
        width,
        height,
        params.focus_y * height as f64,
        params.focus_x * width as f64,
        sigma,
    );
    let data: Vec<Complex64> = field
        .data()
        .iter()
        .zip(mask.iter())
        .map(|(z, m)| *z * (1.0 + params.gain * m))
        .collect();
    field.copy_with_data(data)
}
