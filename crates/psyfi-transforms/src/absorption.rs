// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Absorption Smoothing
// ─────────────────────────────────────────────────────────────────────
//! Local smoothing around an attentional focus.
//!
//! The field is blurred (real and imaginary channels, sigma
//! `2·smooth_gain`) and blended back over the original with a Gaussian
//! mask of width `radius·min(w, h)` centred on the focus. The mask value
//! is the weight of the blurred field.

use serde::{Deserialize, Serialize};

use psyfi_core::{ndimage, Complex64, Field};
use psyfi_types::PsyfiResult;

use crate::bounds::require_unit;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbsorptionParams {
    /// Fraction of width. Default: 0.5.
    pub focus_x: f64,
    /// Fraction of height. Default: 0.5.
    pub focus_y: f64,
    /// Fraction of `min(width, height)`. Default: 0.3.
    pub radius: f64,
    /// Default: 0.5.
    pub smooth_gain: f64,
}

impl Default for AbsorptionParams {
    fn default() -> Self {
        Self {
            focus_x: 0.5,
            focus_y: 0.5,
            radius: 0.3,
            smooth_gain: 0.5,
        }
    }
}

impl AbsorptionParams {
    pub fn validate(&self) -> PsyfiResult<()> {
        require_unit("focus_x", self.focus_x)?;
        require_unit("focus_y", self.focus_y)?;
        require_unit("radius", self.radius)?;
        require_unit("smooth_gain", self.smooth_gain)
    }
}

pub fn apply_absorption(field: &Field, params: &AbsorptionParams) -> PsyfiResult<Field> {
    params.validate()?;
    let (width, height) = (field.width(), field.height());
    let radius_px = (params.radius * width.min(height) as f64) as usize;
    if radius_px == 0 {
        return Ok(field.clone());
    }
    let fx = (params.focus_x * width as f64).trunc();
    let fy = (params.focus_y * height as f64).trunc();

    let mask = ndimage::gaussian_spot(width, height, fy, fx, radius_px as f64);
    let smoothed =
        ndimage::gaussian_filter_complex(field.data(), width, height, 2.0 * params.smooth_gain);
    let data: Vec<Complex64> = mask
        .iter()
        .zip(smoothed.iter().zip(field.data()))
        .map(|(&w, (s, z))| *s * w + *z * (1.0 - w))
        .collect();
    field.copy_with_data(data)
}
