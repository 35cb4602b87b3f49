// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Radial Magnification Remap
// ─────────────────────────────────────────────────────────────────────
//! Approximate log-polar geometry.
//!
//! Each output cell at radius `r = dist + 1` from the centre samples the
//! input at radius `r^(1 / (1 + scale·ln r_max))` along the same angle,
//! which magnifies the centre. This is a power-law radial remap, not true
//! log-polar binning. Sampling is bilinear on real and imaginary parts,
//! with sample coordinates clipped to the grid.

use serde::{Deserialize, Serialize};

use psyfi_core::{ndimage, Complex64, Field};
use psyfi_types::PsyfiResult;

use crate::bounds::require_positive;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetinaParams {
    /// Default: 1.0.
    pub radial_scale: f64,
}

impl Default for RetinaParams {
    fn default() -> Self {
        Self { radial_scale: 1.0 }
    }
}

impl RetinaParams {
    pub fn validate(&self) -> PsyfiResult<()> {
        require_positive("radial_scale", self.radial_scale)
    }
}

pub fn apply_log_polar(field: &Field, params: &RetinaParams) -> PsyfiResult<Field> {
    params.validate()?;
    let (width, height) = (field.width(), field.height());
    let cy = height as f64 / 2.0;
    let cx = width as f64 / 2.0;

    let mut radius = Vec::with_capacity(field.len());
    let mut angle = Vec::with_capacity(field.len());
    for r in 0..height {
        for c in 0..width {
            let dy = r as f64 - cy;
            let dx = c as f64 - cx;
            radius.push(dy.hypot(dx) + 1.0);
            angle.push(dy.atan2(dx));
        }
    }
    let log_r_max = radius
        .iter()
        .map(|r| r.ln() * params.radial_scale)
        .fold(f64::NEG_INFINITY, f64::max);
    let exponent = 1.0 / (1.0 + log_r_max);

    let re = field.real_parts();
    let im = field.imag_parts();
    let max_r = (height - 1) as f64;
    let max_c = (width - 1) as f64;
    let data: Vec<Complex64> = radius
        .iter()
        .zip(angle.iter())
        .map(|(&rad, &th)| {
            let scaled = rad.powf(exponent);
            let y = (cy + scaled * th.sin()).clamp(0.0, max_r);
            let x = (cx + scaled * th.cos()).clamp(0.0, max_c);
            Complex64::new(
                ndimage::bilinear_sample(&re, width, height, y, x),
                ndimage::bilinear_sample(&im, width, height, y, x),
            )
        })
        .collect();
    field.copy_with_data(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_field_preserved() {
        let f = Field::filled(9, 7, Complex64::new(0.4, -0.3)).unwrap();
        let out = apply_log_polar(&f, &RetinaParams::default()).unwrap();
        assert!(out.approx_eq(&f, 0.0, 1e-12));
    }

    #[test]
    fn test_magnifies_centre() {
        let mut data = vec![Complex64::new(0.0, 0.0); 121];
        data[5 * 11 + 5] = Complex64::new(1.0, 0.0);
        let f = Field::from_vec(11, 11, data).unwrap();
        let out = apply_log_polar(&f, &RetinaParams::default()).unwrap();
        let lit = out.magnitudes().iter().filter(|m| **m > 0.05).count();
        assert!(lit > 1, "centre impulse should spread, lit={lit}");
    }

    #[test]
    fn test_shape_kept() {
        let f = Field::zeros(16, 8).unwrap();
        let out = apply_log_polar(&f, &RetinaParams { radial_scale: 2.5 }).unwrap();
        assert_eq!(out.shape(), (8, 16));
    }

    #[test]
    fn test_rejects_non_positive_scale() {
        let f = Field::zeros(4, 4).unwrap();
        assert!(apply_log_polar(&f, &RetinaParams { radial_scale: 0.0 }).is_err());
    }
}
