// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Gradient Drift
// ─────────────────────────────────────────────────────────────────────
//! Radial "breathing": each cell's phase is rotated by
//! `2π · amplitude · sin(2π·r / (scale·width) + velocity·t)` where `r` is
//! the distance from the grid centre. Magnitude is untouched.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use psyfi_core::{Complex64, Field};
use psyfi_types::PsyfiResult;

use crate::bounds::{require_finite, require_non_negative, require_positive};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftParams {
    /// Default: 0.05.
    pub amplitude: f64,
    /// Default: 1.0.
    pub velocity: f64,
    /// Radial wavelength as a multiple of width. Default: 2.0.
    pub spatial_scale: f64,
}

impl Default for DriftParams {
    fn default() -> Self {
        Self {
            amplitude: 0.05,
            velocity: 1.0,
            spatial_scale: 2.0,
        }
    }
}

impl DriftParams {
    pub fn validate(&self) -> PsyfiResult<()> {
        require_non_negative("amplitude", self.amplitude)?;
        require_finite("velocity", self.velocity)?;
        require_positive("spatial_scale", self.spatial_scale)
    }
}

/// Apply the drift at time `t`.
pub fn apply_drift(field: &Field, t: f64, params: &DriftParams) -> PsyfiResult<Field> {
    params.validate()?;
    require_finite("t", t)?;

    let (width, height) = (field.width(), field.height());
    let cy = height as f64 / 2.0;
    let cx = width as f64 / 2.0;
    let wavelength = params.spatial_scale * width as f64;

    let mut data = Vec::with_capacity(field.len());
    for r in 0..height {
        for c in 0..width {
            let dist = (r as f64 - cy).hypot(c as f64 - cx);
            let displacement =
                params.amplitude * (TAU * dist / wavelength + params.velocity * t).sin();
            let rotation = Complex64::from_polar(1.0, TAU * displacement);
            data.push(field.data()[r * width + c] * rotation);
        }
    }
    field.copy_with_data(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> Field {
        let data = (0..64)
            .map(|i| Complex64::from_polar(0.5 + (i % 5) as f64 * 0.1, i as f64 * 0.2))
            .collect();
        Field::from_vec(8, 8, data).unwrap()
    }

    #[test]
    fn test_magnitude_preserved() {
        let f = field();
        let out = apply_drift(&f, 0.7, &DriftParams::default()).unwrap();
        for (a, b) in f.magnitudes().iter().zip(out.magnitudes()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_zero_amplitude_identity() {
        let f = field();
        let p = DriftParams {
            amplitude: 0.0,
            ..Default::default()
        };
        let out = apply_drift(&f, 3.0, &p).unwrap();
        assert!(out.approx_eq(&f, 0.0, 1e-12));
    }

    #[test]
    fn test_centre_shift_follows_time() {
        let f = Field::filled(8, 8, Complex64::new(1.0, 0.0)).unwrap();
        let p = DriftParams {
            amplitude: 0.1,
            velocity: 1.0,
            spatial_scale: 2.0,
        };
        let t = std::f64::consts::FRAC_PI_2;
        let out = apply_drift(&f, t, &p).unwrap();
        // Centre cell (4, 4) sits at r = 0: shift = 2π · 0.1 · sin(π/2).
        let phase = out.get(4, 4).unwrap().arg();
        assert!((phase - TAU * 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_bad_scale() {
        let p = DriftParams {
            spatial_scale: 0.0,
            ..Default::default()
        };
        assert!(apply_drift(&field(), 0.0, &p).is_err());
    }
}
