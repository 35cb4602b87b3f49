// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Divisive Normalization
// ─────────────────────────────────────────────────────────────────────
//! Contrast gain control:
//!
//!   a = m^P,  s = box_mean(a, 2r+1),  m' = a / (1 + V·s^P)
//!
//! The surround window is zero-padded at the borders. Phase is kept.

use serde::{Deserialize, Serialize};

use psyfi_core::{ndimage, Field};
use psyfi_types::{PsyfiError, PsyfiResult};

use crate::bounds::{require_non_negative, require_positive};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationParams {
    /// Activation exponent. Default: 1.0.
    #[serde(alias = "P")]
    pub p: f64,
    /// Divisive strength. Default: 1.0.
    #[serde(alias = "V")]
    pub v: f64,
    /// Surround radius in cells. Default: 3.
    pub surround_radius: usize,
}

impl Default for NormalizationParams {
    fn default() -> Self {
        Self {
            p: 1.0,
            v: 1.0,
            surround_radius: 3,
        }
    }
}

impl NormalizationParams {
    pub fn validate(&self) -> PsyfiResult<()> {
        require_positive("P", self.p)?;
        require_non_negative("V", self.v)?;
        if self.surround_radius == 0 {
            return Err(PsyfiError::Validation(
                "surround_radius must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn apply_divisive_normalization(
    field: &Field,
    params: &NormalizationParams,
) -> PsyfiResult<Field> {
    params.validate()?;
    let (magnitudes, phases) = field.to_polar();
    let activation: Vec<f64> = magnitudes.iter().map(|m| m.powf(params.p)).collect();
    let surround = ndimage::uniform_filter(
        &activation,
        field.width(),
        field.height(),
        params.surround_radius,
    );
    let normalized: Vec<f64> = activation
        .iter()
        .zip(surround.iter())
        .map(|(a, s)| a / (1.0 + params.v * s.powf(params.p)))
        .collect();
    field.with_polar(&normalized, &phases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use psyfi_core::Complex64;

    #[test]
    fn test_uniform_interior() {
        let f = Field::filled(16, 16, Complex64::from_polar(2.0, 0.3)).unwrap();
        let out = apply_divisive_normalization(&f, &NormalizationParams::default()).unwrap();
        // Interior surround is 2, so m' = 2 / (1 + 2).
        let z = out.get(8, 8).unwrap();
        assert!((z.norm() - 2.0 / 3.0).abs() < 1e-12);
        assert!((z.arg() - 0.3).abs() < 1e-12);
        // Border surround is smaller, so the border is brighter.
        assert!(out.get(0, 0).unwrap().norm() > z.norm());
    }

    #[test]
    fn test_zero_v_is_power_law() {
        let f = Field::filled(4, 4, Complex64::new(3.0, 0.0)).unwrap();
        let p = NormalizationParams {
            p: 2.0,
            v: 0.0,
            surround_radius: 1,
        };
        let out = apply_divisive_normalization(&f, &p).unwrap();
        assert!(out.data().iter().all(|z| (z.re - 9.0).abs() < 1e-12));
    }

    #[test]
    fn test_aliases() {
        let p: NormalizationParams = serde_json::from_str(r#"{"P": 2.0, "V": 0.5}"#).unwrap();
        assert_eq!(p.p, 2.0);
        assert_eq!(p.v, 0.5);
        assert_eq!(p.surround_radius, 3);
    }

    #[test]
    fn test_rejects_bad_params() {
        let f = Field::zeros(3, 3).unwrap();
        for p in [
            NormalizationParams { p: 0.0, ..Default::default() },
            NormalizationParams { v: -1.0, ..Default::default() },
            NormalizationParams { surround_radius: 0, ..Default::default() },
        ] {
            assert!(apply_divisive_normalization(&f, &p).is_err());
        }
    }
}
