// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Temporal Echo
// ─────────────────────────────────────────────────────────────────────
//! Frame persistence: `current·α + previous·(1 − α)` with `α = 1 − decay`.
//!
//! A non-zero `luminance_bias` turns `α` into a per-cell field,
//! `α·(1 + bias·m/max m)` clamped to [0, 1], so bright regions persist
//! more or less than dark ones.

use serde::{Deserialize, Serialize};

use psyfi_core::{Complex64, Field};
use psyfi_types::PsyfiResult;

use crate::bounds::{require_finite, require_same_shape, require_unit};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EchoParams {
    /// Weight kept from the previous frame. Default: 0.9.
    pub decay: f64,
    /// Default: 0.0 (uniform blend).
    pub luminance_bias: f64,
}

impl Default for EchoParams {
    fn default() -> Self {
        Self {
            decay: 0.9,
            luminance_bias: 0.0,
        }
    }
}

impl EchoParams {
    pub fn validate(&self) -> PsyfiResult<()> {
        require_unit("decay", self.decay)?;
        require_finite("luminance_bias", self.luminance_bias)
    }
}

pub fn apply_echo(previous: &Field, current: &Field, params: &EchoParams) -> PsyfiResult<Field> {
    params.validate()?;
    require_same_shape(current, previous)?;

    let alpha = 1.0 - params.decay;
    let data: Vec<Complex64> = if params.luminance_bias != 0.0 {
        let max_mag = current.max_magnitude();
        current
            .data()
            .iter()
            .zip(previous.data())
            .map(|(cur, prev)| {
                let norm = cur.norm() / (max_mag + 1e-8);
                let a = (alpha * (1.0 + params.luminance_bias * norm)).clamp(0.0, 1.0);
                *cur * a + *prev * (1.0 - a)
            })
            .collect()
    } else {
        current
            .data()
            .iter()
            .zip(previous.data())
            .map(|(cur, prev)| *cur * alpha + *prev * (1.0 - alpha))
            .collect()
    };
    current.copy_with_data(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use psyfi_types::PsyfiError;

    fn filled(w: usize, h: usize, re: f64) -> Field {
        Field::filled(w, h, Complex64::new(re, 0.0)).unwrap()
    }

    #[test]
    fn test_default_blend() {
        let p = EchoParams::default();
        let out = apply_echo(&filled(4, 4, 0.0), &filled(4, 4, 1.0), &p).unwrap();
        assert!(out.data().iter().all(|z| (z.re - 0.1).abs() < 1e-12));
    }

    #[test]
    fn test_zero_decay_is_current() {
        let p = EchoParams {
            decay: 0.0,
            ..Default::default()
        };
        let cur = filled(3, 3, 2.0);
        let out = apply_echo(&filled(3, 3, 5.0), &cur, &p).unwrap();
        assert!(out.approx_eq(&cur, 0.0, 1e-12));
    }

    #[test]
    fn test_luminance_bias_clamped() {
        let p = EchoParams {
            decay: 0.0,
            luminance_bias: 5.0,
        };
        let out = apply_echo(&filled(2, 2, 3.0), &filled(2, 2, 1.0), &p).unwrap();
        // α would be 6, clamped to 1: pure current frame.
        assert!(out.data().iter().all(|z| (z.re - 1.0).abs() < 1e-9));
    }

    #[test]
    fn test_shape_mismatch() {
        let err = apply_echo(&filled(3, 3, 0.0), &filled(4, 4, 1.0), &EchoParams::default());
        assert!(matches!(err, Err(PsyfiError::Validation(_))));
    }

    #[test]
    fn test_rejects_decay_out_of_range() {
        let p = EchoParams {
            decay: 1.5,
            ..Default::default()
        };
        assert!(apply_echo(&filled(2, 2, 0.0), &filled(2, 2, 0.0), &p).is_err());
    }
}
