// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Topological Smoothing
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use psyfi_core::{ndimage, Field};
use psyfi_types::PsyfiResult;

use crate::bounds::require_non_negative;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyParams {
    /// Default: 1.5. Zero disables smoothing.
    pub smoothing_sigma: f64,
}

impl Default for TopologyParams {
    fn default() -> Self {
        Self {
            smoothing_sigma: 1.5,
        }
    }
}

impl TopologyParams {
    pub fn validate(&self) -> PsyfiResult<()> {
        require_non_negative("smoothing_sigma", self.smoothing_sigma)
    }
}

/// Gaussian blur of the real and imaginary channels independently.
pub fn apply_topological_smoothing(field: &Field, params: &TopologyParams) -> PsyfiResult<Field> {
    params.validate()?;
    if params.smoothing_sigma == 0.0 {
        return Ok(field.clone());
    }
    let data = ndimage::gaussian_filter_complex(
        field.data(),
        field.width(),
        field.height(),
        params.smoothing_sigma,
    );
    field.copy_with_data(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use psyfi_core::Complex64;

    #[test]
    fn test_zero_sigma_copy() {
        let f = Field::filled(4, 4, Complex64::new(1.0, 2.0)).unwrap();
        let p = TopologyParams {
            smoothing_sigma: 0.0,
        };
        assert_eq!(apply_topological_smoothing(&f, &p).unwrap(), f);
    }

    #[test]
    fn test_smoothing_spreads_impulse() {
        let mut data = vec![Complex64::new(0.0, 0.0); 81];
        data[40] = Complex64::new(0.0, 1.0);
        let f = Field::from_vec(9, 9, data).unwrap();
        let out = apply_topological_smoothing(&f, &TopologyParams::default()).unwrap();
        assert!(out.get(4, 4).unwrap().im < 1.0);
        assert!(out.get(4, 5).unwrap().im > 0.0);
        assert!(out.data().iter().all(|z| z.re.abs() < 1e-15));
    }

    #[test]
    fn test_huge_sigma_flattens_to_mean() {
        let data: Vec<Complex64> = (0..64)
            .map(|i| Complex64::new(i as f64, -(i as f64) * 0.5))
            .collect();
        let f = Field::from_vec(8, 8, data).unwrap();
        let p = TopologyParams {
            smoothing_sigma: 1e12,
        };
        let out = apply_topological_smoothing(&f, &p).unwrap();
        let mean = f.data().iter().sum::<Complex64>() / 64.0;
        assert!(out.data().iter().all(|z| (z - mean).norm() < 1e-9));
    }

    #[test]
    fn test_rejects_negative_sigma() {
        let f = Field::zeros(2, 2).unwrap();
        let p = TopologyParams {
            smoothing_sigma: -1.0,
        };
        assert!(apply_topological_smoothing(&f, &p).is_err());
    }
}
