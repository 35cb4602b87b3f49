// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Geometric Simplicity
// ─────────────────────────────────────────────────────────────────────

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use psyfi_core::{ndimage, Field};

/// Uniformity of phase and magnitude. Simplicity scores are in `[0, 1]`,
/// 1 meaning perfectly uniform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimplicityMetrics {
    pub phase_variance: f64,
    pub magnitude_variance: f64,
    pub phase_simplicity: f64,
    pub magnitude_simplicity: f64,
    pub overall_simplicity: f64,
}

pub fn compute_simplicity_metrics(field: &Field) -> SimplicityMetrics {
    let phase_variance = ndimage::variance(&field.phases());
    let mags = field.magnitudes();
    let magnitude_variance = ndimage::variance(&mags);
    let mean_mag = ndimage::mean(&mags);

    let phase_simplicity = 1.0 - (phase_variance / (PI * PI)).min(1.0);
    let relative_mag_var = magnitude_variance / (mean_mag * mean_mag + 1e-8);
    let magnitude_simplicity = 1.0 - (relative_mag_var / 10.0).min(1.0);

    SimplicityMetrics {
        phase_variance,
        magnitude_variance,
        phase_simplicity,
        magnitude_simplicity,
        overall_simplicity: (phase_simplicity + magnitude_simplicity) / 2.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use psyfi_core::Complex64;

    #[test]
    fn test_uniform_field_is_simple() {
        let f = Field::filled(8, 8, Complex64::from_polar(2.0, 1.0)).unwrap();
        let s = compute_simplicity_metrics(&f);
        assert!(s.phase_variance < 1e-20);
        assert!((s.overall_simplicity - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_varied_field_is_less_simple() {
        let n = 16;
        let mags: Vec<f64> = (0..n * n).map(|i| 0.1 + (i % 7) as f64).collect();
        let th: Vec<f64> = (0..n * n).map(|i| -PI + 0.02 * i as f64).collect();
        let f = Field::from_polar(n, n, &mags, &th).unwrap();
        let s = compute_simplicity_metrics(&f);
        assert!(s.phase_simplicity < 1.0);
        assert!(s.magnitude_simplicity < 1.0);
        assert!((0.0..=1.0).contains(&s.overall_simplicity));
    }
}
