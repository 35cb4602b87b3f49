// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Context Shift
// ─────────────────────────────────────────────────────────────────────
//! Softening blend controlled by a single intensity.
//!
//! Magnitude is blended with its Gaussian blur. Phase is blurred as a unit
//! vector field (cos and sin channels separately), then blended with the
//! original in the complex plane so the result never wraps around ±π.
//! Blur sigma is `1 + 2·intensity`; blend weight is `clamp(intensity, 0, 1)`.
//! Large intensities flatten the field toward its mean.

use psyfi_core::{ndimage, Complex64, DeterministicRuntime, Field};
use psyfi_types::{clamp_score, PsyfiResult};

use crate::bounds::require_finite;

pub fn apply_context_shift(
    field: &Field,
    intensity: f64,
    runtime: Option<&mut DeterministicRuntime>,
) -> PsyfiResult<Field> {
    require_finite("intensity", intensity)?;
    let (width, height) = (field.width(), field.height());
    let sigma = 1.0 + 2.0 * intensity;
    let alpha = clamp_score(intensity, 0.0, 1.0);

    let (magnitudes, phases) = field.to_polar();
    let blurred_mag = ndimage::gaussian_filter(&magnitudes, width, height, sigma);
    let new_mag: Vec<f64> = magnitudes
        .iter()
        .zip(blurred_mag.iter())
        .map(|(m, b)| (1.0 - alpha) * m + alpha * b)
        .collect();

    let cos: Vec<f64> = phases.iter().map(|th| th.cos()).collect();
    let sin: Vec<f64> = phases.iter().map(|th| th.sin()).collect();
    let cos = ndimage::gaussian_filter(&cos, width, height, sigma);
    let sin = ndimage::gaussian_filter(&sin, width, height, sigma);

    let new_phase: Vec<f64> = phases
        .iter()
        .zip(cos.iter().zip(sin.iter()))
        .map(|(&th, (&c, &s))| {
            let original = Complex64::from_polar(1.0, th);
            let blurred = Complex64::from_polar(1.0, s.atan2(c));
            (original * (1.0 - alpha) + blurred * alpha).arg()
        })
        .collect();

    let out = field.with_polar(&new_mag, &new_phase)?;
    if let Some(rt) = runtime {
        rt.add_module("context_shift");
        rt.add_parameter("intensity", intensity);
    }
    Ok(out)
}
