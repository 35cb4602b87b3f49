// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Safety Clamp
// ─────────────────────────────────────────────────────────────────────

use psyfi_types::clamp_score;

use crate::params::{ParamKind, ParamMap};

pub const INTENSITY_MIN: f64 = 0.0;
pub const INTENSITY_MAX: f64 = 1.0;

/// Hard bounds for every [`ParamKind`]. NaN goes to the lower bound and
/// ±Inf to the nearest bound. `enforce` is idempotent.
#[derive(Debug, Clone, Copy, Default)]
pub struct SafetyClamp;

impl SafetyClamp {
    pub fn clamp(&self, kind: ParamKind, value: f64) -> f64 {
        let (lo, hi) = kind.bounds();
        clamp_score(value, lo, hi)
    }

    pub fn clamp_intensity(&self, intensity: f64) -> f64 {
        clamp_score(intensity, INTENSITY_MIN, INTENSITY_MAX)
    }

    /// Clamped copy of `params`. Kinds absent from the input stay absent.
    pub fn enforce(&self, params: &ParamMap) -> ParamMap {
        params
            .iter()
            .map(|(kind, value)| {
                let clamped = self.clamp(kind, value);
                if clamped != value {
                    log::warn!("SafetyClamp: {kind} {value} -> {clamped}");
                }
                (kind, clamped)
            })
            .collect()
    }
}
