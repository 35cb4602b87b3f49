// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Phase Reset
// ─────────────────────────────────────────────────────────────────────
//! The one transform that consumes randomness.
//!
//! Phases are blended toward a fresh `U(-π, π)` draw:
//! `θ' = (1 − s)·θ + s·θ_rand`, `s = clamp(strength, 0, 1)`. Exactly
//! `w·h` uniforms are taken from the runtime in row-major order whatever
//! the strength, so the stream position after a reset depends only on the
//! grid size.

use std::f64::consts::PI;

use psyfi_core::{DeterministicRuntime, Field};
use psyfi_types::{clamp_score, PsyfiResult};

pub fn apply_phase_reset(
    field: &Field,
    strength: f64,
    runtime: &mut DeterministicRuntime,
) -> PsyfiResult<Field> {
    let alpha = clamp_score(strength, 0.0, 1.0);
    let (magnitudes, phases) = field.to_polar();
    let random_phases = runtime.uniform(-PI, PI, field.len());

    let blended: Vec<f64> = phases
        .iter()
        .zip(random_phases.iter())
        .map(|(th, rnd)| (1.0 - alpha) * th + alpha * rnd)
        .collect();
    let out = field.with_polar(&magnitudes, &blended)?;

    log::debug!("phase reset: strength={alpha:.3} seed={}", runtime.seed());
    runtime.add_module("phase_reset");
    runtime.add_parameter("reset_strength", strength);
    Ok(out)
}
