// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Negative Valence Signature
// ─────────────────────────────────────────────────────────────────────
//! Pathology markers: over-locking, spectral spikes, jagged gradients and
//! attractor trapping.

use psyfi_core::Field;
use psyfi_types::NegativeValenceSignature;

use crate::spectral::{spectral_spikiness, SpectralAnalyzer};
use crate::valence::{coherence, mean_gradient};

/// Coherence above which phase locking counts as pathological.
pub const HYPER_SYNC_ONSET: f64 = 0.9;

pub fn hyper_sync(coherence: f64) -> f64 {
    ((coherence - HYPER_SYNC_ONSET) / (1.0 - HYPER_SYNC_ONSET)).max(0.0)
}

/// Mean gradient magnitude over mean magnitude. Uncapped; 0 for a dark field.
pub fn gradient_energy(field: &Field) -> f64 {
    let mean_mag = field.mean_magnitude();
    if mean_mag > 0.0 {
        mean_gradient(field) / mean_mag
    } else {
        0.0
    }
}

pub fn attractor_stability(hyper_sync: f64, gradient_energy: f64) -> f64 {
    (hyper_sync + (gradient_energy / 2.0).min(1.0)) / 2.0
}

/// Signature from a precomputed shifted magnitude spectrum.
pub fn signature_with_spectrum(field: &Field, spectrum: &[f64]) -> NegativeValenceSignature {
    let hyper = hyper_sync(coherence(field));
    let energy = gradient_energy(field);
    NegativeValenceSignature::new(
        hyper,
        spectral_spikiness(spectrum),
        energy,
        attractor_stability(hyper, energy),
    )
}

pub fn compute_negative_valence_signature(field: &Field) -> NegativeValenceSignature {
    let spectrum = SpectralAnalyzer::for_field(field).magnitude_spectrum(field);
    signature_with_spectrum(field, &spectrum)
}
