// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Ethics Assessment
// ─────────────────────────────────────────────────────────────────────

use psyfi_types::{EthicsAssessment, NegativeValenceSignature, ValenceMetrics};

pub fn bliss_potential(valence: &ValenceMetrics) -> f64 {
    0.5 * valence.coherence_score
        + 0.3 * valence.symmetry_score
        + 0.2 * (1.0 - valence.roughness_score)
}

/// Combine valence and pathology into a risk score. Higher is worse.
pub fn assess_ethics(
    valence: &ValenceMetrics,
    negative: &NegativeValenceSignature,
) -> EthicsAssessment {
    let suffering_risk = negative.suffering_risk();
    let bliss = bliss_potential(valence);
    EthicsAssessment {
        risk_score: suffering_risk - 0.5 * bliss,
        suffering_risk,
        bliss_potential: bliss,
    }
}
