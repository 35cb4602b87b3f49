// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Field Assessment
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use psyfi_core::Field;
use psyfi_types::{EthicsAssessment, NegativeValenceSignature, ResonanceModes, ValenceMetrics};

use crate::ethics::assess_ethics;
use crate::geometry::{compute_simplicity_metrics, SimplicityMetrics};
use crate::pathology::signature_with_spectrum;
use crate::spectral::{modes_from_spectrum, SpectralAnalyzer, DEFAULT_NUM_MODES};
use crate::valence::compute_valence_metrics;

/// Every score derived from one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldAssessment {
    pub valence: ValenceMetrics,
    pub negative: NegativeValenceSignature,
    pub ethics: EthicsAssessment,
    pub resonance: ResonanceModes,
    pub simplicity: SimplicityMetrics,
}

/// Score a field with [`DEFAULT_NUM_MODES`] resonance modes.
pub fn assess_field(field: &Field) -> FieldAssessment {
    assess_field_with_modes(field, DEFAULT_NUM_MODES)
}

/// Score a field. The spectrum is computed once and feeds both resonance
/// mode selection and spikiness.
pub fn assess_field_with_modes(field: &Field, num_modes: usize) -> FieldAssessment {
    let spectrum = SpectralAnalyzer::for_field(field).magnitude_spectrum(field);
    let valence = compute_valence_metrics(field);
    let negative = signature_with_spectrum(field, &spectrum);
    let ethics = assess_ethics(&valence, &negative);
    let resonance = modes_from_spectrum(&spectrum, field.width(), field.height(), num_modes);
    let simplicity = compute_simplicity_metrics(field);
    log::debug!(
        "assess_field: {}x{} valence={:.4} risk={:.4}",
        field.width(),
        field.height(),
        valence.valence_score,
        ethics.risk_score
    );
    FieldAssessment {
        valence,
        negative,
        ethics,
        resonance,
        simplicity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathology::compute_negative_valence_signature;
    use psyfi_core::{Complex64, DeterministicRuntime};

    fn noisy_field() -> Field {
        let mut rt = DeterministicRuntime::new(true, Some(11));
        let m = rt.uniform(0.5, 1.5, 24 * 24);
        let th = rt.uniform(-std::f64::consts::PI, std::f64::consts::PI, 24 * 24);
        Field::from_polar(24, 24, &m, &th).unwrap()
    }

    #[test]
    fn test_matches_individual_metrics() {
        let f = noisy_field();
        let a = assess_field(&f);
        assert_eq!(a.valence, compute_valence_metrics(&f));
        assert_eq!(a.negative, compute_negative_valence_signature(&f));
        assert_eq!(a.resonance.num_modes, DEFAULT_NUM_MODES);
        assert_eq!(a.ethics, assess_ethics(&a.valence, &a.negative));
    }

    #[test]
    fn test_locked_field_scores() {
        let f = Field::filled(16, 16, Complex64::new(1.0, 0.0)).unwrap();
        let a = assess_field(&f);
        assert!(a.valence.coherence_score > 0.99);
        assert!(a.negative.hyper_sync > 0.99);
        assert!(a.ethics.suffering_risk > 0.3);
    }

    #[test]
    fn test_assessment_serializes() {
        let a = assess_field(&noisy_field());
        let json = serde_json::to_string(&a).unwrap();
        let back: FieldAssessment = serde_json::from_str(&json).unwrap();
        assert_eq!(back.resonance.num_modes, a.resonance.num_modes);
    }
}
