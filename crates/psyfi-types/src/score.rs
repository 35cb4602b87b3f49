// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Score Types
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

/// Lower end of the raw weighted valence sum.
pub const VALENCE_MIN: f64 = -0.2;
/// Upper end of the raw weighted valence sum.
pub const VALENCE_MAX: f64 = 0.8;

/// Clamp a value to [lo, hi], mapping NaN to lo and Inf to nearest bound.
#[inline]
pub fn clamp_score(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() {
        log::warn!("clamp_score: NaN detected, clamping to {lo:.4}");
        return lo;
    }
    if value.is_infinite() {
        let boundary = if value > 0.0 { hi } else { lo };
        log::warn!("clamp_score: Inf detected, clamping to {boundary:.4}");
        return boundary;
    }
    value.clamp(lo, hi)
}

/// Map a raw weighted valence sum from `[VALENCE_MIN, VALENCE_MAX]` onto `[-1, 1]`.
pub fn normalize_valence(raw_valence: f64) -> f64 {
    let scaled = (raw_valence - VALENCE_MIN) / (VALENCE_MAX - VALENCE_MIN);
    clamp_score(scaled * 2.0 - 1.0, -1.0, 1.0)
}

/// Hedonic tone of a field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValenceMetrics {
    /// Overall valence, -1 (negative) to 1 (positive).
    pub valence_score: f64,
    /// Kuramoto order parameter ∈ [0, 1].
    pub coherence_score: f64,
    /// Quadrant mirror correlation ∈ [0, 1].
    pub symmetry_score: f64,
    /// Normalised gradient energy ∈ [0, 1].
    pub roughness_score: f64,
    /// Normalised phase variance ∈ [0, 1].
    pub richness_score: f64,
    /// Activity-based confidence ∈ [0, 1].
    pub confidence: f64,
}

impl Default for ValenceMetrics {
    fn default() -> Self {
        Self {
            valence_score: 0.0,
            coherence_score: 0.0,
            symmetry_score: 0.0,
            roughness_score: 0.0,
            richness_score: 0.0,
            confidence: 1.0,
        }
    }
}

impl ValenceMetrics {
    pub fn new(
        valence_score: f64,
        coherence_score: f64,
        symmetry_score: f64,
        roughness_score: f64,
        richness_score: f64,
        confidence: f64,
    ) -> Self {
        Self {
            valence_score: clamp_score(valence_score, -1.0, 1.0),
            coherence_score: clamp_score(coherence_score, 0.0, 1.0),
            symmetry_score: clamp_score(symmetry_score, 0.0, 1.0),
            roughness_score: clamp_score(roughness_score, 0.0, 1.0),
            richness_score: clamp_score(richness_score, 0.0, 1.0),
            confidence: clamp_score(confidence, 0.0, 1.0),
        }
    }

    /// Weighted valence of four component scores, span-mapped onto `[-1, 1]`.
    ///
    /// `0.4·coherence + 0.3·symmetry − 0.2·roughness + 0.1·richness_term`
    /// spans `[-0.2, 0.8]`, which is mapped affinely onto `[-1, 1]`.
    pub fn combine(coherence: f64, symmetry: f64, roughness: f64, richness_term: f64) -> f64 {
        let raw = 0.4 * coherence + 0.3 * symmetry - 0.2 * roughness + 0.1 * richness_term;
        normalize_valence(raw)
    }

    /// Combined valence with the raw `richness_score` as the richness term.
    ///
    /// This is not `valence_score` as produced by field scoring, which
    /// feeds the shaped term `1 − 2·|richness − 0.5|` instead. The two
    /// agree only when richness is 0 or 2/3.
    pub fn combined_valence(&self) -> f64 {
        Self::combine(
            self.coherence_score,
            self.symmetry_score,
            self.roughness_score,
            self.richness_score,
        )
    }
}

/// Markers of pathological field configurations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NegativeValenceSignature {
    /// Excess phase locking ∈ [0, 1].
    pub hyper_sync: f64,
    /// Variance of the normalised spectrum, ≥ 0.
    pub spectral_spikiness: f64,
    /// Mean gradient magnitude over mean magnitude, ≥ 0.
    pub gradient_energy: f64,
    /// How trapped the field is in its current state ∈ [0, 1].
    pub attractor_stability: f64,
}

impl NegativeValenceSignature {
    pub fn new(
        hyper_sync: f64,
        spectral_spikiness: f64,
        gradient_energy: f64,
        attractor_stability: f64,
    ) -> Self {
        Self {
            hyper_sync: clamp_score(hyper_sync, 0.0, 1.0),
            spectral_spikiness: clamp_score(spectral_spikiness, 0.0, f64::MAX),
            gradient_energy: clamp_score(gradient_energy, 0.0, f64::MAX),
            attractor_stability: clamp_score(attractor_stability, 0.0, 1.0),
        }
    }

    /// Weighted suffering risk, capped at 1.
    pub fn suffering_risk(&self) -> f64 {
        let risk = 0.3 * self.hyper_sync
            + 0.3 * (self.spectral_spikiness / 10.0).min(1.0)
            + 0.2 * (self.gradient_energy / 5.0).min(1.0)
            + 0.2 * self.attractor_stability;
        risk.min(1.0)
    }
}

/// Derived ethical assessment of a field state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EthicsAssessment {
    /// `suffering_risk − 0.5·bliss_potential`; higher is more concerning.
    pub risk_score: f64,
    /// Estimated distress ∈ [0, 1].
    pub suffering_risk: f64,
    /// Potential for positive experience.
    pub bliss_potential: f64,
}

/// Perceptual organisation scores produced by gestalt completion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestaltProfile {
    pub simplicity_score: f64,
    pub closure_score: f64,
    pub invariance_score: f64,
}

impl Default for GestaltProfile {
    fn default() -> Self {
        Self {
            simplicity_score: 0.5,
            closure_score: 0.5,
            invariance_score: 0.5,
        }
    }
}

impl GestaltProfile {
    pub fn new(simplicity_score: f64, closure_score: f64, invariance_score: f64) -> Self {
        Self {
            simplicity_score: clamp_score(simplicity_score, 0.0, 1.0),
            closure_score: clamp_score(closure_score, 0.0, 1.0),
            invariance_score: clamp_score(invariance_score, 0.0, 1.0),
        }
    }

    /// Equal-weight mean of the three principles.
    pub fn gestalt_strength(&self) -> f64 {
        (self.simplicity_score + self.closure_score + self.invariance_score) / 3.0
    }
}

/// Dominant spectral modes of a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResonanceModes {
    pub num_modes: usize,
    /// Magnitudes of the selected bins, ascending.
    pub top_magnitudes: Vec<f64>,
    /// Σ(top-K power) / Σ(all power).
    pub power_concentration: f64,
    /// Mean distance of the selected bins from the zero-frequency bin.
    pub avg_frequency: f64,
    pub total_power: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_nan() {
        assert_eq!(clamp_score(f64::NAN, 0.0, 1.0), 0.0);
    }

    #[test]
    fn test_clamp_pos_inf() {
        assert_eq!(clamp_score(f64::INFINITY, 0.0, 1.0), 1.0);
    }

    #[test]
    fn test_clamp_neg_inf() {
        assert_eq!(clamp_score(f64::NEG_INFINITY, 0.0, 1.0), 0.0);
    }

    #[test]
    fn test_clamp_normal() {
        assert_eq!(clamp_score(0.75, 0.0, 1.0), 0.75);
    }

    #[test]
    fn test_normalize_valence_span() {
        assert!((normalize_valence(VALENCE_MAX) - 1.0).abs() < 1e-12);
        assert!((normalize_valence(VALENCE_MIN) + 1.0).abs() < 1e-12);
        assert!((normalize_valence(0.3)).abs() < 1e-12);
        assert_eq!(normalize_valence(5.0), 1.0);
    }

    #[test]
    fn test_combined_valence_upper_boundary() {
        let v = ValenceMetrics::combine(1.0, 1.0, 0.0, 1.0);
        assert!((v - 1.0).abs() < 1e-12, "v={v}");
    }

    #[test]
    fn test_combined_valence_lower_boundary() {
        let v = ValenceMetrics::combine(0.0, 0.0, 1.0, 0.0);
        assert!((v + 1.0).abs() < 1e-12, "v={v}");
    }

    #[test]
    fn test_valence_metrics_clamps() {
        let m = ValenceMetrics::new(2.0, 1.5, -0.1, f64::NAN, 0.4, 3.0);
        assert_eq!(m.valence_score, 1.0);
        assert_eq!(m.coherence_score, 1.0);
        assert_eq!(m.symmetry_score, 0.0);
        assert_eq!(m.roughness_score, 0.0);
        assert_eq!(m.confidence, 1.0);
    }

    #[test]
    fn test_suffering_risk_capped() {
        let sig = NegativeValenceSignature::new(1.0, 100.0, 100.0, 1.0);
        assert_eq!(sig.suffering_risk(), 1.0);
    }

    #[test]
    fn test_suffering_risk_zero() {
        assert_eq!(NegativeValenceSignature::default().suffering_risk(), 0.0);
    }

    #[test]
    fn test_suffering_risk_weights() {
        let sig = NegativeValenceSignature::new(0.5, 5.0, 2.5, 0.5);
        let expected = 0.3 * 0.5 + 0.3 * 0.5 + 0.2 * 0.5 + 0.2 * 0.5;
        assert!((sig.suffering_risk() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_gestalt_strength() {
        let g = GestaltProfile::new(0.3, 0.6, 0.9);
        assert!((g.gestalt_strength() - 0.6).abs() < 1e-12);
    }
}
