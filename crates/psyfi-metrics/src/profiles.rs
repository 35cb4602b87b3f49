// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Adaptive Profiles
// ─────────────────────────────────────────────────────────────────────
//! Slow-moving state derived from a sequence of metric readings.
//!
//! Both profiles use an exponential update with rate [`ADAPTATION_RATE`].

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

pub const ADAPTATION_RATE: f64 = 0.1;
pub const HEDONIC_HISTORY: usize = 256;

/// Parameter values that produced a reading, keyed by parameter name.
pub type ParamSnapshot = BTreeMap<String, f64>;

/// Hedonic baseline that drifts upward toward pleasant readings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HedonicProfile {
    pub baseline_valence: f64,
    /// Most recent readings, oldest first, at most [`HEDONIC_HISTORY`].
    pub recent_valence: VecDeque<f64>,
    pub last_helpful_params: ParamSnapshot,
    pub last_harmful_params: ParamSnapshot,
}

impl HedonicProfile {
    /// Record a reading. Readings above baseline mark `params` as helpful
    /// and pull the baseline toward them; the rest mark `params` as harmful.
    pub fn update(&mut self, valence: f64, params: &ParamSnapshot) {
        if !valence.is_finite() {
            log::warn!("HedonicProfile: non-finite valence ignored");
            return;
        }
        self.recent_valence.push_back(valence);
        while self.recent_valence.len() > HEDONIC_HISTORY {
            self.recent_valence.pop_front();
        }

        if valence > self.baseline_valence {
            self.last_helpful_params = params.clone();
            self.baseline_valence += ADAPTATION_RATE * (valence - self.baseline_valence);
        } else {
            self.last_harmful_params = params.clone();
        }
    }

    /// Mean of the history, or the baseline when there is none.
    pub fn mean_recent_valence(&self) -> f64 {
        if self.recent_valence.is_empty() {
            return self.baseline_valence;
        }
        self.recent_valence.iter().sum::<f64>() / self.recent_valence.len() as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeditativeProfile {
    pub attention_stability: f64,
    pub pleasantness_gain: f64,
    pub equanimity: f64,
    pub collapse_risk: f64,
}

impl Default for MeditativeProfile {
    fn default() -> Self {
        Self {
            attention_stability: 0.5,
            pleasantness_gain: 1.0,
            equanimity: 0.5,
            collapse_risk: 0.3,
        }
    }
}

impl MeditativeProfile {
    pub fn update_from_coherence(&mut self, coherence: f64) {
        let coherence = psyfi_types::clamp_score(coherence, 0.0, 1.0);
        self.attention_stability += ADAPTATION_RATE * (coherence - self.attention_stability);
        self.collapse_risk = 1.0 - self.attention_stability;
        self.pleasantness_gain = 1.0 + self.attention_stability;
        self.equanimity += ADAPTATION_RATE * (self.attention_stability - self.equanimity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(coupling: f64) -> ParamSnapshot {
        [("coupling_strength".to_string(), coupling)].into_iter().collect()
    }

    #[test]
    fn test_baseline_adapts_upward() {
        let mut h = HedonicProfile::default();
        h.update(0.5, &snapshot(0.4));
        assert!((h.baseline_valence - 0.05).abs() < 1e-12);
        assert_eq!(h.last_helpful_params, snapshot(0.4));
        assert!(h.last_harmful_params.is_empty());
    }

    #[test]
    fn test_below_baseline_is_harmful() {
        let mut h = HedonicProfile::default();
        h.update(-0.3, &snapshot(1.8));
        assert_eq!(h.baseline_valence, 0.0);
        assert_eq!(h.last_harmful_params, snapshot(1.8));
    }

    #[test]
    fn test_history_capped() {
        let mut h = HedonicProfile::default();
        for i in 0..300 {
            h.update(i as f64 * 1e-3, &ParamSnapshot::new());
        }
        assert_eq!(h.recent_valence.len(), HEDONIC_HISTORY);
        assert_eq!(h.recent_valence.front().copied(), Some(44.0 * 1e-3));
    }

    #[test]
    fn test_mean_falls_back_to_baseline() {
        let h = HedonicProfile {
            baseline_valence: 0.25,
            ..HedonicProfile::default()
        };
        assert_eq!(h.mean_recent_valence(), 0.25);
    }

    #[test]
    fn test_meditative_tracks_coherence() {
        let mut m = MeditativeProfile::default();
        for _ in 0..200 {
            m.update_from_coherence(1.0);
        }
        assert!(m.attention_stability > 0.99);
        assert!(m.collapse_risk < 0.01);
        assert!((m.pleasantness_gain - 1.0 - m.attention_stability).abs() < 1e-12);
        assert!(m.equanimity > 0.9);
    }

    #[test]
    fn test_meditative_single_step() {
        let mut m = MeditativeProfile::default();
        m.update_from_coherence(0.0);
        assert!((m.attention_stability - 0.45).abs() < 1e-12);
        assert!((m.collapse_risk - 0.55).abs() < 1e-12);
        assert!((m.equanimity - 0.495).abs() < 1e-12);
    }
}
