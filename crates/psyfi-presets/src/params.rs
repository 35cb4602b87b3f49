// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Parameter Kinds
// ─────────────────────────────────────────────────────────────────────
//! Closed set of tunable simulation parameters.
//!
//! Every kind carries its own safety bounds, an optional tighter ceiling
//! used when a preset is applied, and whether it scales with intensity.
//! Adding a kind forces every `match` below to handle it.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use psyfi_types::{clamp_score, PsyfiError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ParamKind {
    #[serde(rename = "normalization_P")]
    NormalizationP,
    #[serde(rename = "normalization_V")]
    NormalizationV,
    #[serde(rename = "phase_noise")]
    PhaseNoise,
    #[serde(rename = "phase_reset_strength")]
    PhaseResetStrength,
    #[serde(rename = "drift_amplitude")]
    DriftAmplitude,
    #[serde(rename = "drift_velocity")]
    DriftVelocity,
    #[serde(rename = "coupling_strength")]
    CouplingStrength,
    #[serde(rename = "symmetry_bias")]
    SymmetryBias,
    #[serde(rename = "depth_distortion")]
    DepthDistortion,
    #[serde(rename = "valence_bias")]
    ValenceBias,
    #[serde(rename = "arousal_level")]
    ArousalLevel,
}

impl ParamKind {
    pub const ALL: [ParamKind; 11] = [
        ParamKind::NormalizationP,
        ParamKind::NormalizationV,
        ParamKind::PhaseNoise,
        ParamKind::PhaseResetStrength,
        ParamKind::DriftAmplitude,
        ParamKind::DriftVelocity,
        ParamKind::CouplingStrength,
        ParamKind::SymmetryBias,
        ParamKind::DepthDistortion,
        ParamKind::ValenceBias,
        ParamKind::ArousalLevel,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ParamKind::NormalizationP => "normalization_P",
            ParamKind::NormalizationV => "normalization_V",
            ParamKind::PhaseNoise => "phase_noise",
            ParamKind::PhaseResetStrength => "phase_reset_strength",
            ParamKind::DriftAmplitude => "drift_amplitude",
            ParamKind::DriftVelocity => "drift_velocity",
            ParamKind::CouplingStrength => "coupling_strength",
            ParamKind::SymmetryBias => "symmetry_bias",
            ParamKind::DepthDistortion => "depth_distortion",
            ParamKind::ValenceBias => "valence_bias",
            ParamKind::ArousalLevel => "arousal_level",
        }
    }

    /// Safety bounds `(lo, hi)` enforced by [`crate::SafetyClamp`].
    pub fn bounds(self) -> (f64, f64) {
        match self {
            ParamKind::NormalizationP => (1.0, 3.0),
            ParamKind::NormalizationV => (0.0, 1.0),
            ParamKind::PhaseNoise => (0.0, 0.95),
            ParamKind::PhaseResetStrength => (0.0, 0.98),
            ParamKind::DriftAmplitude => (0.0, 0.98),
            ParamKind::DriftVelocity => (0.0, 0.95),
            ParamKind::CouplingStrength => (0.0, 2.0),
            ParamKind::SymmetryBias | ParamKind::DepthDistortion => (0.0, 1.0),
            ParamKind::ValenceBias => (-0.95, 1.0),
            ParamKind::ArousalLevel => (-1.0, 1.0),
        }
    }

    /// Upper cap applied by `apply_to_params` when clamping is on.
    pub fn preset_ceiling(self) -> Option<f64> {
        match self {
            ParamKind::PhaseNoise => Some(0.95),
            ParamKind::DriftAmplitude => Some(0.98),
            ParamKind::DriftVelocity => Some(0.95),
            _ => None,
        }
    }

    pub fn scales_with_intensity(self) -> bool {
        matches!(
            self,
            ParamKind::PhaseNoise
                | ParamKind::PhaseResetStrength
                | ParamKind::DriftAmplitude
                | ParamKind::DriftVelocity
        )
    }

    /// Map a control value in `[0, 1]` linearly onto [`Self::bounds`].
    /// Out-of-range input is clamped first.
    pub fn from_unit(self, value: f64) -> f64 {
        let (lo, hi) = self.bounds();
        lo + clamp_score(value, 0.0, 1.0) * (hi - lo)
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParamKind {
    type Err = PsyfiError;

    /// Exact name first, then a case-insensitive match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParamKind::ALL
            .iter()
            .find(|k| k.name() == s)
            .or_else(|| ParamKind::ALL.iter().find(|k| k.name().eq_ignore_ascii_case(s)))
            .copied()
            .ok_or_else(|| PsyfiError::Configuration(format!("unknown parameter '{s}'")))
    }
}

/// Ordered parameter values keyed by kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamMap(BTreeMap<ParamKind, f64>);

impl ParamMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sober starting point: P 2.0, V 0.5, coupling 0.3, dynamics off.
    pub fn baseline() -> Self {
        [
            (ParamKind::NormalizationP, 2.0),
            (ParamKind::NormalizationV, 0.5),
            (ParamKind::PhaseNoise, 0.0),
            (ParamKind::PhaseResetStrength, 0.0),
            (ParamKind::DriftAmplitude, 0.0),
            (ParamKind::DriftVelocity, 0.0),
            (ParamKind::CouplingStrength, 0.3),
        ]
        .into_iter()
        .collect()
    }

    pub fn get(&self, kind: ParamKind) -> Option<f64> {
        self.0.get(&kind).copied()
    }

    pub fn get_or(&self, kind: ParamKind, default: f64) -> f64 {
        self.get(kind).unwrap_or(default)
    }

    pub fn set(&mut self, kind: ParamKind, value: f64) {
        self.0.insert(kind, value);
    }

    pub fn contains(&self, kind: ParamKind) -> bool {
        self.0.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParamKind, f64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    /// Values keyed by parameter name.
    pub fn to_named(&self) -> BTreeMap<String, f64> {
        self.iter().map(|(k, v)| (k.name().to_string(), v)).collect()
    }
}

impl FromIterator<(ParamKind, f64)> for ParamMap {
    fn from_iter<I: IntoIterator<Item = (ParamKind, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for kind in ParamKind::ALL {
            assert_eq!(kind.name().parse::<ParamKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("NORMALIZATION_p".parse::<ParamKind>().unwrap(), ParamKind::NormalizationP);
        assert_eq!("Drift_Velocity".parse::<ParamKind>().unwrap(), ParamKind::DriftVelocity);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "warp_factor".parse::<ParamKind>().unwrap_err();
        assert!(matches!(err, PsyfiError::Configuration(_)));
    }

    #[test]
    fn test_from_unit_maps_bounds() {
        assert_eq!(ParamKind::NormalizationP.from_unit(0.0), 1.0);
        assert_eq!(ParamKind::NormalizationP.from_unit(1.0), 3.0);
        assert_eq!(ParamKind::ValenceBias.from_unit(0.0), -0.95);
        assert_eq!(ParamKind::CouplingStrength.from_unit(0.5), 1.0);
        assert_eq!(ParamKind::PhaseNoise.from_unit(7.0), 0.95);
        assert_eq!(ParamKind::PhaseNoise.from_unit(f64::NAN), 0.0);
    }

    #[test]
    fn test_intensity_scaling_set() {
        let scaled: Vec<_> = ParamKind::ALL
            .into_iter()
            .filter(|k| k.scales_with_intensity())
            .collect();
        assert_eq!(scaled.len(), 4);
        assert!(!ParamKind::CouplingStrength.scales_with_intensity());
        assert!(!ParamKind::NormalizationP.scales_with_intensity());
    }

    #[test]
    fn test_ceiling_within_bounds() {
        for kind in ParamKind::ALL {
            if let Some(c) = kind.preset_ceiling() {
                assert!(c <= kind.bounds().1);
            }
        }
    }

    #[test]
    fn test_baseline_map() {
        let p = ParamMap::baseline();
        assert_eq!(p.len(), 7);
        assert_eq!(p.get(ParamKind::NormalizationP), Some(2.0));
        assert_eq!(p.get(ParamKind::CouplingStrength), Some(0.3));
        assert_eq!(p.get(ParamKind::ValenceBias), None);
    }

    #[test]
    fn test_param_map_json_uses_names() {
        let mut p = ParamMap::new();
        p.set(ParamKind::NormalizationP, 2.5);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"{"normalization_P":2.5}"#);
        let back: ParamMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
