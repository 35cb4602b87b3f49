// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Substance Presets
// ─────────────────────────────────────────────────────────────────────
//! Parsed preset records. Field names follow the preset store's JSON
//! keys; `validate` enforces the documented ranges after parsing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use psyfi_types::{clamp_score, PsyfiError, PsyfiResult};

use crate::params::{ParamKind, ParamMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstanceClass {
    ClassicPsychedelic,
    Empathogen,
    Dissociative,
    Deliriant,
    Stimulant,
    Baseline,
    Meditative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OscillationStyle {
    Smooth,
    Geometric,
    Organic,
    Crystalline,
    Fractal,
    Minimal,
}

/// Receptor binding affinities, each in `[0, 1]`. Missing keys are 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceptorMechanism {
    #[serde(rename = "5ht2a", alias = "ht2a_5")]
    pub ht2a: f64,
    #[serde(rename = "5ht1a", alias = "ht1a_5")]
    pub ht1a: f64,
    pub sigma1: f64,
    pub nmda: f64,
    pub gaba: f64,
    pub dopamine: f64,
    pub serotonin: f64,
    pub norepinephrine: f64,
    pub acetylcholine: f64,
}

impl ReceptorMechanism {
    fn affinities(&self) -> [(&'static str, f64); 9] {
        [
            ("5ht2a", self.ht2a),
            ("5ht1a", self.ht1a),
            ("sigma1", self.sigma1),
            ("nmda", self.nmda),
            ("gaba", self.gaba),
            ("dopamine", self.dopamine),
            ("serotonin", self.serotonin),
            ("norepinephrine", self.norepinephrine),
            ("acetylcholine", self.acetylcholine),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualSignature {
    pub tracers_color: String,
    pub tracers_length: f64,
    pub oscillation_style: OscillationStyle,
    pub symmetry_bias: f64,
    pub depth_distortion: f64,
    pub color_enhancement: f64,
    pub pattern_complexity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionalSignature {
    /// `[-1, 1]`
    pub valence_bias: f64,
    /// `[-1, 1]`
    pub arousal_level: f64,
    pub anxiety_tendency: f64,
    pub empathy_gain: f64,
    pub ego_boundary_softening: f64,
    pub thought_coherence: f64,
}

fn default_multiplier() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseInfo {
    pub duration_minutes: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity_curve: Option<String>,
    #[serde(default = "default_multiplier")]
    pub intensity_multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatePhases {
    pub comeup: PhaseInfo,
    pub peak: PhaseInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plateau: Option<PhaseInfo>,
    pub comedown: PhaseInfo,
}

/// Divisive normalisation block: exponent `P ∈ [0.5, 3]`, surround weight `V ∈ [0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PresetNormalization {
    #[serde(rename = "P", alias = "p")]
    pub p: f64,
    #[serde(rename = "V", alias = "v")]
    pub v: f64,
}

/// Field-dynamics block of a preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDynamics {
    pub normalization: PresetNormalization,
    pub phase_noise: f64,
    pub phase_reset_strength: f64,
    pub drift_amplitude: f64,
    pub drift_velocity: f64,
    /// `[0, 2]`
    pub coupling_strength: f64,
    #[serde(default)]
    pub receptor_modulation_map: BTreeMap<String, f64>,
}

impl FieldDynamics {
    /// Value this block sets for `kind`, if any.
    pub fn value(&self, kind: ParamKind) -> Option<f64> {
        match kind {
            ParamKind::NormalizationP => Some(self.normalization.p),
            ParamKind::NormalizationV => Some(self.normalization.v),
            ParamKind::PhaseNoise => Some(self.phase_noise),
            ParamKind::PhaseResetStrength => Some(self.phase_reset_strength),
            ParamKind::DriftAmplitude => Some(self.drift_amplitude),
            ParamKind::DriftVelocity => Some(self.drift_velocity),
            ParamKind::CouplingStrength => Some(self.coupling_strength),
            ParamKind::SymmetryBias
            | ParamKind::DepthDistortion
            | ParamKind::ValenceBias
            | ParamKind::ArousalLevel => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstancePreset {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(rename = "class")]
    pub substance_class: SubstanceClass,
    pub mechanism: ReceptorMechanism,
    pub visual_signature: VisualSignature,
    pub emotional_signature: EmotionalSignature,
    pub state_phases: StatePhases,
    #[serde(rename = "psyfi_params", alias = "dynamics")]
    pub dynamics: FieldDynamics,
}

fn require_range(preset: &str, field: &str, value: f64, lo: f64, hi: f64) -> PsyfiResult<()> {
    if value.is_finite() && (lo..=hi).contains(&value) {
        Ok(())
    } else {
        Err(PsyfiError::Validation(format!(
            "preset '{preset}': {field} must be in [{lo}, {hi}], got {value}"
        )))
    }
}

impl SubstancePreset {
    pub fn validate(&self) -> PsyfiResult<()> {
        let n = self.name.as_str();
        if n.trim().is_empty() {
            return Err(PsyfiError::Validation("preset name must not be empty".into()));
        }
        for (receptor, affinity) in self.mechanism.affinities() {
            require_range(n, receptor, affinity, 0.0, 1.0)?;
        }

        let vis = &self.visual_signature;
        require_range(n, "tracers_length", vis.tracers_length, 0.0, 1.0)?;
        require_range(n, "symmetry_bias", vis.symmetry_bias, 0.0, 1.0)?;
        require_range(n, "depth_distortion", vis.depth_distortion, 0.0, 1.0)?;
        require_range(n, "color_enhancement", vis.color_enhancement, 0.0, 1.0)?;
        require_range(n, "pattern_complexity", vis.pattern_complexity, 0.0, 1.0)?;

        let emo = &self.emotional_signature;
        require_range(n, "valence_bias", emo.valence_bias, -1.0, 1.0)?;
        require_range(n, "arousal_level", emo.arousal_level, -1.0, 1.0)?;
        require_range(n, "anxiety_tendency", emo.anxiety_tendency, 0.0, 1.0)?;
        require_range(n, "empathy_gain", emo.empathy_gain, 0.0, 1.0)?;
        require_range(n, "ego_boundary_softening", emo.ego_boundary_softening, 0.0, 1.0)?;
        require_range(n, "thought_coherence", emo.thought_coherence, 0.0, 1.0)?;

        let phases = &self.state_phases;
        let named = [
            ("comeup", Some(&phases.comeup)),
            ("peak", Some(&phases.peak)),
            ("plateau", phases.plateau.as_ref()),
            ("comedown", Some(&phases.comedown)),
        ];
        for (label, info) in named {
            if let Some(info) = info {
                require_range(n, label, info.duration_minutes, 0.0, f64::INFINITY)?;
                require_range(n, label, info.intensity_multiplier, 0.0, f64::INFINITY)?;
            }
        }

        let dynamics = &self.dynamics;
        require_range(n, "normalization.P", dynamics.normalization.p, 0.5, 3.0)?;
        require_range(n, "normalization.V", dynamics.normalization.v, 0.0, 1.0)?;
        require_range(n, "phase_noise", dynamics.phase_noise, 0.0, 1.0)?;
        require_range(n, "phase_reset_strength", dynamics.phase_reset_strength, 0.0, 1.0)?;
        require_range(n, "drift_amplitude", dynamics.drift_amplitude, 0.0, 1.0)?;
        require_range(n, "drift_velocity", dynamics.drift_velocity, 0.0, 1.0)?;
        require_range(n, "coupling_strength", dynamics.coupling_strength, 0.0, 2.0)?;
        Ok(())
    }

    /// Sum of all phase durations, plateau included when present.
    pub fn total_duration_minutes(&self) -> f64 {
        let p = &self.state_phases;
        p.comeup.duration_minutes
            + p.peak.duration_minutes
            + p.plateau.as_ref().map_or(0.0, |info| info.duration_minutes)
            + p.comedown.duration_minutes
    }

    /// Overlay this preset's dynamics onto `base`.
    ///
    /// Intensity-scaled kinds are multiplied by `intensity`; the rest are
    /// copied as-is. With `clamp`, intensity is first clamped to `[0, 1]`
    /// and per-kind preset ceilings are applied. Kinds the preset does not
    /// set keep their `base` value.
    pub fn apply_to_params(&self, base: &ParamMap, intensity: f64, clamp: bool) -> ParamMap {
        let intensity = if clamp {
            clamp_score(intensity, 0.0, 1.0)
        } else {
            intensity
        };
        let mut params = base.clone();
        for kind in ParamKind::ALL {
            let Some(raw) = self.dynamics.value(kind) else {
                continue;
            };
            let mut value = if kind.scales_with_intensity() {
                raw * intensity
            } else {
                raw
            };
            if clamp {
                if let Some(ceiling) = kind.preset_ceiling() {
                    value = value.min(ceiling);
                }
            }
            params.set(kind, value);
        }
        params
    }
}
