// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Preset Integration
// ─────────────────────────────────────────────────────────────────────
//! Turning a preset into the parameters the field pipeline consumes.

use serde::{Deserialize, Serialize};

use psyfi_core::DeterministicRuntime;
use psyfi_types::PsyfiResult;

use crate::params::{ParamKind, ParamMap};
use crate::preset::{OscillationStyle, SubstancePreset};
use crate::registry::PresetRegistry;
use crate::safety::SafetyClamp;

/// Phenomenological modulation factors derived from receptor affinities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceptorParamMap {
    pub ht2a_to_phase_noise: f64,
    pub ht2a_to_symmetry: f64,
    pub ht2a_to_pattern_complexity: f64,
    pub ht1a_to_valence: f64,
    pub ht1a_to_ego_dissolution: f64,
    pub nmda_to_dissociation: f64,
    pub nmda_to_depth_distortion: f64,
    pub sigma1_to_depth_distortion: f64,
    pub dopamine_to_arousal: f64,
    pub dopamine_to_focus: f64,
    pub serotonin_to_empathy: f64,
    pub serotonin_to_valence: f64,
    pub norepinephrine_to_arousal: f64,
    pub gaba_to_calming: f64,
    pub acetylcholine_to_delirium: f64,
    pub acetylcholine_to_dysphoria: f64,
}

/// `1 − affinity` for antagonist-style receptors, 0 when unbound.
fn antagonism(affinity: f64) -> f64 {
    if affinity > 0.0 {
        1.0 - affinity
    } else {
        0.0
    }
}

pub fn receptor_to_param_map(preset: &SubstancePreset) -> ReceptorParamMap {
    let m = &preset.mechanism;
    let dissociation = antagonism(m.nmda);
    let delirium = antagonism(m.acetylcholine);
    ReceptorParamMap {
        ht2a_to_phase_noise: m.ht2a * 0.50,
        ht2a_to_symmetry: m.ht2a * 0.95,
        ht2a_to_pattern_complexity: m.ht2a * 0.90,
        ht1a_to_valence: m.ht1a * 0.70,
        ht1a_to_ego_dissolution: m.ht1a * 0.60,
        nmda_to_dissociation: dissociation,
        nmda_to_depth_distortion: dissociation * 0.85,
        sigma1_to_depth_distortion: m.sigma1 * 0.75,
        dopamine_to_arousal: m.dopamine * 0.80,
        dopamine_to_focus: m.dopamine * 0.70,
        serotonin_to_empathy: m.serotonin * 0.85,
        serotonin_to_valence: m.serotonin * 0.60,
        norepinephrine_to_arousal: m.norepinephrine * 0.75,
        gaba_to_calming: m.gaba * 0.60,
        acetylcholine_to_delirium: delirium,
        acetylcholine_to_dysphoria: delirium * 0.80,
    }
}

/// Preset `(P, V)` clamped to the safety bounds.
pub fn normalization_update(preset: &SubstancePreset) -> (f64, f64) {
    let n = preset.dynamics.normalization;
    (
        SafetyClamp.clamp(ParamKind::NormalizationP, n.p),
        SafetyClamp.clamp(ParamKind::NormalizationV, n.v),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualConfig {
    pub tracer_length: f64,
    pub tracer_color: String,
    pub oscillation_style: OscillationStyle,
    pub symmetry_bias: f64,
    pub depth_distortion: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionalConfig {
    pub valence_bias: f64,
    pub arousal_level: f64,
    pub empathy_gain: f64,
    pub ego_softening: f64,
}

/// Complete engine-facing configuration for one preset at one intensity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDynamicsConfig {
    pub normalization_p: f64,
    pub normalization_v: f64,
    pub phase_noise: f64,
    pub phase_reset_strength: f64,
    pub drift_amplitude: f64,
    pub drift_velocity: f64,
    pub coupling_strength: f64,
    pub visual: VisualConfig,
    pub emotional: EmotionalConfig,
}

pub fn field_dynamics_config(
    preset: &SubstancePreset,
    intensity: f64,
    clamp: bool,
) -> FieldDynamicsConfig {
    let intensity = if clamp {
        SafetyClamp.clamp_intensity(intensity)
    } else {
        intensity
    };
    let d = &preset.dynamics;
    let scaled = |kind: ParamKind, raw: f64| {
        let v = raw * intensity;
        match (clamp, kind.preset_ceiling()) {
            (true, Some(_)) => SafetyClamp.clamp(kind, v),
            _ => v,
        }
    };
    let vis = &preset.visual_signature;
    let emo = &preset.emotional_signature;
    FieldDynamicsConfig {
        normalization_p: d.normalization.p,
        normalization_v: d.normalization.v,
        phase_noise: scaled(ParamKind::PhaseNoise, d.phase_noise),
        phase_reset_strength: scaled(ParamKind::PhaseResetStrength, d.phase_reset_strength),
        drift_amplitude: scaled(ParamKind::DriftAmplitude, d.drift_amplitude),
        drift_velocity: scaled(ParamKind::DriftVelocity, d.drift_velocity),
        coupling_strength: d.coupling_strength,
        visual: VisualConfig {
            tracer_length: vis.tracers_length,
            tracer_color: vis.tracers_color.clone(),
            oscillation_style: vis.oscillation_style,
            symmetry_bias: vis.symmetry_bias,
            depth_distortion: vis.depth_distortion,
        },
        emotional: EmotionalConfig {
            valence_bias: SafetyClamp.clamp(ParamKind::ValenceBias, emo.valence_bias),
            arousal_level: emo.arousal_level,
            empathy_gain: emo.empathy_gain,
            ego_softening: emo.ego_boundary_softening,
        },
    }
}

/// Look up `name`, overlay it on `base` (baseline when `None`) and, with
/// `clamp`, enforce the safety table on the result.
///
/// Records `preset` and `intensity` into the runtime's provenance.
pub fn apply_preset(
    registry: &PresetRegistry,
    name: &str,
    base: Option<&ParamMap>,
    intensity: f64,
    clamp: bool,
    runtime: Option<&mut DeterministicRuntime>,
) -> PsyfiResult<ParamMap> {
    let preset = registry.get(name)?;
    let intensity = if clamp {
        SafetyClamp.clamp_intensity(intensity)
    } else {
        intensity
    };
    let baseline;
    let base = match base {
        Some(b) => b,
        None => {
            baseline = ParamMap::baseline();
            &baseline
        }
    };

    let mut params = preset.apply_to_params(base, intensity, clamp);
    if clamp {
        params = SafetyClamp.enforce(&params);
    }

    log::info!("apply_preset: '{}' at intensity {intensity:.2}", preset.name);
    if let Some(rt) = runtime {
        rt.add_module("preset");
        rt.add_parameter("preset", preset.name.as_str());
        rt.add_parameter("intensity", intensity);
    }
    Ok(params)
}
