// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Presets
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Substance presets, the parameter vocabulary and its safety clamp.
//!
//! # Safety Invariants
//!
//! - `SafetyClamp::enforce` is idempotent and never adds parameters.
//! - Applying a preset at intensity 0 zeroes every intensity-scaled
//!   parameter and leaves coupling and normalisation untouched.
//! - An unknown preset name is a configuration error, never a silent
//!   fallback to baseline.

pub mod integration;
pub mod params;
pub mod preset;
pub mod registry;
pub mod safety;

pub use integration::{
    apply_preset, field_dynamics_config, normalization_update, receptor_to_param_map,
    EmotionalConfig, FieldDynamicsConfig, ReceptorParamMap, VisualConfig,
};
pub use params::{ParamKind, ParamMap};
pub use preset::{
    EmotionalSignature, FieldDynamics, OscillationStyle, PhaseInfo, PresetNormalization,
    ReceptorMechanism, StatePhases, SubstanceClass, SubstancePreset, VisualSignature,
};
pub use registry::{PresetRegistry, BUILTIN_PRESETS};
pub use safety::SafetyClamp;
