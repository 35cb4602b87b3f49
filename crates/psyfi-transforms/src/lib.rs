// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Transform Library
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Stateless field → field transforms.
//!
//! # Transform Invariants
//!
//! 1. **Inputs are never mutated**: every transform borrows its field and
//!    returns a new one of identical shape, or an error with the input
//!    untouched.
//!
//! 2. **Parameters fail early**: each params struct has `validate()`,
//!    called before any cell is touched.
//!
//! 3. **Randomness is explicit**: only [`reset::apply_phase_reset`] draws
//!    from the runtime. Everything else is a pure function of its inputs.
//!
//! Application order is the caller's choice.

pub mod absorption;
pub mod attention;
pub mod binding;
mod bounds;
pub mod context;
pub mod drift;
pub mod echo;
pub mod enhance;
pub mod gestalt;
pub mod normalization;
pub mod receptor;
pub mod reset;
pub mod retina;
pub mod topology;

pub use absorption::{apply_absorption, AbsorptionParams};
pub use attention::{apply_attention, AttentionParams};
pub use binding::{compute_binding_segments, BindingParams, SegmentMap};
pub use context::apply_context_shift;
pub use drift::{apply_drift, DriftParams};
pub use echo::{apply_echo, EchoParams};
pub use enhance::{apply_feature_enhancement, EnhanceMode, FeatureEnhanceParams, FeatureEnhancer};
pub use gestalt::{apply_gestalt_completion, GestaltParams};
pub use normalization::{apply_divisive_normalization, NormalizationParams};
pub use receptor::{modulate_normalization, ReceptorProfile};
pub use reset::apply_phase_reset;
pub use retina::{apply_log_polar, RetinaParams};
pub use topology::{apply_topological_smoothing, TopologyParams};
