// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Metrics
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Spectral analysis and scoring of complex fields.
//!
//! # Scoring Invariants
//!
//! - Metric functions read a [`psyfi_core::Field`] and never modify it.
//! - Component scores are clamped at construction, so NaN never escapes.
//! - Combined valence uses the span mapping of
//!   [`psyfi_types::normalize_valence`]; its boundary law holds exactly.

pub mod assessment;
pub mod ethics;
pub mod geometry;
pub mod pathology;
pub mod profiles;
pub mod spectral;
pub mod valence;

pub use assessment::{assess_field, assess_field_with_modes, FieldAssessment};
pub use ethics::{assess_ethics, bliss_potential};
pub use geometry::{compute_simplicity_metrics, SimplicityMetrics};
pub use pathology::{compute_negative_valence_signature, signature_with_spectrum};
pub use profiles::{HedonicProfile, MeditativeProfile, ParamSnapshot};
pub use spectral::{fftshift, spectral_spikiness, SpectralAnalyzer, DEFAULT_NUM_MODES};
pub use valence::{compute_valence_metrics, coherence, richness, roughness, symmetry};
