// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Type definitions, configuration, and error hierarchy shared by every
//! crate of the PsyFi field kernel.

pub mod config;
pub mod error;
pub mod score;

pub use config::{AbxConfig, PsyfiConfig};
pub use error::{PsyfiError, PsyfiResult};
pub use score::{
    clamp_score, normalize_valence, EthicsAssessment, GestaltProfile, NegativeValenceSignature,
    ResonanceModes, ValenceMetrics, VALENCE_MAX, VALENCE_MIN,
};
