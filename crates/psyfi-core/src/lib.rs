// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Core Substrate
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Field representation and deterministic runtime.
//!
//! # Determinism Invariants
//!
//! 1. **One stream per run**: every random draw comes from the
//!    `DeterministicRuntime` that owns the run. Nothing in the kernel
//!    touches a thread-local or OS RNG once the seed is resolved.
//!
//! 2. **Fields are values**: no transform mutates its input. A failing
//!    transform returns an error and the caller still holds the original.
//!
//! 3. **Forks never share counters**: `fork()` clones the provenance
//!    ledger but starts fresh metrics and a fresh stream from the same seed,
//!    so parallel pipelines cannot interleave state.

pub mod field;
pub mod metrics;
pub mod ndimage;
pub mod provenance;
pub mod runtime;

pub use field::{ColorMode, Field, FieldMetadata};
pub use metrics::RunMetrics;
pub use provenance::ProvenanceRecord;
pub use runtime::{DeterministicRuntime, DEFAULT_SEED};

pub use num_complex::Complex64;
