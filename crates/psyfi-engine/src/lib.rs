// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Engine
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Pipeline composition, simulation runs and the live control boundary.
//!
//! # Engine Invariants
//!
//! - One runtime per pipeline run. Parallel runs each take a
//!   [`DeterministicRuntime::fork`](psyfi_core::DeterministicRuntime::fork).
//! - Same seed, same request: same field digest and same provenance.
//! - Live control never mutates a running pipeline; parameters are read
//!   from one snapshot per invocation.

pub mod control;
pub mod pipeline;
pub mod simulate;

pub use control::{
    ControlBus, ControlEvent, ControlHandle, LiveSnapshot, LogSink, MetricsSink, MetricsSnapshot,
    PresetRequest,
};
pub use pipeline::{Pipeline, Stage};
pub use simulate::{random_field, simulate, SimulationReport, SimulationRequest};
