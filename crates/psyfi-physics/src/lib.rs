// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Evolution Kernel
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Kuramoto-style phase coupling on a toroidal 4-neighbour lattice.
//!
//! # Kernel Invariants
//!
//! 1. **Magnitude is frozen**: only phase evolves. `|z|` of every cell
//!    leaves the kernel equal to its input up to rounding.
//!
//! 2. **No randomness**: the kernel never draws from the runtime. Two runs
//!    with the same field and parameters agree under any seed.
//!
//! 3. **Wrapped output**: phases leave the kernel in `(-π, π]`.

pub mod kuramoto;
pub mod params;

pub use kuramoto::{
    evolve_field, natural_frequencies, order_parameter, FieldStepper, PhaseLattice,
};
pub use params::{CouplingType, KuramotoParams};
