// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Kuramoto Lattice Integrator
// ─────────────────────────────────────────────────────────────────────
//! Explicit Euler integrator for the lattice Kuramoto equation:
//!
//!   dθ_ij/dt = ω_ij + K · C_ij(θ)
//!
//! `C_ij` is the mean of `sin(θ_nb − θ_ij)` over the four toroidal
//! neighbours, optionally weighted by neighbour magnitude. Natural
//! frequency per cell:
//!
//!   ω_ij = base + depth · (i / height) + brightness · (m_ij / max m)
//!
//! Frequencies and neighbour weights are computed once per run; the step
//! loop only reads them.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use psyfi_core::{Complex64, DeterministicRuntime, Field};
use psyfi_types::{PsyfiError, PsyfiResult};

use crate::params::{CouplingType, KuramotoParams};

const EPS: f64 = 1e-8;

/// Phase state of a lattice between steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseLattice {
    pub width: usize,
    pub height: usize,
    /// Unwrapped phases, row-major.
    pub theta: Vec<f64>,
    pub t: f64,
    /// Order parameter R ∈ [0, 1].
    pub r_global: f64,
    pub step_count: u64,
}

impl PhaseLattice {
    pub fn new(width: usize, height: usize, theta: Vec<f64>) -> PsyfiResult<Self> {
        if theta.len() != width * height {
            return Err(PsyfiError::Validation(format!(
                "phase buffer of {} doesn't match {height}x{width} lattice",
                theta.len()
            )));
        }
        let r_global = order_parameter(&theta);
        Ok(Self {
            width,
            height,
            theta,
            t: 0.0,
            r_global,
            step_count: 0,
        })
    }

    /// Phases wrapped into `(-π, π]` via `arg(e^{iθ})`.
    pub fn wrapped(&self) -> Vec<f64> {
        self.theta.iter().map(|&th| wrap_phase(th)).collect()
    }
}

#[inline]
fn wrap_phase(theta: f64) -> f64 {
    let w = theta.sin().atan2(theta.cos());
    // atan2 may return -π for an input on the cut; the range is (-π, π].
    if w <= -PI {
        PI
    } else {
        w
    }
}

/// Kuramoto order parameter `|mean(e^{iθ})|`, clamped to [0, 1].
pub fn order_parameter(phases: &[f64]) -> f64 {
    if phases.is_empty() {
        return 0.0;
    }
    let n = phases.len() as f64;
    let (s, c) = phases
        .iter()
        .fold((0.0, 0.0), |(s, c), &th| (s + th.sin(), c + th.cos()));
    ((s / n).powi(2) + (c / n).powi(2)).sqrt().clamp(0.0, 1.0)
}

/// Per-cell natural frequency map.
pub fn natural_frequencies(
    magnitudes: &[f64],
    width: usize,
    height: usize,
    params: &KuramotoParams,
) -> Vec<f64> {
    let max_mag = magnitudes.iter().copied().fold(0.0, f64::max);
    let mut omega = Vec::with_capacity(width * height);
    for r in 0..height {
        let depth = r as f64 / height as f64;
        for c in 0..width {
            let brightness = magnitudes[r * width + c] / (max_mag + EPS);
            omega.push(
                params.natural_freq_base
                    + params.freq_depth_scale * depth
                    + params.freq_brightness_scale * brightness,
            );
        }
    }
    omega
}

/// Toroidal neighbour indices `[up, down, left, right]` of every cell.
fn neighbour_table(width: usize, height: usize) -> Vec<[usize; 4]> {
    let mut table = Vec::with_capacity(width * height);
    for r in 0..height {
        let up = (r + height - 1) % height;
        let down = (r + 1) % height;
        for c in 0..width {
            let left = (c + width - 1) % width;
            let right = (c + 1) % width;
            table.push([
                up * width + c,
                down * width + c,
                r * width + left,
                r * width + right,
            ]);
        }
    }
    table
}

/// Single-step integrator bound to one field's magnitudes and parameters.
pub struct FieldStepper {
    width: usize,
    height: usize,
    omega: Vec<f64>,
    neighbours: Vec<[usize; 4]>,
    /// `None` for symmetric coupling.
    weights: Option<Vec<[f64; 4]>>,
    coupling_strength: f64,
    dt: f64,
    dtheta: Vec<f64>,
}

impl FieldStepper {
    pub fn new(
        magnitudes: &[f64],
        width: usize,
        height: usize,
        params: &KuramotoParams,
    ) -> PsyfiResult<Self> {
        params.validate()?;
        if magnitudes.len() != width * height {
            return Err(PsyfiError::Validation(format!(
                "magnitude buffer of {} doesn't match {height}x{width} lattice",
                magnitudes.len()
            )));
        }
        let neighbours = neighbour_table(width, height);
        let weights = match params.coupling_type {
            CouplingType::Symmetric => None,
            CouplingType::Asymmetric => Some(
                neighbours
                    .iter()
                    .map(|nb| {
                        let m = nb.map(|j| magnitudes[j]);
                        let total = m.iter().sum::<f64>() + EPS;
                        m.map(|v| v / total)
                    })
                    .collect(),
            ),
        };
        Ok(Self {
            width,
            height,
            omega: natural_frequencies(magnitudes, width, height, params),
            neighbours,
            weights,
            coupling_strength: params.coupling_strength,
            dt: params.dt,
            dtheta: vec![0.0; width * height],
        })
    }

    /// Advance by one `dt`.
    pub fn step(&mut self, state: &PhaseLattice) -> PsyfiResult<PhaseLattice> {
        if state.width != self.width || state.height != self.height {
            return Err(PsyfiError::Validation(format!(
                "lattice {}x{} doesn't match stepper {}x{}",
                state.height, state.width, self.height, self.width
            )));
        }
        let theta = &state.theta;
        if theta.iter().any(|th| !th.is_finite()) {
            return Err(PsyfiError::Numerical(
                "input phases contain NaN or Inf".to_string(),
            ));
        }

        for (i, nb) in self.neighbours.iter().enumerate() {
            let own = theta[i];
            let coupling = match &self.weights {
                None => nb.iter().map(|&j| (theta[j] - own).sin()).sum::<f64>() / 4.0,
                Some(w) => nb
                    .iter()
                    .zip(w[i].iter())
                    .map(|(&j, &wj)| wj * (theta[j] - own).sin())
                    .sum::<f64>(),
            };
            self.dtheta[i] = self.omega[i] + self.coupling_strength * coupling;
        }

        let theta_new: Vec<f64> = theta
            .iter()
            .zip(self.dtheta.iter())
            .map(|(th, d)| th + self.dt * d)
            .collect();
        let r_global = order_parameter(&theta_new);
        Ok(PhaseLattice {
            width: self.width,
            height: self.height,
            theta: theta_new,
            t: state.t + self.dt,
            r_global,
            step_count: state.step_count + 1,
        })
    }

    pub fn run(&mut self, initial: &PhaseLattice, n_steps: u64) -> PsyfiResult<PhaseLattice> {
        let mut state = initial.clone();
        for _ in 0..n_steps {
            state = self.step(&state)?;
        }
        Ok(state)
    }
}

/// Evolve a field's phases for `params.steps` steps.
///
/// Magnitudes are carried through unchanged. With a runtime, each step
/// bumps `compute_steps` and the run is recorded in provenance.
pub fn evolve_field(
    field: &Field,
    params: &KuramotoParams,
    runtime: Option<&mut DeterministicRuntime>,
) -> PsyfiResult<Field> {
    let (width, height) = (field.width(), field.height());
    let (magnitudes, phases) = field.to_polar();
    log::debug!(
        "evolve_field: {height}x{width} {:?} K={} steps={} dt={}",
        params.coupling_type,
        params.coupling_strength,
        params.steps,
        params.dt
    );

    let mut stepper = FieldStepper::new(&magnitudes, width, height, params)?;
    let initial = PhaseLattice::new(width, height, phases)?;
    let evolved = stepper.run(&initial, u64::from(params.steps))?;

    let data: Vec<Complex64> = magnitudes
        .iter()
        .zip(evolved.wrapped())
        .map(|(&m, th)| Complex64::from_polar(m, th))
        .collect();
    let out = field.copy_with_data(data)?;

    if let Some(rt) = runtime {
        rt.increment_steps(u64::from(params.steps));
        rt.add_module("kuramoto");
        rt.add_parameter("coupling_strength", params.coupling_strength);
        rt.add_parameter("steps", params.steps);
    }
    Ok(out)
}
