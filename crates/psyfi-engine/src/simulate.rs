// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Simulation Run
// ─────────────────────────────────────────────────────────────────────
//! One complete run: seed a runtime, draw a random field, run a
//! pipeline, score the result.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use psyfi_core::{DeterministicRuntime, Field, ProvenanceRecord, RunMetrics};
use psyfi_metrics::{assess_field, FieldAssessment};
use psyfi_presets::{apply_preset, ParamMap, PresetRegistry, SafetyClamp};
use psyfi_transforms::{compute_binding_segments, BindingParams};
use psyfi_types::{PsyfiConfig, PsyfiError, PsyfiResult};

use crate::pipeline::Pipeline;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationRequest {
    pub width: usize,
    pub height: usize,
    pub steps: u32,
    /// Overrides the configured default seed.
    pub seed: Option<u64>,
    /// Preset name or alias. Requires a registry.
    pub preset: Option<String>,
    /// Default: 1.0.
    pub intensity: f64,
    /// Base parameters. With a preset, the preset is overlaid on these.
    pub params: Option<ParamMap>,
    /// Default: true.
    pub safety_clamp: bool,
    /// Also segment the final field.
    pub binding: Option<BindingParams>,
}

impl Default for SimulationRequest {
    fn default() -> Self {
        Self {
            width: 64,
            height: 64,
            steps: 10,
            seed: None,
            preset: None,
            intensity: 1.0,
            params: None,
            safety_clamp: true,
            binding: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub seed: u64,
    pub field: Field,
    /// Parameters the pipeline was built from; `None` for the standard run.
    pub params: Option<ParamMap>,
    pub assessment: FieldAssessment,
    pub num_segments: Option<usize>,
    pub provenance: ProvenanceRecord,
    pub metrics: RunMetrics,
}

impl SimulationReport {
    /// Digest of the final field.
    pub fn digest(&self) -> u64 {
        self.field.digest()
    }
}

/// Random field: phases `U(-π, π)` drawn first, then magnitudes `U(0.5, 1.5)`.
pub fn random_field(
    width: usize,
    height: usize,
    runtime: &mut DeterministicRuntime,
) -> PsyfiResult<Field> {
    let n = width.saturating_mul(height);
    let phases = runtime.uniform(-PI, PI, n);
    let magnitudes = runtime.uniform(0.5, 1.5, n);
    Field::from_polar(width, height, &magnitudes, &phases)
}

fn resolve_params(
    request: &SimulationRequest,
    registry: Option<&PresetRegistry>,
    runtime: &mut DeterministicRuntime,
) -> PsyfiResult<Option<ParamMap>> {
    match (&request.preset, registry) {
        (Some(name), Some(reg)) => apply_preset(
            reg,
            name,
            request.params.as_ref(),
            request.intensity,
            request.safety_clamp,
            Some(runtime),
        )
        .map(Some),
        (Some(name), None) => Err(PsyfiError::Configuration(format!(
            "preset '{name}' requested without a registry"
        ))),
        (None, _) => Ok(request.params.as_ref().map(|p| {
            if request.safety_clamp {
                SafetyClamp.enforce(p)
            } else {
                p.clone()
            }
        })),
    }
}

pub fn simulate(
    config: &PsyfiConfig,
    request: &SimulationRequest,
    registry: Option<&PresetRegistry>,
) -> PsyfiResult<SimulationReport> {
    config.validate_grid_size(request.width, request.height)?;
    if request.steps == 0 {
        return Err(PsyfiError::Validation("steps must be >= 1".to_string()));
    }

    let mut runtime = DeterministicRuntime::from_config(&config.abx, request.seed);
    log::info!(
        "simulate: {}x{} steps={} seed={} preset={:?}",
        request.width,
        request.height,
        request.steps,
        runtime.seed(),
        request.preset
    );

    let params = resolve_params(request, registry, &mut runtime)?;
    let pipeline = match &params {
        Some(p) => Pipeline::from_params(p, request.steps),
        None => Pipeline::standard(request.steps),
    };

    let initial = random_field(request.width, request.height, &mut runtime)?;
    let field = pipeline.run(&initial, None, &mut runtime)?;
    let assessment = assess_field(&field);

    let num_segments = match &request.binding {
        Some(b) => Some(compute_binding_segments(&field, b)?.num_segments),
        None => None,
    };

    runtime.add_metric("valence", assessment.valence.valence_score);
    runtime.add_metric("suffering_risk", assessment.ethics.suffering_risk);
    runtime.add_metric("risk_score", assessment.ethics.risk_score);

    Ok(SimulationReport {
        seed: runtime.seed(),
        field,
        params,
        assessment,
        num_segments,
        provenance: runtime.provenance().clone(),
        metrics: runtime.metrics().clone(),
    })
}
