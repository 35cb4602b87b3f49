// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Pipeline
// ─────────────────────────────────────────────────────────────────────
//! Ordered composition of evolution and transforms under one runtime.
//!
//! A pipeline is plain data: stages run in order, each on the previous
//! stage's output. The first failing stage aborts the run and its error
//! is returned unchanged; the caller's input field is never touched.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use psyfi_core::{DeterministicRuntime, Field};
use psyfi_metrics::richness;
use psyfi_physics::{evolve_field, KuramotoParams};
use psyfi_presets::{ParamKind, ParamMap};
use psyfi_transforms::{
    apply_absorption, apply_attention, apply_context_shift, apply_divisive_normalization,
    apply_drift, apply_echo, apply_feature_enhancement, apply_gestalt_completion, apply_log_polar,
    apply_phase_reset, apply_topological_smoothing, AbsorptionParams, AttentionParams, DriftParams,
    EchoParams, FeatureEnhanceParams, FeatureEnhancer, GestaltParams, NormalizationParams,
    RetinaParams, TopologyParams,
};
use psyfi_types::PsyfiResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    Evolve(KuramotoParams),
    /// Blend with the previous frame. Skipped when there is none.
    Echo(EchoParams),
    Drift {
        t: f64,
        params: DriftParams,
    },
    Enhance(FeatureEnhanceParams),
    LogPolar(RetinaParams),
    Absorption(AbsorptionParams),
    TopologicalSmoothing(TopologyParams),
    Attention(AttentionParams),
    PhaseReset {
        strength: f64,
    },
    DivisiveNormalization(NormalizationParams),
    ContextShift {
        intensity: f64,
    },
    GestaltCompletion(GestaltParams),
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Evolve(_) => "kuramoto",
            Stage::Echo(_) => "echo",
            Stage::Drift { .. } => "drift",
            Stage::Enhance(_) => "feature_enhancement",
            Stage::LogPolar(_) => "log_polar",
            Stage::Absorption(_) => "absorption",
            Stage::TopologicalSmoothing(_) => "topological_smoothing",
            Stage::Attention(_) => "attention",
            Stage::PhaseReset { .. } => "phase_reset",
            Stage::DivisiveNormalization(_) => "divisive_normalization",
            Stage::ContextShift { .. } => "context_shift",
            Stage::GestaltCompletion(_) => "gestalt_completion",
        }
    }

    /// Stages whose transform writes its own provenance entry.
    fn self_recording(&self) -> bool {
        matches!(
            self,
            Stage::Evolve(_) | Stage::PhaseReset { .. } | Stage::ContextShift { .. }
        )
    }

    fn apply(
        &self,
        field: &Field,
        previous: Option<&Field>,
        enhancer: Option<&dyn FeatureEnhancer>,
        runtime: &mut DeterministicRuntime,
    ) -> PsyfiResult<Field> {
        match self {
            Stage::Evolve(p) => evolve_field(field, p, Some(runtime)),
            Stage::Echo(p) => match previous {
                Some(prev) => apply_echo(prev, field, p),
                None => Ok(field.clone()),
            },
            Stage::Drift { t, params } => apply_drift(field, *t, params),
            Stage::Enhance(p) => apply_feature_enhancement(field, p, enhancer),
            Stage::LogPolar(p) => apply_log_polar(field, p),
            Stage::Absorption(p) => apply_absorption(field, p),
            Stage::TopologicalSmoothing(p) => apply_topological_smoothing(field, p),
            Stage::Attention(p) => apply_attention(field, p),
            Stage::PhaseReset { strength } => apply_phase_reset(field, *strength, runtime),
            Stage::DivisiveNormalization(p) => apply_divisive_normalization(field, p),
            Stage::ContextShift { intensity } => {
                apply_context_shift(field, *intensity, Some(runtime))
            }
            Stage::GestaltCompletion(p) => {
                let (out, profile) = apply_gestalt_completion(field, p)?;
                runtime.add_metric("gestalt_strength", profile.gestalt_strength());
                Ok(out)
            }
        }
    }
}

#[derive(Clone, Default)]
pub struct Pipeline {
    stages: Vec<Stage>,
    /// Parameters written to provenance at the start of every run.
    annotations: Vec<(String, f64)>,
    enhancer: Option<Arc<dyn FeatureEnhancer + Send + Sync>>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stages)
            .field("annotations", &self.annotations)
            .field("enhancer", &self.enhancer.is_some())
            .finish()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stages(stages: Vec<Stage>) -> Self {
        Self {
            stages,
            ..Self::default()
        }
    }

    pub fn push(&mut self, stage: Stage) -> &mut Self {
        self.stages.push(stage);
        self
    }

    pub fn annotate(&mut self, key: impl Into<String>, value: f64) -> &mut Self {
        self.annotations.push((key.into(), value));
        self
    }

    /// Backend used by `Enhance` stages in external mode.
    pub fn set_enhancer(&mut self, enhancer: Arc<dyn FeatureEnhancer + Send + Sync>) -> &mut Self {
        self.enhancer = Some(enhancer);
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Evolution followed by divisive normalisation at `P = V = 1`.
    pub fn standard(steps: u32) -> Self {
        Self::with_stages(vec![
            Stage::Evolve(KuramotoParams {
                steps,
                ..KuramotoParams::default()
            }),
            Stage::DivisiveNormalization(NormalizationParams::default()),
        ])
    }

    /// Pipeline driven by a parameter map.
    ///
    /// Evolution uses `coupling_strength`; drift runs for the evolved time
    /// span when its amplitude is positive; phase reset runs when its
    /// strength is positive; normalisation always runs. Every parameter in
    /// the map is annotated, including those with no stage of their own
    /// such as `phase_noise`.
    pub fn from_params(params: &ParamMap, steps: u32) -> Self {
        let kuramoto = KuramotoParams {
            coupling_strength: params
                .get_or(ParamKind::CouplingStrength, KuramotoParams::default().coupling_strength),
            steps,
            ..KuramotoParams::default()
        };
        let elapsed = f64::from(steps) * kuramoto.dt;

        let mut pipeline = Self::new();
        pipeline.push(Stage::Evolve(kuramoto));

        let amplitude = params.get_or(ParamKind::DriftAmplitude, 0.0);
        if amplitude > 0.0 {
            pipeline.push(Stage::Drift {
                t: elapsed,
                params: DriftParams {
                    amplitude,
                    velocity: params.get_or(ParamKind::DriftVelocity, 0.0),
                    ..DriftParams::default()
                },
            });
        }

        let reset = params.get_or(ParamKind::PhaseResetStrength, 0.0);
        if reset > 0.0 {
            pipeline.push(Stage::PhaseReset { strength: reset });
        }

        let norm_default = NormalizationParams::default();
        pipeline.push(Stage::DivisiveNormalization(NormalizationParams {
            p: params.get_or(ParamKind::NormalizationP, norm_default.p),
            v: params.get_or(ParamKind::NormalizationV, norm_default.v),
            ..norm_default
        }));

        for (kind, value) in params.iter() {
            pipeline.annotate(kind.name(), value);
        }
        pipeline
    }

    /// Run every stage in order.
    ///
    /// `previous` is the prior output frame, used by `Echo` stages. The
    /// runtime's grid size and entropy proxy (phase richness of the
    /// output) are updated on success.
    pub fn run(
        &self,
        field: &Field,
        previous: Option<&Field>,
        runtime: &mut DeterministicRuntime,
    ) -> PsyfiResult<Field> {
        runtime.set_grid_size(field.width(), field.height());
        for (key, value) in &self.annotations {
            runtime.add_parameter(key, *value);
        }

        let enhancer = self
            .enhancer
            .as_deref()
            .map(|e| e as &dyn FeatureEnhancer);
        let mut current = field.clone();
        for stage in &self.stages {
            log::trace!("pipeline: stage {}", stage.name());
            current = stage.apply(&current, previous, enhancer, runtime).map_err(|e| {
                log::warn!("pipeline: stage {} failed: {e}", stage.name());
                e
            })?;
            if !stage.self_recording() {
                runtime.add_module(stage.name());
            }
        }

        let entropy = richness(&current);
        runtime.update_entropy(entropy);
        log::debug!(
            "pipeline: {} stages on {}x{} entropy={entropy:.4}",
            self.stages.len(),
            field.width(),
            field.height()
        );
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use psyfi_core::Complex64;
    use psyfi_types::PsyfiError;
    use serde_json::json;

    fn ones(n: usize) -> Field {
        Field::filled(n, n, Complex64::new(1.0, 0.0)).unwrap()
    }

    fn noisy(n: usize, seed: u64) -> Field {
        let mut rt = DeterministicRuntime::new(true, Some(seed));
        let th = rt.uniform(-std::f64::consts::PI, std::f64::consts::PI, n * n);
        let m = rt.uniform(0.5, 1.5, n * n);
        Field::from_polar(n, n, &m, &th).unwrap()
    }

    #[test]
    fn test_standard_pipeline_records_chain() {
        let mut rt = DeterministicRuntime::new(true, Some(3));
        let out = Pipeline::standard(5).run(&noisy(16, 1), None, &mut rt).unwrap();
        assert_eq!(out.shape(), (16, 16));
        assert_eq!(
            rt.provenance().module_chain,
            vec!["kuramoto", "divisive_normalization"]
        );
        assert_eq!(rt.metrics().compute_steps, 5);
        assert_eq!(rt.metrics().grid_size, 256);
        assert!(rt.metrics().entropy_proxy > 0.0);
    }

    #[test]
    fn test_same_seed_same_output() {
        let mut params = ParamMap::baseline();
        params.set(ParamKind::PhaseResetStrength, 0.4);
        params.set(ParamKind::DriftAmplitude, 0.2);
        let pipeline = Pipeline::from_params(&params, 4);
        let input = noisy(12, 9);

        let mut a = DeterministicRuntime::new(true, Some(77));
        let mut b = DeterministicRuntime::new(true, Some(77));
        let fa = pipeline.run(&input, None, &mut a).unwrap();
        let fb = pipeline.run(&input, None, &mut b).unwrap();
        assert!(fa.approx_eq(&fb, 1e-6, 1e-8));
        assert!(a.verify_determinism(fa.digest(), fb.digest()).is_ok());
        assert_eq!(a.provenance(), b.provenance());
    }

    #[test]
    fn test_seed_only_affects_reset() {
        let input = noisy(12, 2);
        let evolve_only = Pipeline::from_params(&ParamMap::baseline(), 6);
        let mut a = DeterministicRuntime::new(true, Some(1));
        let mut b = DeterministicRuntime::new(true, Some(2));
        let fa = evolve_only.run(&input, None, &mut a).unwrap();
        let fb = evolve_only.run(&input, None, &mut b).unwrap();
        assert_eq!(fa.digest(), fb.digest());

        let mut with_reset = ParamMap::baseline();
        with_reset.set(ParamKind::PhaseResetStrength, 0.5);
        let reset = Pipeline::from_params(&with_reset, 6);
        let mut a = DeterministicRuntime::new(true, Some(1));
        let mut b = DeterministicRuntime::new(true, Some(2));
        let fa = reset.run(&input, None, &mut a).unwrap();
        let fb = reset.run(&input, None, &mut b).unwrap();
        assert_ne!(fa.digest(), fb.digest());
    }

    #[test]
    fn test_from_params_stage_selection() {
        let base = Pipeline::from_params(&ParamMap::baseline(), 10);
        let names: Vec<_> = base.stages().iter().map(Stage::name).collect();
        assert_eq!(names, vec!["kuramoto", "divisive_normalization"]);

        let mut p = ParamMap::baseline();
        p.set(ParamKind::DriftAmplitude, 0.3);
        p.set(ParamKind::PhaseResetStrength, 0.2);
        p.set(ParamKind::CouplingStrength, 1.4);
        let full = Pipeline::from_params(&p, 10);
        let names: Vec<_> = full.stages().iter().map(Stage::name).collect();
        assert_eq!(
            names,
            vec!["kuramoto", "drift", "phase_reset", "divisive_normalization"]
        );
        match &full.stages()[0] {
            Stage::Evolve(k) => assert_eq!(k.coupling_strength, 1.4),
            other => panic!("unexpected stage {other:?}"),
        }
    }

    #[test]
    fn test_phase_noise_annotated() {
        let mut p = ParamMap::baseline();
        p.set(ParamKind::PhaseNoise, 0.25);
        let mut rt = DeterministicRuntime::default();
        Pipeline::from_params(&p, 1).run(&ones(8), None, &mut rt).unwrap();
        assert_eq!(rt.provenance().last_parameter("phase_noise"), Some(&json!(0.25)));
    }

    #[test]
    fn test_echo_uses_previous_frame() {
        let mut pipeline = Pipeline::new();
        pipeline.push(Stage::Echo(EchoParams {
            decay: 0.5,
            luminance_bias: 0.0,
        }));
        let cur = ones(4);
        let prev = Field::filled(4, 4, Complex64::new(3.0, 0.0)).unwrap();
        let mut rt = DeterministicRuntime::default();
        let out = pipeline.run(&cur, Some(&prev), &mut rt).unwrap();
        assert!((out.data()[0].re - 2.0).abs() < 1e-12);
        let alone = pipeline.run(&cur, None, &mut rt).unwrap();
        assert_eq!(alone.digest(), cur.digest());
    }

    #[test]
    fn test_failing_stage_propagates() {
        let mut pipeline = Pipeline::standard(2);
        pipeline.push(Stage::Drift {
            t: 0.0,
            params: DriftParams {
                amplitude: -1.0,
                ..DriftParams::default()
            },
        });
        let input = ones(8);
        let before = input.digest();
        let mut rt = DeterministicRuntime::default();
        let err = pipeline.run(&input, None, &mut rt).unwrap_err();
        assert!(matches!(err, PsyfiError::Validation(_)));
        assert_eq!(input.digest(), before);
    }

    #[test]
    fn test_external_enhancer() {
        let mut pipeline = Pipeline::new();
        pipeline.push(Stage::Enhance(FeatureEnhanceParams {
            mode: psyfi_transforms::EnhanceMode::External,
            gain: 1.0,
            opacity: 1.0,
        }));
        pipeline.set_enhancer(Arc::new(|f: &Field| {
            let data = f.data().iter().map(|z| *z * 2.0).collect();
            f.copy_with_data(data)
        }));
        let mut rt = DeterministicRuntime::default();
        let out = pipeline.run(&ones(4), None, &mut rt).unwrap();
        assert!((out.data()[5].re - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_gestalt_metric_recorded() {
        let mut pipeline = Pipeline::new();
        pipeline.push(Stage::GestaltCompletion(GestaltParams::default()));
        let mut rt = DeterministicRuntime::default();
        pipeline.run(&noisy(16, 4), None, &mut rt).unwrap();
        assert!(rt.metrics().extras.contains_key("gestalt_strength"));
        assert_eq!(rt.provenance().module_chain, vec!["gestalt_completion"]);
    }

    #[test]
    fn test_stage_json() {
        let stage: Stage =
            serde_json::from_str(r#"{"stage": "phase_reset", "strength": 0.3}"#).unwrap();
        assert_eq!(stage, Stage::PhaseReset { strength: 0.3 });
        let stage: Stage = serde_json::from_str(
            r#"{"stage": "drift", "t": 1.0, "params": {"amplitude": 0.1, "velocity": 2.0}}"#,
        )
        .unwrap();
        assert_eq!(stage.name(), "drift");
    }
}
