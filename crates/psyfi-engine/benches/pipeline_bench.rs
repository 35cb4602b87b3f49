// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Pipeline Benchmarks
// ─────────────────────────────────────────────────────────────────────
//! Criterion benchmarks for the evolution kernel, the spectral path and
//! a full preset-driven run.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use psyfi_core::DeterministicRuntime;
use psyfi_engine::{random_field, simulate, Pipeline, SimulationRequest};
use psyfi_metrics::{assess_field, SpectralAnalyzer};
use psyfi_presets::{ParamMap, PresetRegistry};
use psyfi_types::PsyfiConfig;

// ── Kuramoto evolution ──────────────────────────────────────────────

fn bench_evolve_64(c: &mut Criterion) {
    let mut rt = DeterministicRuntime::default();
    let field = random_field(64, 64, &mut rt).unwrap();
    let pipeline = Pipeline::standard(10);
    c.bench_function("pipeline_standard_64x64_10steps", |b| {
        b.iter(|| {
            let mut rt = DeterministicRuntime::default();
            pipeline.run(black_box(&field), None, &mut rt).unwrap()
        })
    });
}

fn bench_from_params_64(c: &mut Criterion) {
    let mut rt = DeterministicRuntime::default();
    let field = random_field(64, 64, &mut rt).unwrap();
    let pipeline = Pipeline::from_params(&ParamMap::baseline(), 10);
    c.bench_function("pipeline_baseline_params_64x64", |b| {
        b.iter(|| {
            let mut rt = DeterministicRuntime::default();
            pipeline.run(black_box(&field), None, &mut rt).unwrap()
        })
    });
}

// ── Spectral + scoring ──────────────────────────────────────────────

fn bench_spectrum_64(c: &mut Criterion) {
    let mut rt = DeterministicRuntime::default();
    let field = random_field(64, 64, &mut rt).unwrap();
    let mut analyzer = SpectralAnalyzer::for_field(&field);
    c.bench_function("magnitude_spectrum_64x64", |b| {
        b.iter(|| analyzer.magnitude_spectrum(black_box(&field)))
    });
}

fn bench_spectrum_non_pow2(c: &mut Criterion) {
    let mut rt = DeterministicRuntime::default();
    let field = random_field(48, 48, &mut rt).unwrap();
    let mut analyzer = SpectralAnalyzer::for_field(&field);
    c.bench_function("magnitude_spectrum_48x48", |b| {
        b.iter(|| analyzer.magnitude_spectrum(black_box(&field)))
    });
}

fn bench_assess_64(c: &mut Criterion) {
    let mut rt = DeterministicRuntime::default();
    let field = random_field(64, 64, &mut rt).unwrap();
    c.bench_function("assess_field_64x64", |b| {
        b.iter(|| assess_field(black_box(&field)))
    });
}

// ── Full run ────────────────────────────────────────────────────────

fn bench_simulate_preset(c: &mut Criterion) {
    let registry = PresetRegistry::builtin().unwrap();
    let cfg = PsyfiConfig::default();
    let request = SimulationRequest {
        width: 32,
        height: 32,
        steps: 10,
        preset: Some("lsd".into()),
        intensity: 0.7,
        ..SimulationRequest::default()
    };
    c.bench_function("simulate_lsd_32x32", |b| {
        b.iter(|| simulate(&cfg, black_box(&request), Some(&registry)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_evolve_64,
    bench_from_params_64,
    bench_spectrum_64,
    bench_spectrum_non_pow2,
    bench_assess_64,
    bench_simulate_preset,
);
criterion_main!(benches);
