// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Deterministic Runtime
// ─────────────────────────────────────────────────────────────────────
//! Seeded random stream plus the provenance ledger and run counters.
//!
//! Seed resolution: an explicit seed wins; otherwise a deterministic
//! runtime uses [`DEFAULT_SEED`] and a non-deterministic one draws a fresh
//! 32-bit seed. The stream is `ChaCha8Rng`, which is portable across
//! platforms for a given seed.
//!
//! A runtime is sequential state. Parallel pipelines each take their own
//! via [`DeterministicRuntime::fork`].

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::Value;

use psyfi_types::{AbxConfig, PsyfiError, PsyfiResult};

use crate::metrics::RunMetrics;
use crate::provenance::ProvenanceRecord;

pub const DEFAULT_SEED: u64 = 1337;

#[derive(Debug, Clone)]
pub struct DeterministicRuntime {
    deterministic: bool,
    seed: u64,
    rng: ChaCha8Rng,
    provenance: ProvenanceRecord,
    metrics: RunMetrics,
    track_provenance: bool,
    track_metrics: bool,
}

impl DeterministicRuntime {
    pub fn new(deterministic: bool, seed: Option<u64>) -> Self {
        Self::build(deterministic, seed, DEFAULT_SEED, true, true)
    }

    /// Runtime configured from `abx`, with an optional explicit seed.
    pub fn from_config(abx: &AbxConfig, seed: Option<u64>) -> Self {
        Self::build(
            abx.deterministic,
            seed,
            abx.default_seed,
            abx.track_provenance,
            abx.track_metrics,
        )
    }

    fn build(
        deterministic: bool,
        seed: Option<u64>,
        default_seed: u64,
        track_provenance: bool,
        track_metrics: bool,
    ) -> Self {
        let seed = match seed {
            Some(s) => s,
            None if deterministic => default_seed,
            None => u64::from(rand::random::<u32>()),
        };
        let mut provenance = ProvenanceRecord::new(seed);
        if track_provenance {
            provenance.add_meta("deterministic", deterministic);
        }
        log::debug!("DeterministicRuntime: seed={seed} deterministic={deterministic}");
        Self {
            deterministic,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            provenance,
            metrics: RunMetrics::default(),
            track_provenance,
            track_metrics,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn is_deterministic(&self) -> bool {
        self.deterministic
    }

    pub fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    /// `n` draws from `U[lo, hi)`, in stream order.
    pub fn uniform(&mut self, lo: f64, hi: f64, n: usize) -> Vec<f64> {
        let span = hi - lo;
        (0..n).map(|_| lo + span * self.rng.gen::<f64>()).collect()
    }

    pub fn provenance(&self) -> &ProvenanceRecord {
        &self.provenance
    }

    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    pub fn add_module(&mut self, name: &str) {
        if self.track_provenance {
            self.provenance.add_module(name);
        }
    }

    pub fn add_parameter(&mut self, key: &str, value: impl Into<Value>) {
        if self.track_provenance {
            self.provenance.add_parameter(key, value);
        }
    }

    pub fn add_meta(&mut self, key: &str, value: impl Into<Value>) {
        if self.track_provenance {
            self.provenance.add_meta(key, value);
        }
    }

    pub fn increment_steps(&mut self, n: u64) {
        if self.track_metrics {
            self.metrics.increment_steps(n);
        }
    }

    pub fn set_grid_size(&mut self, width: usize, height: usize) {
        if self.track_metrics {
            self.metrics.set_grid_size(width, height);
        }
    }

    pub fn update_entropy(&mut self, value: f64) {
        if self.track_metrics {
            self.metrics.update_entropy(value);
        }
    }

    pub fn add_metric(&mut self, key: &str, value: f64) {
        if self.track_metrics {
            self.metrics.add_extra(key, value);
        }
    }

    /// Child runtime with the same seed, cloned provenance plus `extra_meta`,
    /// fresh metrics and a stream restarted from the seed.
    pub fn fork<I>(&self, extra_meta: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        Self {
            deterministic: self.deterministic,
            seed: self.seed,
            rng: ChaCha8Rng::seed_from_u64(self.seed),
            provenance: self.provenance.clone_with_meta(extra_meta),
            metrics: RunMetrics::default(),
            track_provenance: self.track_provenance,
            track_metrics: self.track_metrics,
        }
    }

    /// Fails with a determinism violation when deterministic and the
    /// hashes differ. Non-deterministic runtimes accept any pair.
    pub fn verify_determinism(&self, hash_a: u64, hash_b: u64) -> PsyfiResult<()> {
        if self.deterministic && hash_a != hash_b {
            log::error!(
                "determinism violation: seed={} hash_a={hash_a:016x} hash_b={hash_b:016x}",
                self.seed
            );
            return Err(PsyfiError::Determinism(format!(
                "hash mismatch under seed {}: {hash_a:016x} != {hash_b:016x}",
                self.seed
            )));
        }
        Ok(())
    }
}

impl Default for DeterministicRuntime {
    fn default() -> Self {
        Self::new(true, None)
    }
}
