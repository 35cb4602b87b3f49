// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Provenance Ledger
// ─────────────────────────────────────────────────────────────────────
//! Append-only audit record of a run: which modules ran, with which
//! parameters, under which seed. Insertion order is preserved for every
//! list so two runs can be compared entry by entry.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceRecord {
    pub seed: u64,
    pub module_chain: Vec<String>,
    /// `(key, value)` in call order. Repeated keys are kept.
    pub parameters: Vec<(String, Value)>,
    pub meta: Vec<(String, Value)>,
}

impl ProvenanceRecord {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    pub fn add_module(&mut self, name: impl Into<String>) {
        self.module_chain.push(name.into());
    }

    pub fn add_parameter(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.parameters.push((key.into(), value.into()));
    }

    pub fn add_meta(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.meta.push((key.into(), value.into()));
    }

    /// Clone with extra meta appended after the existing entries.
    pub fn clone_with_meta<I, K>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut out = self.clone();
        for (k, v) in extra {
            out.meta.push((k.into(), v));
        }
        out
    }

    /// Most recent value recorded under `key`.
    pub fn last_parameter(&self, key: &str) -> Option<&Value> {
        self.parameters
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Most recent meta value recorded under `key`.
    pub fn meta_value(&self, key: &str) -> Option<&Value> {
        self.meta.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}
