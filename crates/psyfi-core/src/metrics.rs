// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Run Metrics
// ─────────────────────────────────────────────────────────────────────

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Counters kept by a runtime for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub compute_steps: u64,
    pub grid_size: usize,
    /// Last recorded phase richness of the field.
    pub entropy_proxy: f64,
    pub extras: BTreeMap<String, f64>,
}

impl RunMetrics {
    pub fn increment_steps(&mut self, n: u64) {
        self.compute_steps = self.compute_steps.saturating_add(n);
    }

    pub fn set_grid_size(&mut self, width: usize, height: usize) {
        self.grid_size = width.saturating_mul(height);
    }

    pub fn update_entropy(&mut self, value: f64) {
        if value.is_finite() {
            self.entropy_proxy = value;
        } else {
            log::warn!("RunMetrics: non-finite entropy proxy ignored");
        }
    }

    pub fn add_extra(&mut self, key: impl Into<String>, value: f64) {
        self.extras.insert(key.into(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let mut m = RunMetrics::default();
        m.increment_steps(10);
        m.increment_steps(5);
        m.set_grid_size(32, 16);
        m.update_entropy(0.4);
        m.update_entropy(f64::NAN);
        m.add_extra("valence", 0.2);
        assert_eq!(m.compute_steps, 15);
        assert_eq!(m.grid_size, 512);
        assert_eq!(m.entropy_proxy, 0.4);
        assert_eq!(m.extras.get("valence"), Some(&0.2));
    }
}
