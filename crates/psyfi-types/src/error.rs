// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for all field-kernel failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PsyfiError {
    /// Invalid input: field shape, out-of-range parameter, non-finite value.
    #[error("validation error: {0}")]
    Validation(String),

    /// Two runs that must agree produced different hashes.
    ///
    /// Indicates a correctness bug, not bad input. Never retried.
    #[error("determinism violation: {0}")]
    Determinism(String),

    /// Configuration error (oversized grid, unknown preset, bad JSON).
    #[error("config error: {0}")]
    Configuration(String),

    /// Numerical error (NaN/Inf in computation).
    #[error("numerical error: {0}")]
    Numerical(String),
}

impl PsyfiError {
    /// True for hash mismatches raised by a deterministic runtime.
    pub fn is_determinism_violation(&self) -> bool {
        matches!(self, PsyfiError::Determinism(_))
    }
}

pub type PsyfiResult<T> = Result<T, PsyfiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism_is_distinguishable() {
        let err = PsyfiError::Determinism("a != b".into());
        assert!(err.is_determinism_violation());
        assert!(!PsyfiError::Validation("shape".into()).is_determinism_violation());
        assert!(!PsyfiError::Configuration("preset".into()).is_determinism_violation());
    }

    #[test]
    fn test_display_prefixes() {
        let err = PsyfiError::Configuration("unknown preset 'x'".into());
        assert_eq!(err.to_string(), "config error: unknown preset 'x'");
    }
}
