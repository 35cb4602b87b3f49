// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Parameter Range Checks
// ─────────────────────────────────────────────────────────────────────

use psyfi_core::Field;
use psyfi_types::{PsyfiError, PsyfiResult};

pub(crate) fn require_unit(name: &str, value: f64) -> PsyfiResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(PsyfiError::Validation(format!(
            "{name} must be in [0, 1], got {value}"
        )));
    }
    Ok(())
}

pub(crate) fn require_non_negative(name: &str, value: f64) -> PsyfiResult<()> {
    if !(value >= 0.0 && value.is_finite()) {
        return Err(PsyfiError::Validation(format!(
            "{name} must be finite and >= 0, got {value}"
        )));
    }
    Ok(())
}

pub(crate) fn require_positive(name: &str, value: f64) -> PsyfiResult<()> {
    if !(value > 0.0 && value.is_finite()) {
        return Err(PsyfiError::Validation(format!(
            "{name} must be finite and > 0, got {value}"
        )));
    }
    Ok(())
}

pub(crate) fn require_finite(name: &str, value: f64) -> PsyfiResult<()> {
    if !value.is_finite() {
        return Err(PsyfiError::Validation(format!(
            "{name} must be finite, got {value}"
        )));
    }
    Ok(())
}

pub(crate) fn require_same_shape(a: &Field, b: &Field) -> PsyfiResult<()> {
    if a.shape() != b.shape() {
        return Err(PsyfiError::Validation(format!(
            "field shape {:?} doesn't match {:?}",
            b.shape(),
            a.shape()
        )));
    }
    Ok(())
}
