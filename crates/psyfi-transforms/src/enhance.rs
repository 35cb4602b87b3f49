// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Feature Enhancement
// ─────────────────────────────────────────────────────────────────────
//! Salient-feature emphasis blended over the input by `opacity`.
//!
//! `Edges` adds `gain·|∇²m|` to the magnitude. `External` delegates to a
//! caller-supplied [`FeatureEnhancer`]; without one the field passes
//! through unchanged.

use serde::{Deserialize, Serialize};

use psyfi_core::{ndimage, Complex64, Field};
use psyfi_types::PsyfiResult;

use crate::bounds::{require_non_negative, require_same_shape, require_unit};

/// Pluggable enhancement backend.
pub trait FeatureEnhancer {
    fn enhance(&self, field: &Field) -> PsyfiResult<Field>;
}

impl<F> FeatureEnhancer for F
where
    F: Fn(&Field) -> PsyfiResult<Field>,
{
    fn enhance(&self, field: &Field) -> PsyfiResult<Field> {
        self(field)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnhanceMode {
    #[default]
    Edges,
    External,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureEnhanceParams {
    pub mode: EnhanceMode,
    /// Default: 1.5.
    pub gain: f64,
    /// Blend weight of the enhanced field. Default: 0.5.
    pub opacity: f64,
}

impl Default for FeatureEnhanceParams {
    fn default() -> Self {
        Self {
            mode: EnhanceMode::Edges,
            gain: 1.5,
            opacity: 0.5,
        }
    }
}

impl FeatureEnhanceParams {
    pub fn validate(&self) -> PsyfiResult<()> {
        require_non_negative("gain", self.gain)?;
        require_unit("opacity", self.opacity)
    }
}

fn edge_enhance(field: &Field, gain: f64) -> PsyfiResult<Field> {
    let (magnitudes, phases) = field.to_polar();
    let edges = ndimage::laplace(&magnitudes, field.width(), field.height());
    let enhanced: Vec<f64> = magnitudes
        .iter()
        .zip(edges.iter())
        .map(|(m, e)| m + gain * e.abs())
        .collect();
    field.with_polar(&enhanced, &phases)
}

pub fn apply_feature_enhancement(
    field: &Field,
    params: &FeatureEnhanceParams,
    enhancer: Option<&dyn FeatureEnhancer>,
) -> PsyfiResult<Field> {
    params.validate()?;
    let enhanced = match (params.mode, enhancer) {
        (EnhanceMode::Edges, _) => edge_enhance(field, params.gain)?,
        (EnhanceMode::External, Some(e)) => {
            let out = e.enhance(field)?;
            require_same_shape(field, &out)?;
            out
        }
        (EnhanceMode::External, None) => {
            log::debug!("feature enhancement: external mode without enhancer, passing through");
            return Ok(field.clone());
        }
    };

    let o = params.opacity;
    let data: Vec<Complex64> = enhanced
        .data()
        .iter()
        .zip(field.data())
        .map(|(e, f)| *e * o + *f * (1.0 - o))
        .collect();
    field.copy_with_data(data)
}
