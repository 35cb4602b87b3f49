// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Complex Field Grid
// ─────────────────────────────────────────────────────────────────────
//! Two-dimensional complex field stored row-major (`height × width`).
//!
//! Magnitude is activation, phase is oscillator state. The element type
//! is fixed to `Complex64` for every operation; a field never changes
//! shape in place, all reshaping goes through a validated copy.

use std::collections::BTreeMap;
use std::sync::Arc;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use psyfi_types::{PsyfiError, PsyfiResult};

/// Free-form metadata shared between a field and its copies.
pub type FieldMetadata = BTreeMap<String, serde_json::Value>;

/// Display hint for downstream renderers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    #[default]
    Phase,
    Magnitude,
    Dual,
}

/// Complex-valued 2-D field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    width: usize,
    height: usize,
    color_mode: ColorMode,
    data: Vec<Complex64>,
    metadata: Arc<FieldMetadata>,
}

impl Field {
    /// All-zero field.
    pub fn zeros(width: usize, height: usize) -> PsyfiResult<Self> {
        Self::filled(width, height, Complex64::new(0.0, 0.0))
    }

    /// Field with every cell set to `value`.
    pub fn filled(width: usize, height: usize, value: Complex64) -> PsyfiResult<Self> {
        check_dims(width, height)?;
        Self::from_vec(width, height, vec![value; width * height])
    }

    /// Build from a row-major buffer of `width * height` elements.
    pub fn from_vec(width: usize, height: usize, data: Vec<Complex64>) -> PsyfiResult<Self> {
        check_dims(width, height)?;
        check_len(width, height, data.len())?;
        check_finite(&data)?;
        Ok(Self {
            width,
            height,
            color_mode: ColorMode::default(),
            data,
            metadata: Arc::new(FieldMetadata::new()),
        })
    }

    /// Build from separate magnitude and phase planes: `m·e^{iθ}`.
    pub fn from_polar(
        width: usize,
        height: usize,
        magnitudes: &[f64],
        phases: &[f64],
    ) -> PsyfiResult<Self> {
        check_dims(width, height)?;
        check_len(width, height, magnitudes.len())?;
        check_len(width, height, phases.len())?;
        Self::from_vec(width, height, polar_to_cells(magnitudes, phases))
    }

    pub fn with_color_mode(mut self, color_mode: ColorMode) -> Self {
        self.color_mode = color_mode;
        self
    }

    /// New field with `data` in place of this field's grid.
    ///
    /// `shape` is `(height, width)` of the incoming grid and must match this
    /// field exactly. Metadata is shared, not copied. On error `self` is
    /// untouched.
    pub fn copy_with_field(&self, shape: (usize, usize), data: Vec<Complex64>) -> PsyfiResult<Self> {
        if shape != self.shape() {
            return Err(PsyfiError::Validation(format!(
                "field shape {shape:?} doesn't match expected ({}, {})",
                self.height, self.width
            )));
        }
        check_len(self.width, self.height, data.len())?;
        check_finite(&data)?;
        Ok(Self {
            width: self.width,
            height: self.height,
            color_mode: self.color_mode,
            data,
            metadata: Arc::clone(&self.metadata),
        })
    }

    /// `copy_with_field` for a buffer already laid out in this field's shape.
    pub fn copy_with_data(&self, data: Vec<Complex64>) -> PsyfiResult<Self> {
        self.copy_with_field(self.shape(), data)
    }

    /// Recombine magnitude and phase planes into a copy of this field.
    pub fn with_polar(&self, magnitudes: &[f64], phases: &[f64]) -> PsyfiResult<Self> {
        check_len(self.width, self.height, magnitudes.len())?;
        check_len(self.width, self.height, phases.len())?;
        self.copy_with_data(polar_to_cells(magnitudes, phases))
    }

    /// Copy with one metadata entry added or replaced.
    pub fn with_meta(&self, key: impl Into<String>, value: serde_json::Value) -> Self {
        let mut metadata = (*self.metadata).clone();
        metadata.insert(key.into(), value);
        Self {
            metadata: Arc::new(metadata),
            ..self.clone()
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// `(height, width)`, the row-major shape.
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    pub fn metadata(&self) -> &FieldMetadata {
        &self.metadata
    }

    pub fn data(&self) -> &[Complex64] {
        &self.data
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Complex64> {
        if row < self.height && col < self.width {
            Some(self.data[row * self.width + col])
        } else {
            None
        }
    }

    pub fn magnitudes(&self) -> Vec<f64> {
        self.data.iter().map(|z| z.norm()).collect()
    }

    /// Phases in `(-π, π]`.
    pub fn phases(&self) -> Vec<f64> {
        self.data.iter().map(|z| z.arg()).collect()
    }

    pub fn to_polar(&self) -> (Vec<f64>, Vec<f64>) {
        (self.magnitudes(), self.phases())
    }

    pub fn real_parts(&self) -> Vec<f64> {
        self.data.iter().map(|z| z.re).collect()
    }

    pub fn imag_parts(&self) -> Vec<f64> {
        self.data.iter().map(|z| z.im).collect()
    }

    pub fn max_magnitude(&self) -> f64 {
        self.data.iter().map(|z| z.norm()).fold(0.0, f64::max)
    }

    pub fn mean_magnitude(&self) -> f64 {
        self.data.iter().map(|z| z.norm()).sum::<f64>() / self.data.len() as f64
    }

    /// Content hash over shape and the exact bit pattern of every element.
    pub fn digest(&self) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"PSYFI:FIELD");
        hasher.update(&(self.width as u64).to_le_bytes());
        hasher.update(&(self.height as u64).to_le_bytes());
        for z in &self.data {
            hasher.update(&z.re.to_bits().to_le_bytes());
            hasher.update(&z.im.to_bits().to_le_bytes());
        }
        let bytes = hasher.finalize();
        let mut head = [0u8; 8];
        head.copy_from_slice(&bytes.as_bytes()[..8]);
        u64::from_le_bytes(head)
    }

    /// Element-wise `|a − b| ≤ atol + rtol·|b|`, shapes must match.
    pub fn approx_eq(&self, other: &Field, rtol: f64, atol: f64) -> bool {
        self.shape() == other.shape()
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| (a - b).norm() <= atol + rtol * b.norm())
    }
}

fn polar_to_cells(magnitudes: &[f64], phases: &[f64]) -> Vec<Complex64> {
    magnitudes
        .iter()
        .zip(phases.iter())
        .map(|(&m, &th)| Complex64::from_polar(m, th))
        .collect()
}

fn check_dims(width: usize, height: usize) -> PsyfiResult<()> {
    if width == 0 || height == 0 {
        return Err(PsyfiError::Validation(format!(
            "field dimensions must be > 0, got {width}x{height}"
        )));
    }
    Ok(())
}

fn check_len(width: usize, height: usize, len: usize) -> PsyfiResult<()> {
    if len != width * height {
        return Err(PsyfiError::Validation(format!(
            "buffer of {len} elements doesn't match {height}x{width} grid"
        )));
    }
    Ok(())
}

fn check_finite(data: &[Complex64]) -> PsyfiResult<()> {
    if let Some(idx) = data.iter().position(|z| !z.re.is_finite() || !z.im.is_finite()) {
        return Err(PsyfiError::Numerical(format!(
            "field contains NaN or Inf at index {idx}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros() {
        let f = Field::zeros(32, 16).unwrap();
        assert_eq!(f.width(), 32);
        assert_eq!(f.height(), 16);
        assert_eq!(f.shape(), (16, 32));
        assert!(f.data().iter().all(|z| z.norm() == 0.0));
    }

    #[test]
    fn test_zero_dims_rejected() {
        assert!(matches!(Field::zeros(0, 4), Err(PsyfiError::Validation(_))));
    }

    #[test]
    fn test_copy_with_field() {
        let f = Field::zeros(32, 16).unwrap();
        let g = f
            .copy_with_field((16, 32), vec![Complex64::new(1.0, 0.0); 512])
            .unwrap();
        assert!(g.data().iter().all(|z| *z == Complex64::new(1.0, 0.0)));
        assert!(f.data().iter().all(|z| z.norm() == 0.0));
    }

    #[test]
    fn test_copy_with_field_wrong_shape() {
        let f = Field::zeros(32, 16).unwrap();
        let before = f.clone();
        let err = f
            .copy_with_field((10, 10), vec![Complex64::new(1.0, 0.0); 100])
            .unwrap_err();
        assert!(matches!(err, PsyfiError::Validation(ref m) if m.contains("doesn't match")));
        assert_eq!(f, before);
    }

    #[test]
    fn test_metadata_shared_on_copy() {
        let f = Field::zeros(8, 8)
            .unwrap()
            .with_meta("test", serde_json::json!("value"));
        let g = f.copy_with_data(vec![Complex64::new(0.5, 0.5); 64]).unwrap();
        assert_eq!(g.metadata().get("test"), Some(&serde_json::json!("value")));
        assert!(Arc::ptr_eq(&f.metadata, &g.metadata));
    }

    #[test]
    fn test_non_finite_rejected() {
        let f = Field::zeros(2, 2).unwrap();
        let bad = vec![Complex64::new(f64::NAN, 0.0); 4];
        assert!(matches!(f.copy_with_data(bad), Err(PsyfiError::Numerical(_))));
    }

    #[test]
    fn test_polar_roundtrip_lossless() {
        let data: Vec<Complex64> = (0..48)
            .map(|i| Complex64::new((i as f64 * 0.3).cos() * 1.7, (i as f64 * 0.7).sin() - 0.2))
            .collect();
        let f = Field::from_vec(8, 6, data).unwrap();
        let (m, th) = f.to_polar();
        let g = f.with_polar(&m, &th).unwrap();
        assert!(g.approx_eq(&f, 1e-12, 1e-12));
    }

    #[test]
    fn test_digest_stable_and_sensitive() {
        let f = Field::filled(4, 4, Complex64::new(1.0, 0.0)).unwrap();
        let g = Field::filled(4, 4, Complex64::new(1.0, 0.0)).unwrap();
        assert_eq!(f.digest(), g.digest());
        let mut data = f.data().to_vec();
        data[5] = Complex64::new(1.0, 1e-15);
        let h = f.copy_with_data(data).unwrap();
        assert_ne!(f.digest(), h.digest());
    }

    #[test]
    fn test_digest_includes_shape() {
        let a = Field::zeros(4, 2).unwrap();
        let b = Field::zeros(2, 4).unwrap();
        assert_ne!(a.digest(), b.digest());
    }

    #[test]
    fn test_get_out_of_bounds() {
        let f = Field::zeros(3, 2).unwrap();
        assert!(f.get(1, 2).is_some());
        assert!(f.get(2, 0).is_none());
    }
}
