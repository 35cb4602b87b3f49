// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Valence Scoring
// ─────────────────────────────────────────────────────────────────────
//! Hedonic tone of a field from four component scores.
//!
//! - coherence: Kuramoto order parameter of the phases
//! - symmetry: mean |Pearson r| of magnitude between the top-left quadrant
//!   and the other three
//! - roughness: mean gradient magnitude over mean magnitude, capped at 1
//! - richness: phase variance over π², capped at 1
//!
//! Richness enters the combined valence through `1 − 2·|richness − 0.5|`,
//! which peaks at moderate phase diversity.

use std::f64::consts::PI;

use psyfi_core::{ndimage, Field};
use psyfi_physics::order_parameter;
use psyfi_types::ValenceMetrics;

const EPS: f64 = 1e-8;

pub fn coherence(field: &Field) -> f64 {
    order_parameter(&field.phases())
}

/// Row-major sub-grid `rows × cols` of `src`.
fn quadrant(
    src: &[f64],
    width: usize,
    rows: std::ops::Range<usize>,
    cols: std::ops::Range<usize>,
) -> (Vec<f64>, usize, usize) {
    let (n_rows, n_cols) = (rows.len(), cols.len());
    let mut out = Vec::with_capacity(n_rows * n_cols);
    for r in rows {
        out.extend_from_slice(&src[r * width + cols.start..r * width + cols.end]);
    }
    (out, n_rows, n_cols)
}

fn crop(q: &(Vec<f64>, usize, usize), rows: usize, cols: usize) -> Vec<f64> {
    let (data, _, width) = q;
    (0..rows)
        .flat_map(|r| data[r * width..r * width + cols].iter().copied())
        .collect()
}

fn pair_correlation(a: &(Vec<f64>, usize, usize), b: &(Vec<f64>, usize, usize)) -> f64 {
    let rows = a.1.min(b.1);
    let cols = a.2.min(b.2);
    if rows == 0 || cols == 0 {
        return 0.0;
    }
    ndimage::pearson(&crop(a, rows, cols), &crop(b, rows, cols))
        .map(f64::abs)
        .unwrap_or(0.0)
}

/// Quadrant symmetry of the magnitude plane.
///
/// The top-left quadrant is correlated with the bottom-left, top-right
/// and bottom-right quadrants as laid out, without mirroring. Odd-sized
/// quadrants are cropped from their top-left corner to the smaller one.
pub fn symmetry(field: &Field) -> f64 {
    let (width, height) = (field.width(), field.height());
    let mags = field.magnitudes();
    let (mid_h, mid_w) = (height / 2, width / 2);

    let tl = quadrant(&mags, width, 0..mid_h, 0..mid_w);
    let bl = quadrant(&mags, width, mid_h..height, 0..mid_w);
    let tr = quadrant(&mags, width, 0..mid_h, mid_w..width);
    let br = quadrant(&mags, width, mid_h..height, mid_w..width);

    (pair_correlation(&tl, &bl) + pair_correlation(&tl, &tr) + pair_correlation(&tl, &br)) / 3.0
}

/// Mean gradient magnitude of `|z|`, before normalisation.
pub(crate) fn mean_gradient(field: &Field) -> f64 {
    let grad = ndimage::gradient_magnitude(&field.magnitudes(), field.width(), field.height());
    ndimage::mean(&grad)
}

pub fn roughness(field: &Field) -> f64 {
    (mean_gradient(field) / (field.mean_magnitude() + EPS)).min(1.0)
}

pub fn richness(field: &Field) -> f64 {
    (ndimage::variance(&field.phases()) / (PI * PI)).min(1.0)
}

/// `1 − 2·|richness − 0.5|`: 1 at moderate diversity, 0 at either extreme.
pub fn richness_contribution(richness: f64) -> f64 {
    1.0 - 2.0 * (richness - 0.5).abs()
}

pub fn compute_valence_metrics(field: &Field) -> ValenceMetrics {
    let coherence_score = coherence(field);
    let symmetry_score = symmetry(field);
    let roughness_score = roughness(field);
    let richness_score = richness(field);
    let valence_score = ValenceMetrics::combine(
        coherence_score,
        symmetry_score,
        roughness_score,
        richness_contribution(richness_score),
    );
    let confidence = (field.mean_magnitude() / (field.max_magnitude() + EPS)).min(1.0);
    ValenceMetrics::new(
        valence_score,
        coherence_score,
        symmetry_score,
        roughness_score,
        richness_score,
        confidence,
    )
}
