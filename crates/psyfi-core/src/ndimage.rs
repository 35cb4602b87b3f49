// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Grid Kernels
// ─────────────────────────────────────────────────────────────────────
//! Image-style kernels over row-major `f64` grids.
//!
//! Border handling follows the usual ndimage conventions:
//! - Gaussian blur and Laplacian: `reflect` (`d c b a | a b c d | d c b a`).
//! - Box mean: zero padding, full window in the denominator.
//! - Morphology: out-of-bounds cells are background.
//! - Bilinear sampling: zero outside the grid.

use std::collections::VecDeque;

use num_complex::Complex64;

/// Gaussian kernel truncation, in standard deviations.
pub const GAUSSIAN_TRUNCATE: f64 = 4.0;

#[inline]
fn reflect_index(i: isize, n: usize) -> usize {
    let n = n as isize;
    let period = 2 * n;
    let mut k = i.rem_euclid(period);
    if k >= n {
        k = period - k - 1;
    }
    k as usize
}

/// Gaussian weights along one axis, by offset from the output cell.
///
/// Under reflect borders offsets repeat with period `2n`, so a kernel
/// wider than that is folded onto one period. Past a few periods the
/// folded weights are flat to machine precision.
struct AxisKernel {
    weights: Vec<f64>,
    start: isize,
}

/// Radius, in periods, beyond which the folded kernel is uniform.
const FLAT_FOLD_PERIODS: usize = 8;

impl AxisKernel {
    fn gaussian(sigma: f64, n: usize) -> Self {
        let radius = (GAUSSIAN_TRUNCATE * sigma + 0.5) as usize;
        let period = 2 * n.max(1);
        let inv = -0.5 / (sigma * sigma);
        let weight = |x: f64| if x == 0.0 { 1.0 } else { (inv * x * x).exp() };

        let (mut weights, start) = if radius < period / 2 {
            let w: Vec<f64> = (0..=2 * radius)
                .map(|k| weight(k as f64 - radius as f64))
                .collect();
            (w, -(radius as isize))
        } else if radius <= FLAT_FOLD_PERIODS * period {
            let mut w = vec![0.0; period];
            let r = radius as isize;
            for off in -r..=r {
                w[off.rem_euclid(period as isize) as usize] += weight(off as f64);
            }
            (w, 0)
        } else {
            (vec![1.0; period], 0)
        };

        let total: f64 = weights.iter().sum();
        for w in &mut weights {
            *w /= total;
        }
        Self { weights, start }
    }
}

fn correlate_rows_reflect(src: &[f64], width: usize, height: usize, kernel: &AxisKernel) -> Vec<f64> {
    let mut out = vec![0.0; src.len()];
    for r in 0..height {
        let row = &src[r * width..(r + 1) * width];
        for c in 0..width {
            let mut acc = 0.0;
            for (k, &w) in kernel.weights.iter().enumerate() {
                let j = reflect_index(c as isize + kernel.start + k as isize, width);
                acc += w * row[j];
            }
            out[r * width + c] = acc;
        }
    }
    out
}

fn correlate_cols_reflect(src: &[f64], width: usize, height: usize, kernel: &AxisKernel) -> Vec<f64> {
    let mut out = vec![0.0; src.len()];
    for r in 0..height {
        for c in 0..width {
            let mut acc = 0.0;
            for (k, &w) in kernel.weights.iter().enumerate() {
                let i = reflect_index(r as isize + kernel.start + k as isize, height);
                acc += w * src[i * width + c];
            }
            out[r * width + c] = acc;
        }
    }
    out
}

/// Separable Gaussian blur. `sigma <= 0` returns a copy. Any finite or
/// infinite positive sigma is accepted; very wide kernels fold onto the
/// grid and tend to the grid mean.
pub fn gaussian_filter(src: &[f64], width: usize, height: usize, sigma: f64) -> Vec<f64> {
    if sigma.is_nan() || sigma <= 0.0 {
        return src.to_vec();
    }
    let tmp = correlate_cols_reflect(src, width, height, &AxisKernel::gaussian(sigma, height));
    correlate_rows_reflect(&tmp, width, height, &AxisKernel::gaussian(sigma, width))
}

/// Gaussian blur applied to real and imaginary channels independently.
pub fn gaussian_filter_complex(
    src: &[Complex64],
    width: usize,
    height: usize,
    sigma: f64,
) -> Vec<Complex64> {
    let re: Vec<f64> = src.iter().map(|z| z.re).collect();
    let im: Vec<f64> = src.iter().map(|z| z.im).collect();
    let re = gaussian_filter(&re, width, height, sigma);
    let im = gaussian_filter(&im, width, height, sigma);
    re.into_iter()
        .zip(im)
        .map(|(a, b)| Complex64::new(a, b))
        .collect()
}

/// Mean over a `(2r+1)²` window with zero padding.
pub fn uniform_filter(src: &[f64], width: usize, height: usize, radius: usize) -> Vec<f64> {
    let size = (2 * radius + 1) as f64;
    let r = radius as isize;
    let mut tmp = vec![0.0; src.len()];
    for row in 0..height {
        for c in 0..width {
            let lo = (c as isize - r).max(0) as usize;
            let hi = ((c as isize + r) as usize).min(width - 1);
            let s: f64 = src[row * width + lo..=row * width + hi].iter().sum();
            tmp[row * width + c] = s / size;
        }
    }
    let mut out = vec![0.0; src.len()];
    for row in 0..height {
        let lo = (row as isize - r).max(0) as usize;
        let hi = ((row as isize + r) as usize).min(height - 1);
        for c in 0..width {
            let s: f64 = (lo..=hi).map(|i| tmp[i * width + c]).sum();
            out[row * width + c] = s / size;
        }
    }
    out
}

/// Five-point Laplacian with reflected borders.
pub fn laplace(src: &[f64], width: usize, height: usize) -> Vec<f64> {
    let mut out = vec![0.0; src.len()];
    for r in 0..height {
        let up = reflect_index(r as isize - 1, height);
        let down = reflect_index(r as isize + 1, height);
        for c in 0..width {
            let left = reflect_index(c as isize - 1, width);
            let right = reflect_index(c as isize + 1, width);
            let centre = src[r * width + c];
            out[r * width + c] = src[up * width + c]
                + src[down * width + c]
                + src[r * width + left]
                + src[r * width + right]
                - 4.0 * centre;
        }
    }
    out
}

/// Finite-difference gradient `(d/drow, d/dcol)`.
///
/// Central differences inside, one-sided at the edges. An axis shorter than
/// two cells has zero gradient.
pub fn gradient(src: &[f64], width: usize, height: usize) -> (Vec<f64>, Vec<f64>) {
    let mut gy = vec![0.0; src.len()];
    let mut gx = vec![0.0; src.len()];
    let at = |r: usize, c: usize| src[r * width + c];

    if height >= 2 {
        for r in 0..height {
            for c in 0..width {
                gy[r * width + c] = if r == 0 {
                    at(1, c) - at(0, c)
                } else if r == height - 1 {
                    at(r, c) - at(r - 1, c)
                } else {
                    0.5 * (at(r + 1, c) - at(r - 1, c))
                };
            }
        }
    }
    if width >= 2 {
        for r in 0..height {
            for c in 0..width {
                gx[r * width + c] = if c == 0 {
                    at(r, 1) - at(r, 0)
                } else if c == width - 1 {
                    at(r, c) - at(r, c - 1)
                } else {
                    0.5 * (at(r, c + 1) - at(r, c - 1))
                };
            }
        }
    }
    (gy, gx)
}

/// `sqrt(gy² + gx²)` per cell.
pub fn gradient_magnitude(src: &[f64], width: usize, height: usize) -> Vec<f64> {
    let (gy, gx) = gradient(src, width, height);
    gy.iter().zip(gx.iter()).map(|(a, b)| a.hypot(*b)).collect()
}

fn structuring_offsets(size: usize) -> Vec<isize> {
    let size = size.max(1);
    let origin = (size / 2) as isize;
    (0..size as isize).map(|j| j - origin).collect()
}

/// Binary dilation by a `size × size` square.
pub fn binary_dilation(mask: &[bool], width: usize, height: usize, size: usize) -> Vec<bool> {
    let offsets = structuring_offsets(size);
    let mut out = vec![false; mask.len()];
    for r in 0..height as isize {
        for c in 0..width as isize {
            let hit = offsets.iter().any(|&dy| {
                offsets.iter().any(|&dx| {
                    let (y, x) = (r - dy, c - dx);
                    y >= 0
                        && x >= 0
                        && (y as usize) < height
                        && (x as usize) < width
                        && mask[y as usize * width + x as usize]
                })
            });
            out[r as usize * width + c as usize] = hit;
        }
    }
    out
}

/// Binary erosion by a `size × size` square.
pub fn binary_erosion(mask: &[bool], width: usize, height: usize, size: usize) -> Vec<bool> {
    let offsets = structuring_offsets(size);
    let mut out = vec![false; mask.len()];
    for r in 0..height as isize {
        for c in 0..width as isize {
            let keep = offsets.iter().all(|&dy| {
                offsets.iter().all(|&dx| {
                    let (y, x) = (r + dy, c + dx);
                    y >= 0
                        && x >= 0
                        && (y as usize) < height
                        && (x as usize) < width
                        && mask[y as usize * width + x as usize]
                })
            });
            out[r as usize * width + c as usize] = keep;
        }
    }
    out
}

/// Dilation followed by erosion.
pub fn binary_closing(mask: &[bool], width: usize, height: usize, size: usize) -> Vec<bool> {
    let dilated = binary_dilation(mask, width, height, size);
    binary_erosion(&dilated, width, height, size)
}

/// Erosion followed by dilation.
pub fn binary_opening(mask: &[bool], width: usize, height: usize, size: usize) -> Vec<bool> {
    let eroded = binary_erosion(mask, width, height, size);
    binary_dilation(&eroded, width, height, size)
}

/// 4-connected component labelling.
///
/// Returns the label grid (0 = background, `1..=n` in row-major discovery
/// order) and `n`.
pub fn label(mask: &[bool], width: usize, height: usize) -> (Vec<u32>, usize) {
    let mut labels = vec![0u32; mask.len()];
    let mut count = 0u32;
    let mut queue = VecDeque::new();

    for start in 0..mask.len() {
        if !mask[start] || labels[start] != 0 {
            continue;
        }
        count += 1;
        labels[start] = count;
        queue.push_back(start);
        while let Some(idx) = queue.pop_front() {
            let (r, c) = (idx / width, idx % width);
            let mut visit = |n: usize| {
                if mask[n] && labels[n] == 0 {
                    labels[n] = count;
                    queue.push_back(n);
                }
            };
            if r > 0 {
                visit(idx - width);
            }
            if r + 1 < height {
                visit(idx + width);
            }
            if c > 0 {
                visit(idx - 1);
            }
            if c + 1 < width {
                visit(idx + 1);
            }
        }
    }
    (labels, count as usize)
}

/// Bilinear sample at fractional `(row, col)`; zero outside the grid.
pub fn bilinear_sample(src: &[f64], width: usize, height: usize, row: f64, col: f64) -> f64 {
    let max_r = (height - 1) as f64;
    let max_c = (width - 1) as f64;
    if !(row >= 0.0 && col >= 0.0 && row <= max_r && col <= max_c) {
        return 0.0;
    }
    let r0 = row.floor() as usize;
    let c0 = col.floor() as usize;
    let r1 = (r0 + 1).min(height - 1);
    let c1 = (c0 + 1).min(width - 1);
    let fr = row - r0 as f64;
    let fc = col - c0 as f64;
    let top = src[r0 * width + c0] * (1.0 - fc) + src[r0 * width + c1] * fc;
    let bottom = src[r1 * width + c0] * (1.0 - fc) + src[r1 * width + c1] * fc;
    top * (1.0 - fr) + bottom * fr
}

/// Isotropic Gaussian bump `exp(-d²/2σ²)` centred at `(cy, cx)` in pixels.
pub fn gaussian_spot(width: usize, height: usize, cy: f64, cx: f64, sigma: f64) -> Vec<f64> {
    let denom = 2.0 * sigma * sigma;
    let mut out = Vec::with_capacity(width * height);
    for r in 0..height {
        for c in 0..width {
            let dy = r as f64 - cy;
            let dx = c as f64 - cx;
            out.push((-(dy * dy + dx * dx) / denom).exp());
        }
    }
    out
}

pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Population variance.
pub fn variance(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let m = mean(xs);
    xs.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / xs.len() as f64
}

pub fn std_dev(xs: &[f64]) -> f64 {
    variance(xs).sqrt()
}

/// Median; the mean of the two middle values for even counts.
pub fn median(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let mut sorted = xs.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        0.5 * (sorted[mid - 1] + sorted[mid])
    } else {
        sorted[mid]
    }
}

/// Pearson correlation; `None` when either side has zero variance or
/// the lengths differ.
pub fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    let ma = mean(a);
    let mb = mean(b);
    let mut cov = 0.0;
    let mut va = 0.0;
    let mut vb = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        let dx = x - ma;
        let dy = y - mb;
        cov += dx * dy;
        va += dx * dx;
        vb += dy * dy;
    }
    if va <= 0.0 || vb <= 0.0 {
        return None;
    }
    Some(cov / (va.sqrt() * vb.sqrt()))
}
