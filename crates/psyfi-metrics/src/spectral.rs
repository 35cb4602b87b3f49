// ─────────────────────────────────────────────────────────────────────
// PsyFi Field Kernel — Spectral Analyzer
// ─────────────────────────────────────────────────────────────────────
//! 2-D DFT → centred magnitude spectrum → dominant modes.
//!
//! Includes a pure-Rust FFT: iterative radix-2 for power-of-two lengths,
//! Bluestein's chirp-z over a padded radix-2 convolution otherwise, so
//! every length runs in O(n log n). Sign convention is `e^{-2πi·kn/N}`,
//! unnormalised, matching the usual forward transform.
//!
//! The zero-frequency bin sits at `(h/2, w/2)` after shifting. A 5×5
//! block around it (clipped to the grid) is excluded from mode selection.

use std::f64::consts::TAU;

use psyfi_core::{Complex64, Field};
use psyfi_types::ResonanceModes;

/// Default number of modes reported by [`SpectralAnalyzer::resonance_modes`].
pub const DEFAULT_NUM_MODES: usize = 8;

/// Half-width of the DC exclusion block.
const DC_HALF: usize = 2;

/// In-place 1-D forward transform. Builds a one-off plan; use
/// [`SpectralAnalyzer`] to reuse plans across rows and columns.
pub fn fft_in_place(buf: &mut [Complex64]) {
    Plan1d::new(buf.len()).run(buf);
}

/// Forward transform plan for one length.
enum Plan1d {
    Trivial,
    Radix2,
    Chirp(ChirpPlan),
}

impl Plan1d {
    fn new(n: usize) -> Self {
        if n <= 1 {
            Plan1d::Trivial
        } else if n.is_power_of_two() {
            Plan1d::Radix2
        } else {
            Plan1d::Chirp(ChirpPlan::new(n))
        }
    }

    fn run(&mut self, buf: &mut [Complex64]) {
        match self {
            Plan1d::Trivial => {}
            Plan1d::Radix2 => radix2(buf),
            Plan1d::Chirp(plan) => plan.run(buf),
        }
    }
}

/// Bluestein's algorithm: `X_k = w_k · Σ_j (x_j w_j) · conj(w_{k−j})` with
/// `w_k = e^{−iπk²/n}`, the sum taken as a circular convolution of length
/// `m ≥ 2n − 1`.
struct ChirpPlan {
    n: usize,
    chirp: Vec<Complex64>,
    /// Transform of the conjugate chirp, wrapped to length `m`.
    kernel: Vec<Complex64>,
    work: Vec<Complex64>,
}

impl ChirpPlan {
    fn new(n: usize) -> Self {
        let m = (2 * n - 1).next_power_of_two();
        // k² mod 2n keeps the angle small for long rows.
        let chirp: Vec<Complex64> = (0..n)
            .map(|k| {
                let k2 = (k * k) % (2 * n);
                Complex64::from_polar(1.0, -TAU / 2.0 * k2 as f64 / n as f64)
            })
            .collect();
        let mut kernel = vec![Complex64::new(0.0, 0.0); m];
        kernel[0] = chirp[0].conj();
        for k in 1..n {
            kernel[k] = chirp[k].conj();
            kernel[m - k] = chirp[k].conj();
        }
        radix2(&mut kernel);
        Self {
            n,
            chirp,
            kernel,
            work: vec![Complex64::new(0.0, 0.0); m],
        }
    }

    fn run(&mut self, buf: &mut [Complex64]) {
        let m = self.work.len();
        for (k, slot) in self.work.iter_mut().enumerate() {
            *slot = if k < self.n {
                buf[k] * self.chirp[k]
            } else {
                Complex64::new(0.0, 0.0)
            };
        }
        radix2(&mut self.work);
        // Inverse via conj(FFT(conj(·))) / m.
        for (a, b) in self.work.iter_mut().zip(&self.kernel) {
            *a = (*a * b).conj();
        }
        radix2(&mut self.work);
        let scale = 1.0 / m as f64;
        for (k, out) in buf.iter_mut().enumerate() {
            *out = self.work[k].conj() * scale * self.chirp[k];
        }
    }
}

fn radix2(buf: &mut [Complex64]) {
    let n = buf.len();
    let bits = n.trailing_zeros();
    for i in 0..n {
        let j = i.reverse_bits() >> (usize::BITS - bits);
        if j > i {
            buf.swap(i, j);
        }
    }
    let mut len = 2;
    while len <= n {
        let w_len = Complex64::from_polar(1.0, -TAU / len as f64);
        for start in (0..n).step_by(len) {
            let mut w = Complex64::new(1.0, 0.0);
            for k in 0..len / 2 {
                let u = buf[start + k];
                let v = buf[start + k + len / 2] * w;
                buf[start + k] = u + v;
                buf[start + k + len / 2] = u - v;
                w *= w_len;
            }
        }
        len <<= 1;
    }
}

/// Roll a row-major grid by `(h/2, w/2)` so index 0 moves to the centre.
pub fn fftshift<T: Copy>(src: &[T], width: usize, height: usize) -> Vec<T> {
    let (sy, sx) = (height / 2, width / 2);
    let mut out = Vec::with_capacity(src.len());
    for r in 0..height {
        let src_r = (r + height - sy) % height;
        for c in 0..width {
            let src_c = (c + width - sx) % width;
            out.push(src[src_r * width + src_c]);
        }
    }
    out
}

/// Reusable 2-D transform bound to one grid size.
pub struct SpectralAnalyzer {
    width: usize,
    height: usize,
    // Pre-allocated scratch
    column: Vec<Complex64>,
    row_plan: Plan1d,
    col_plan: Plan1d,
}

impl SpectralAnalyzer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            column: vec![Complex64::new(0.0, 0.0); height],
            row_plan: Plan1d::new(width),
            col_plan: Plan1d::new(height),
        }
    }

    pub fn for_field(field: &Field) -> Self {
        Self::new(field.width(), field.height())
    }

    /// Unshifted 2-D transform of a row-major grid.
    pub fn fft2(&mut self, data: &[Complex64]) -> Vec<Complex64> {
        let (w, h) = (self.width, self.height);
        let mut out = data.to_vec();
        for row in out.chunks_mut(w) {
            self.row_plan.run(row);
        }
        for c in 0..w {
            for r in 0..h {
                self.column[r] = out[r * w + c];
            }
            self.col_plan.run(&mut self.column);
            for r in 0..h {
                out[r * w + c] = self.column[r];
            }
        }
        out
    }

    /// Centred magnitude spectrum `|fftshift(fft2(field))|`.
    pub fn magnitude_spectrum(&mut self, field: &Field) -> Vec<f64> {
        let spectrum = self.fft2(field.data());
        fftshift(&spectrum, self.width, self.height)
            .iter()
            .map(|z| z.norm())
            .collect()
    }

    pub fn resonance_modes(&mut self, field: &Field, num_modes: usize) -> ResonanceModes {
        let spectrum = self.magnitude_spectrum(field);
        modes_from_spectrum(&spectrum, self.width, self.height, num_modes)
    }
}

/// Mode statistics of a centred magnitude spectrum.
pub fn modes_from_spectrum(
    spectrum: &[f64],
    width: usize,
    height: usize,
    num_modes: usize,
) -> ResonanceModes {
    let (cy, cx) = (height / 2, width / 2);
    let r_lo = cy.saturating_sub(DC_HALF);
    let r_hi = (cy + DC_HALF + 1).min(height);
    let c_lo = cx.saturating_sub(DC_HALF);
    let c_hi = (cx + DC_HALF + 1).min(width);

    let mut masked = spectrum.to_vec();
    for r in r_lo..r_hi {
        for c in c_lo..c_hi {
            masked[r * width + c] = 0.0;
        }
    }

    let mut order: Vec<usize> = (0..masked.len()).collect();
    order.sort_by(|&a, &b| masked[a].total_cmp(&masked[b]));
    let top = &order[order.len().saturating_sub(num_modes)..];

    let top_magnitudes: Vec<f64> = top.iter().map(|&i| spectrum[i]).collect();
    let total_power: f64 = spectrum.iter().map(|m| m * m).sum();
    let top_power: f64 = top_magnitudes.iter().map(|m| m * m).sum();
    let avg_frequency = if top.is_empty() {
        0.0
    } else {
        top.iter()
            .map(|&i| {
                let dy = (i / width) as f64 - cy as f64;
                let dx = (i % width) as f64 - cx as f64;
                dy.hypot(dx)
            })
            .sum::<f64>()
            / top.len() as f64
    };

    ResonanceModes {
        num_modes,
        top_magnitudes,
        power_concentration: top_power / (total_power + 1e-8),
        avg_frequency,
        total_power,
    }
}

/// Variance of the spectrum normalised by its peak.
pub fn spectral_spikiness(spectrum: &[f64]) -> f64 {
    let max = spectrum.iter().copied().fold(0.0, f64::max);
    if max > 0.0 {
        let normalized: Vec<f64> = spectrum.iter().map(|m| m / max).collect();
        psyfi_core::ndimage::variance(&normalized)
    } else {
        psyfi_core::ndimage::variance(spectrum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_dft(x: &[Complex64]) -> Vec<Complex64> {
        let n = x.len();
        (0..n)
            .map(|k| {
                x.iter()
                    .enumerate()
                    .map(|(j, v)| *v * Complex64::from_polar(1.0, -TAU * (k * j) as f64 / n as f64))
                    .sum()
            })
            .collect()
    }

    #[test]
    fn test_radix2_matches_dft() {
        let x: Vec<Complex64> = (0..16)
            .map(|i| Complex64::new((i as f64 * 0.37).sin(), (i as f64 * 0.11).cos()))
            .collect();
        let mut buf = x.clone();
        fft_in_place(&mut buf);
        for (a, b) in buf.iter().zip(naive_dft(&x)) {
            assert!((a - b).norm() < 1e-9);
        }
    }

    #[test]
    fn test_non_power_of_two() {
        let x: Vec<Complex64> = (0..6).map(|i| Complex64::new(i as f64, 0.0)).collect();
        let mut buf = x.clone();
        fft_in_place(&mut buf);
        assert!((buf[0].re - 15.0).abs() < 1e-9);
        for (a, b) in buf.iter().zip(naive_dft(&x)) {
            assert!((a - b).norm() < 1e-9);
        }
    }

    #[test]
    fn test_chirp_lengths_match_dft() {
        for n in [3usize, 5, 7, 12, 100, 1000] {
            let x: Vec<Complex64> = (0..n)
                .map(|i| Complex64::new((i as f64 * 0.91).sin(), (i as f64 * 0.23).cos()))
                .collect();
            let mut buf = x.clone();
            fft_in_place(&mut buf);
            let scale = n as f64;
            for (a, b) in buf.iter().zip(naive_dft(&x)) {
                assert!((a - b).norm() < 1e-9 * scale, "n={n}: {a} vs {b}");
            }
        }
    }

    #[test]
    fn test_odd_grid_spectrum_matches_dft() {
        let (w, h) = (6, 5);
        let data: Vec<Complex64> = (0..w * h)
            .map(|i| Complex64::new((i as f64 * 0.7).cos(), (i as f64 * 0.3).sin()))
            .collect();
        let out = SpectralAnalyzer::new(w, h).fft2(&data);
        for ky in 0..h {
            for kx in 0..w {
                let expected: Complex64 = (0..h)
                    .flat_map(|y| (0..w).map(move |x| (y, x)))
                    .map(|(y, x)| {
                        let angle = -TAU * ((ky * y) as f64 / h as f64 + (kx * x) as f64 / w as f64);
                        data[y * w + x] * Complex64::from_polar(1.0, angle)
                    })
                    .sum();
                assert!((out[ky * w + kx] - expected).norm() < 1e-9);
            }
        }
    }

    #[test]
    fn test_fftshift_even_odd() {
        assert_eq!(fftshift(&[0, 1, 2, 3], 4, 1), vec![2, 3, 0, 1]);
        assert_eq!(fftshift(&[0, 1, 2, 3, 4], 5, 1), vec![3, 4, 0, 1, 2]);
        assert_eq!(fftshift(&[0, 1, 2, 3], 1, 4), vec![2, 3, 0, 1]);
    }

    #[test]
    fn test_constant_field_is_dc_only() {
        let f = Field::filled(8, 8, Complex64::new(1.0, 0.0)).unwrap();
        let spectrum = SpectralAnalyzer::for_field(&f).magnitude_spectrum(&f);
        assert!((spectrum[4 * 8 + 4] - 64.0).abs() < 1e-9);
        let off_dc: f64 = spectrum.iter().sum::<f64>() - spectrum[4 * 8 + 4];
        assert!(off_dc.abs() < 1e-9);
    }

    #[test]
    fn test_plane_wave_mode() {
        // e^{2πi·3c/16}: a single bin 3 columns right of centre.
        let data = (0..256)
            .map(|i| Complex64::from_polar(1.0, TAU * 3.0 * (i % 16) as f64 / 16.0))
            .collect();
        let f = Field::from_vec(16, 16, data).unwrap();
        let modes = SpectralAnalyzer::for_field(&f).resonance_modes(&f, 1);
        assert_eq!(modes.num_modes, 1);
        assert!((modes.top_magnitudes[0] - 256.0).abs() < 1e-6);
        assert!((modes.avg_frequency - 3.0).abs() < 1e-12);
        assert!((modes.power_concentration - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_dc_block_excluded() {
        // Plane wave 2 bins from centre falls inside the exclusion block.
        let data = (0..256)
            .map(|i| Complex64::from_polar(1.0, TAU * 2.0 * (i % 16) as f64 / 16.0))
            .collect();
        let f = Field::from_vec(16, 16, data).unwrap();
        let modes = SpectralAnalyzer::for_field(&f).resonance_modes(&f, DEFAULT_NUM_MODES);
        assert_eq!(modes.top_magnitudes.len(), DEFAULT_NUM_MODES);
        assert!(modes.power_concentration < 1e-6);
    }

    #[test]
    fn test_small_grid_more_modes_than_bins() {
        let f = Field::filled(2, 2, Complex64::new(1.0, 0.0)).unwrap();
        let modes = SpectralAnalyzer::for_field(&f).resonance_modes(&f, 8);
        assert_eq!(modes.top_magnitudes.len(), 4);
    }

    #[test]
    fn test_spikiness_flat_vs_spiky() {
        assert_eq!(spectral_spikiness(&[1.0; 16]), 0.0);
        let mut spiky = vec![0.0; 16];
        spiky[0] = 1.0;
        assert!(spectral_spikiness(&spiky) > 0.05);
        assert_eq!(spectral_spikiness(&[0.0; 4]), 0.0);
    }
}
