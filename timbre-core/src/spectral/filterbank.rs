//! Precomputed transform matrices for the MFCC frontend.
//!
//! Built once in [`super::SpectralAnalyzer::new`] and read-only afterwards.
//! The filter bank uses bin-index triangles on the standard mel scale with
//! peak amplitude 1.0 per filter and no bandwidth energy normalization —
//! stored profiles are only comparable if every extractor produces identical
//! band weights, so this shape must not change between releases.

use std::f32::consts::PI;

/// Triangular mel filter bank of shape `[n_mels][frame_size / 2]`.
///
/// Edge points are linearly spaced on the mel scale between 0 Hz and
/// Nyquist, converted back to Hz and then to FFT bin indices. Each filter
/// rises from 0 at its left edge to 1 at its center bin and falls back to 0
/// at its right edge.
pub(crate) fn build_mel_filter_bank(
    frame_size: usize,
    sample_rate: u32,
    n_mels: usize,
) -> Vec<Vec<f32>> {
    let n_bins = frame_size / 2;
    let mel_max = hz_to_mel(sample_rate as f32 / 2.0);

    // n_mels + 2 edge points: filter m spans points m..m+2.
    let bin_points: Vec<usize> = (0..n_mels + 2)
        .map(|i| {
            let mel = mel_max * i as f32 / (n_mels + 1) as f32;
            let hz = mel_to_hz(mel);
            let bin = ((frame_size + 1) as f32 * hz / sample_rate as f32).floor() as usize;
            bin.min(n_bins.saturating_sub(1))
        })
        .collect();

    let mut filters = vec![vec![0.0f32; n_bins]; n_mels];
    for (m, filter) in filters.iter_mut().enumerate() {
        let left = bin_points[m];
        let center = bin_points[m + 1];
        let right = bin_points[m + 2];

        for k in left..=right {
            // Center weight pinned to 1.0 so a degenerate triangle (adjacent
            // edge points collapsed onto one bin) still contributes its band.
            filter[k] = if k == center {
                1.0
            } else if k < center {
                (k - left) as f32 / (center - left).max(1) as f32
            } else {
                (right - k) as f32 / (right - center).max(1) as f32
            };
        }
    }
    filters
}

/// DCT-II-style basis of shape `[n_coeffs][n_mels]`,
/// entries `cos(π·i·(j + 0.5) / n_mels)`.
pub(crate) fn build_dct_basis(n_coeffs: usize, n_mels: usize) -> Vec<Vec<f32>> {
    (0..n_coeffs)
        .map(|i| {
            (0..n_mels)
                .map(|j| (PI * i as f32 * (j as f32 + 0.5) / n_mels as f32).cos())
                .collect()
        })
        .collect()
}

/// Hamming window of length `n` (no zero-padding — window length equals the
/// analysis frame length).
pub(crate) fn build_hamming_window(n: usize) -> Vec<f32> {
    let denom = n.saturating_sub(1).max(1) as f32;
    (0..n)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f32 / denom).cos())
        .collect()
}

fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10.0f32.powf(mel / 2595.0) - 1.0)
}
