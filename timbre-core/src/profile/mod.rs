//! Voice feature aggregation: per-frame features → one statistical profile.
//!
//! A [`VoiceProfile`] is the fixed-size fingerprint handed across the core
//! boundary to the storage layer. It is immutable once built; multi-sample
//! enrollment combines several profiles via [`average_profiles`].

mod similarity;

pub use similarity::similarity;

use serde::{Deserialize, Serialize};

use crate::spectral::{SpectralFeatures, PITCH_MAX_HZ, PITCH_MIN_HZ};

/// Statistical aggregate over all frames of one audio unit.
///
/// An all-zero profile is the "insufficient audio" sentinel: it is returned
/// for chunks shorter than one frame and must never be treated as a valid
/// match target (see [`VoiceProfile::is_empty`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceProfile {
    /// Column-wise mean of the per-frame MFCC vectors.
    pub mfcc_mean: Vec<f32>,
    /// Column-wise sample variance (denominator n−1) of the MFCC vectors.
    pub mfcc_variance: Vec<f32>,
    /// Mean pitch over voiced frames only.
    pub pitch_mean: f32,
    /// Sample variance of pitch over voiced frames only.
    pub pitch_variance: f32,
    pub energy_mean: f32,
    pub energy_variance: f32,
    pub spectral_centroid_mean: f32,
    pub zero_crossing_rate_mean: f32,
}

impl VoiceProfile {
    /// The all-zero sentinel for "no usable audio".
    pub fn empty(cepstral_coeffs: usize) -> Self {
        Self {
            mfcc_mean: vec![0.0; cepstral_coeffs],
            mfcc_variance: vec![0.0; cepstral_coeffs],
            pitch_mean: 0.0,
            pitch_variance: 0.0,
            energy_mean: 0.0,
            energy_variance: 0.0,
            spectral_centroid_mean: 0.0,
            zero_crossing_rate_mean: 0.0,
        }
    }

    /// True for the sentinel: every field exactly zero.
    pub fn is_empty(&self) -> bool {
        self.mfcc_mean.iter().all(|c| *c == 0.0)
            && self.mfcc_variance.iter().all(|c| *c == 0.0)
            && self.pitch_mean == 0.0
            && self.pitch_variance == 0.0
            && self.energy_mean == 0.0
            && self.energy_variance == 0.0
            && self.spectral_centroid_mean == 0.0
            && self.zero_crossing_rate_mean == 0.0
    }

    /// Reduce a sequence of per-frame features into one profile.
    ///
    /// Pitch statistics only see frames whose estimate fell inside the
    /// voiced 50–500 Hz range; those frames still contribute their MFCC,
    /// energy, centroid and ZCR values.
    pub fn from_frames(frames: &[SpectralFeatures], cepstral_coeffs: usize) -> Self {
        if frames.is_empty() {
            return Self::empty(cepstral_coeffs);
        }
        let n = frames.len();

        let mut mfcc_mean = vec![0.0f32; cepstral_coeffs];
        for frame in frames {
            for (acc, c) in mfcc_mean.iter_mut().zip(&frame.mfcc) {
                *acc += c;
            }
        }
        for acc in &mut mfcc_mean {
            *acc /= n as f32;
        }

        let mut mfcc_variance = vec![0.0f32; cepstral_coeffs];
        if n > 1 {
            for frame in frames {
                for ((acc, c), mean) in mfcc_variance.iter_mut().zip(&frame.mfcc).zip(&mfcc_mean) {
                    let d = c - mean;
                    *acc += d * d;
                }
            }
            for acc in &mut mfcc_variance {
                *acc /= (n - 1) as f32;
            }
        }

        let energies: Vec<f32> = frames.iter().map(|f| f.energy).collect();
        let (energy_mean, energy_variance) = mean_and_sample_variance(&energies);

        let voiced: Vec<f32> = frames
            .iter()
            .map(|f| f.pitch_hz)
            .filter(|p| (PITCH_MIN_HZ..=PITCH_MAX_HZ).contains(p))
            .collect();
        let (pitch_mean, pitch_variance) = mean_and_sample_variance(&voiced);

        let spectral_centroid_mean =
            frames.iter().map(|f| f.spectral_centroid_hz).sum::<f32>() / n as f32;
        let zero_crossing_rate_mean =
            frames.iter().map(|f| f.zero_crossing_rate).sum::<f32>() / n as f32;

        Self {
            mfcc_mean,
            mfcc_variance,
            pitch_mean,
            pitch_variance,
            energy_mean,
            energy_variance,
            spectral_centroid_mean,
            zero_crossing_rate_mean,
        }
    }
}

/// Unweighted arithmetic mean of each field across all input profiles;
/// `None` for an empty slice.
///
/// Known simplification: a profile built from ten minutes of audio counts
/// the same as one built from ten seconds. Duration-weighted enrollment is a
/// product decision, not a drop-in change.
pub fn average_profiles(profiles: &[VoiceProfile]) -> Option<VoiceProfile> {
    let first = profiles.first()?;
    let n = profiles.len() as f32;
    let coeffs = first.mfcc_mean.len();

    let mut out = VoiceProfile::empty(coeffs);
    for profile in profiles {
        for (acc, c) in out.mfcc_mean.iter_mut().zip(&profile.mfcc_mean) {
            *acc += c;
        }
        for (acc, c) in out.mfcc_variance.iter_mut().zip(&profile.mfcc_variance) {
            *acc += c;
        }
        out.pitch_mean += profile.pitch_mean;
        out.pitch_variance += profile.pitch_variance;
        out.energy_mean += profile.energy_mean;
        out.energy_variance += profile.energy_variance;
        out.spectral_centroid_mean += profile.spectral_centroid_mean;
        out.zero_crossing_rate_mean += profile.zero_crossing_rate_mean;
    }

    for acc in &mut out.mfcc_mean {
        *acc /= n;
    }
    for acc in &mut out.mfcc_variance {
        *acc /= n;
    }
    out.pitch_mean /= n;
    out.pitch_variance /= n;
    out.energy_mean /= n;
    out.energy_variance /= n;
    out.spectral_centroid_mean /= n;
    out.zero_crossing_rate_mean /= n;

    Some(out)
}

/// Mean and sample variance (denominator n−1, 0 when n ≤ 1).
fn mean_and_sample_variance(values: &[f32]) -> (f32, f32) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len();
    let mean = values.iter().sum::<f32>() / n as f32;
    if n <= 1 {
        return (mean, 0.0);
    }
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / (n - 1) as f32;
    (mean, variance)
}
