//! MFCC spectral frontend.
//!
//! ## Frame parameters (defaults)
//!
//! | Parameter       | Value               |
//! |-----------------|---------------------|
//! | Frame size      | 512 samples (32 ms) |
//! | Hop             | 256 (50% overlap)   |
//! | Window          | Hamming             |
//! | Spectrum bins   | 257 (512/2 + 1)     |
//! | Mel bands       | 26                  |
//! | Cepstral coeffs | 13                  |
//! | Sample rate     | 16 kHz              |
//!
//! All transform matrices are precomputed in [`SpectralAnalyzer::new`] and
//! owned by the analyzer — construction is an explicit step and tests can
//! build analyzers with alternate parameters instead of reaching for
//! process-wide state.

mod filterbank;
mod pitch;

pub use pitch::{PITCH_MAX_HZ, PITCH_MIN_HZ};

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use tracing::{debug, info};

use crate::audio::chunk::AudioChunk;
use crate::error::{Result, TimbreError};
use crate::profile::VoiceProfile;

/// Default number of cepstral coefficients in an MFCC vector.
pub const MFCC_COEFFS: usize = 13;

/// Frontend parameters, injected into [`SpectralAnalyzer::new`].
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Analysis frame length in samples. Must be a power of two (radix-2 FFT).
    pub frame_size: usize,
    /// Frame advance in samples. Default: half the frame (50% overlap).
    pub hop_size: usize,
    /// Number of triangular mel filters.
    pub mel_bands: usize,
    /// Number of cepstral coefficients kept after the DCT.
    pub cepstral_coeffs: usize,
    /// Sample rate every chunk must arrive at (resampling happens upstream).
    pub sample_rate: u32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            frame_size: 512,
            hop_size: 256,
            mel_bands: 26,
            cepstral_coeffs: MFCC_COEFFS,
            sample_rate: 16_000,
        }
    }
}

/// Per-frame feature bundle. Ephemeral — produced and consumed within one
/// [`SpectralAnalyzer::extract_profile`] call.
#[derive(Debug, Clone)]
pub struct SpectralFeatures {
    /// Cepstral coefficients, `cepstral_coeffs` long.
    pub mfcc: Vec<f32>,
    /// RMS of the windowed frame.
    pub energy: f32,
    /// Estimated fundamental frequency; 0.0 when unvoiced or out of the
    /// 50–500 Hz search range.
    pub pitch_hz: f32,
    /// Magnitude-weighted mean frequency of the spectrum.
    pub spectral_centroid_hz: f32,
    /// Fraction of sign changes in the unwindowed frame.
    pub zero_crossing_rate: f32,
}

/// The spectral frontend: turns decoded PCM into one [`VoiceProfile`] per
/// audio unit.
///
/// Immutable after construction; cheap to share behind an `Arc` across
/// concurrent extraction calls.
pub struct SpectralAnalyzer {
    config: AnalyzerConfig,
    window: Vec<f32>,
    mel_filters: Vec<Vec<f32>>,
    dct_basis: Vec<Vec<f32>>,
    fft: Arc<dyn Fft<f32>>,
}

impl SpectralAnalyzer {
    /// Precompute the Hamming window, mel filter bank, DCT basis and FFT plan.
    ///
    /// # Errors
    /// Returns `TimbreError::InvalidConfig` for a frame size that is not a
    /// power of two, a zero hop, or more cepstral coefficients than mel bands.
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        if config.frame_size < 2 || !config.frame_size.is_power_of_two() {
            return Err(TimbreError::InvalidConfig(format!(
                "frame_size {} is not a power of two",
                config.frame_size
            )));
        }
        if config.hop_size == 0 {
            return Err(TimbreError::InvalidConfig("hop_size must be non-zero".into()));
        }
        if config.mel_bands == 0 || config.cepstral_coeffs == 0 {
            return Err(TimbreError::InvalidConfig(
                "mel_bands and cepstral_coeffs must be non-zero".into(),
            ));
        }
        if config.cepstral_coeffs > config.mel_bands {
            return Err(TimbreError::InvalidConfig(format!(
                "cepstral_coeffs {} exceeds mel_bands {}",
                config.cepstral_coeffs, config.mel_bands
            )));
        }
        if config.sample_rate == 0 {
            return Err(TimbreError::InvalidConfig("sample_rate must be non-zero".into()));
        }

        let window = filterbank::build_hamming_window(config.frame_size);
        let mel_filters =
            filterbank::build_mel_filter_bank(config.frame_size, config.sample_rate, config.mel_bands);
        let dct_basis = filterbank::build_dct_basis(config.cepstral_coeffs, config.mel_bands);
        let fft = FftPlanner::<f32>::new().plan_fft_forward(config.frame_size);

        info!(
            frame_size = config.frame_size,
            hop_size = config.hop_size,
            mel_bands = config.mel_bands,
            cepstral_coeffs = config.cepstral_coeffs,
            sample_rate = config.sample_rate,
            "spectral analyzer ready"
        );

        Ok(Self {
            config,
            window,
            mel_filters,
            dct_basis,
            fft,
        })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Extract a [`VoiceProfile`] from one chunk of decoded audio.
    ///
    /// A chunk shorter than one frame yields the empty sentinel profile —
    /// "no usable audio" is non-fatal for callers.
    ///
    /// # Errors
    /// Returns `TimbreError::SampleRateMismatch` when the chunk was decoded
    /// at a different rate than this analyzer was built for.
    pub fn extract_profile(&self, chunk: &AudioChunk) -> Result<VoiceProfile> {
        if chunk.sample_rate != self.config.sample_rate {
            return Err(TimbreError::SampleRateMismatch {
                expected: self.config.sample_rate,
                actual: chunk.sample_rate,
            });
        }
        if chunk.samples.len() < self.config.frame_size {
            debug!(
                samples = chunk.samples.len(),
                frame_size = self.config.frame_size,
                "chunk shorter than one frame — returning empty profile"
            );
            return Ok(VoiceProfile::empty(self.config.cepstral_coeffs));
        }

        let frames: Vec<SpectralFeatures> = chunk
            .frames(self.config.frame_size, self.config.hop_size)
            .map(|frame| self.analyze_frame(frame))
            .collect();

        Ok(VoiceProfile::from_frames(&frames, self.config.cepstral_coeffs))
    }

    /// Compute the per-frame feature bundle for one full analysis frame.
    pub fn analyze_frame(&self, frame: &[f32]) -> SpectralFeatures {
        debug_assert_eq!(frame.len(), self.config.frame_size);

        // Window into the FFT buffer, accumulating windowed energy as we go.
        let mut sum_sq = 0.0f32;
        let mut fft_buf: Vec<Complex<f32>> = frame
            .iter()
            .zip(&self.window)
            .map(|(s, w)| {
                let x = s * w;
                sum_sq += x * x;
                Complex::new(x, 0.0)
            })
            .collect();
        let energy = (sum_sq / frame.len() as f32).sqrt();

        self.fft.process(&mut fft_buf);

        // Magnitudes of the first frame_size/2 + 1 real bins.
        let n_bins = self.config.frame_size / 2;
        let magnitudes: Vec<f32> = fft_buf[..=n_bins].iter().map(|c| c.norm()).collect();

        // Log-compressed mel band energies, floored so silence cannot
        // produce -inf. The bank covers bins 0..frame_size/2; the Nyquist
        // bin is not banked.
        let log_mels: Vec<f32> = self
            .mel_filters
            .iter()
            .map(|filter| {
                let e: f32 = filter.iter().zip(&magnitudes).map(|(w, m)| w * m).sum();
                (e + 1e-10).ln().max(-10.0)
            })
            .collect();

        let mfcc: Vec<f32> = self
            .dct_basis
            .iter()
            .map(|row| row.iter().zip(&log_mels).map(|(b, e)| b * e).sum())
            .collect();

        SpectralFeatures {
            mfcc,
            energy,
            pitch_hz: pitch::autocorrelation_pitch(frame, self.config.sample_rate),
            spectral_centroid_hz: spectral_centroid(&magnitudes, &self.config),
            zero_crossing_rate: pitch::zero_crossing_rate(frame),
        }
    }
}

/// Magnitude-weighted mean frequency of the spectrum; 0.0 when the spectrum
/// sums to zero.
fn spectral_centroid(magnitudes: &[f32], config: &AnalyzerConfig) -> f32 {
    let hz_per_bin = config.sample_rate as f32 / config.frame_size as f32;
    let total: f32 = magnitudes.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    let weighted: f32 = magnitudes
        .iter()
        .enumerate()
        .map(|(k, m)| m * k as f32 * hz_per_bin)
        .sum();
    weighted / total
}
