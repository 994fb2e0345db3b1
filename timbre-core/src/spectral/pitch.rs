//! Time-domain scalar features: autocorrelation pitch and zero-crossing rate.
//!
//! Both operate on the raw (unwindowed) frame — windowing would bias the
//! autocorrelation peak and the sign-change count.

/// Lower bound of the voiced pitch search range (Hz).
pub const PITCH_MIN_HZ: f32 = 50.0;
/// Upper bound of the voiced pitch search range (Hz).
pub const PITCH_MAX_HZ: f32 = 500.0;

/// Estimate fundamental frequency as the lag maximizing the unnormalized
/// autocorrelation over lags corresponding to 50–500 Hz.
///
/// Returns 0.0 (unvoiced) when the frame is too short to search the full lag
/// range, or when no lag in range correlates positively.
pub(crate) fn autocorrelation_pitch(frame: &[f32], sample_rate: u32) -> f32 {
    let min_lag = (sample_rate as f32 / PITCH_MAX_HZ) as usize;
    let max_lag = (sample_rate as f32 / PITCH_MIN_HZ) as usize;
    if min_lag == 0 || frame.len() <= max_lag {
        return 0.0;
    }

    let mut best_lag = 0usize;
    let mut best_corr = 0.0f32;
    for lag in min_lag..=max_lag {
        let mut corr = 0.0f32;
        for i in 0..frame.len() - lag {
            corr += frame[i] * frame[i + lag];
        }
        if corr > best_corr {
            best_corr = corr;
            best_lag = lag;
        }
    }

    if best_lag == 0 {
        return 0.0;
    }
    sample_rate as f32 / best_lag as f32
}

/// Fraction of sign changes between consecutive samples of the frame.
pub(crate) fn zero_crossing_rate(frame: &[f32]) -> f32 {
    if frame.len() < 2 {
        return 0.0;
    }
    let crossings = frame
        .windows(2)
        .filter(|pair| (pair[0] >= 0.0) != (pair[1] >= 0.0))
        .count();
    crossings as f32 / (frame.len() - 1) as f32
}
