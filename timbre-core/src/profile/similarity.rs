//! Advisory similarity scoring between two voice profiles.
//!
//! The score lands in roughly [0, 1] and is a ranking signal, not a
//! probability: 0.7 weight on the cosine of the mean-MFCC vectors, 0.3 on a
//! rescaled proximity of the pitch/energy/centroid means.

use super::VoiceProfile;

/// Compare two profiles. Returns 0.0 when either is the empty sentinel —
/// "insufficient audio" never matches anything.
pub fn similarity(a: &VoiceProfile, b: &VoiceProfile) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let mfcc_cosine = cosine(&a.mfcc_mean, &b.mfcc_mean);

    // Weights 0.3/0.2/0.2 sum to 0.7; divide back out so the auxiliary
    // score spans [0, 1] on its own.
    let auxiliary = (0.3 * proximity(a.pitch_mean, b.pitch_mean)
        + 0.2 * proximity(a.energy_mean, b.energy_mean)
        + 0.2 * proximity(a.spectral_centroid_mean, b.spectral_centroid_mean))
        / 0.7;

    0.7 * mfcc_cosine + 0.3 * auxiliary
}

/// Cosine similarity; 0.0 when either vector has zero norm.
fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Inverse normalized distance between two non-negative scalars, in [0, 1].
/// The denominator is floored at 1.0 so a pair of zero means compares as
/// identical rather than dividing by zero.
fn proximity(a: f32, b: f32) -> f32 {
    let denom = a.abs().max(b.abs()).max(1.0);
    1.0 - (a - b).abs() / denom
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectral::SpectralFeatures;
    use approx::assert_relative_eq;

    fn profile(mfcc0: f32, pitch: f32, energy: f32, centroid: f32) -> VoiceProfile {
        let mut mfcc = vec![0.0f32; 13];
        mfcc[0] = mfcc0;
        mfcc[1] = 0.5;
        VoiceProfile::from_frames(
            &[SpectralFeatures {
                mfcc,
                energy,
                pitch_hz: pitch,
                spectral_centroid_hz: centroid,
                zero_crossing_rate: 0.1,
            }],
            13,
        )
    }

    #[test]
    fn self_similarity_is_one() {
        let p = profile(3.0, 180.0, 0.25, 1_200.0);
        assert_relative_eq!(similarity(&p, &p), 1.0, max_relative = 1e-6);
    }

    #[test]
    fn empty_profile_never_matches() {
        let p = profile(3.0, 180.0, 0.25, 1_200.0);
        let empty = VoiceProfile::empty(13);
        assert_eq!(similarity(&p, &empty), 0.0);
        assert_eq!(similarity(&empty, &p), 0.0);
        assert_eq!(similarity(&empty, &empty), 0.0);
    }

    #[test]
    fn closer_profiles_score_higher() {
        let base = profile(3.0, 180.0, 0.25, 1_200.0);
        let near = profile(3.1, 185.0, 0.26, 1_250.0);
        let far = profile(-2.0, 420.0, 0.9, 3_500.0);
        assert!(similarity(&base, &near) > similarity(&base, &far));
    }

    #[test]
    fn proximity_floors_denominator_at_one() {
        // Both tiny: |a − b| / 1.0, nearly identical.
        assert!(proximity(0.01, 0.02) > 0.98);
        assert_relative_eq!(proximity(0.0, 0.0), 1.0);
    }

    #[test]
    fn cosine_of_zero_vector_is_zero() {
        assert_eq!(cosine(&[0.0; 13], &[1.0; 13]), 0.0);
    }
}
