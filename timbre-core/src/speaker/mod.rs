//! Speaker matching engine over neural diarization output.
//!
//! The external diarization engine tags each speech segment with a
//! recording-local speaker tag (`"spk_0"`, `"spk_1"`, …) and a raw
//! embedding. This module turns those into one [`SpeakerEmbeddingProfile`]
//! per tag, resolves which speaker is active at arbitrary timestamps
//! ([`timeline::SpeakerTimeline`]), and matches recording-local tags against
//! the persistent speaker library ([`matching`]).

pub mod matching;
pub mod timeline;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Dimensionality of speaker embeddings produced by the diarization model.
pub const EMBEDDING_DIM: usize = 256;

/// One diarized speech segment. Read-only input from the external engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiarizationSegment {
    /// Recording-local tag; NOT stable across recordings.
    pub speaker_tag: String,
    /// Segment start in seconds from the start of the recording.
    pub start_time: f64,
    /// Segment end in seconds.
    pub end_time: f64,
    /// Engine-reported quality in [0, 1].
    pub quality_score: f64,
    /// Raw speaker embedding, expected to be `EMBEDDING_DIM` long.
    pub embedding: Vec<f32>,
}

impl DiarizationSegment {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Aggregated per-speaker voice signature for one recording.
///
/// Mutated only during accumulation inside
/// [`aggregate_speaker_profiles`], then frozen and handed to storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakerEmbeddingProfile {
    /// The recording-local tag this profile was accumulated under.
    pub speaker_tag: String,
    /// L2-normalized embedding, `EMBEDDING_DIM` floats.
    pub embedding: Vec<f32>,
    /// Summed duration (seconds) of the segments behind this profile.
    pub total_duration: f64,
}

/// A persisted identity from the speaker library. The core only reads
/// these — enrollment and storage live upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnownSpeaker {
    pub id: String,
    pub embedding: Vec<f32>,
}

/// Collapse one recording's segments into one profile per speaker tag.
///
/// Each tag's embedding is the duration-weighted average of its segments'
/// embeddings (`Σ eᵢ·dᵢ / Σ dᵢ`), L2-normalized. Segments with non-positive
/// duration or an unexpected embedding dimension are skipped, not fatal.
///
/// When the diarization engine supplies its own pre-averaged per-speaker
/// embedding in `speaker_db`, that embedding wins (L2-normalized) — the
/// engine has seen more context than this per-recording average — but the
/// locally summed duration is kept either way.
pub fn aggregate_speaker_profiles(
    segments: &[DiarizationSegment],
    speaker_db: Option<&HashMap<String, Vec<f32>>>,
) -> HashMap<String, SpeakerEmbeddingProfile> {
    let mut accumulated: HashMap<String, (Vec<f32>, f64)> = HashMap::new();

    for segment in segments {
        let duration = segment.duration();
        if duration <= 0.0 {
            debug!(
                tag = segment.speaker_tag.as_str(),
                start = segment.start_time,
                end = segment.end_time,
                "skipping segment with non-positive duration"
            );
            continue;
        }
        if segment.embedding.len() != EMBEDDING_DIM {
            debug!(
                tag = segment.speaker_tag.as_str(),
                dim = segment.embedding.len(),
                "skipping segment with unexpected embedding dimension"
            );
            continue;
        }

        let (sum, total) = accumulated
            .entry(segment.speaker_tag.clone())
            .or_insert_with(|| (vec![0.0f32; EMBEDDING_DIM], 0.0));
        for (acc, e) in sum.iter_mut().zip(&segment.embedding) {
            *acc += e * duration as f32;
        }
        *total += duration;
    }

    let mut profiles = HashMap::with_capacity(accumulated.len());
    for (tag, (weighted_sum, total_duration)) in accumulated {
        let mut embedding: Vec<f32> = weighted_sum
            .iter()
            .map(|w| w / total_duration as f32)
            .collect();

        if let Some(pre_averaged) = speaker_db.and_then(|db| db.get(&tag)) {
            if pre_averaged.len() == EMBEDDING_DIM {
                embedding = pre_averaged.clone();
            } else {
                debug!(
                    tag = tag.as_str(),
                    dim = pre_averaged.len(),
                    "ignoring speaker-db embedding with unexpected dimension"
                );
            }
        }

        l2_normalize(&mut embedding);
        profiles.insert(
            tag.clone(),
            SpeakerEmbeddingProfile {
                speaker_tag: tag,
                embedding,
                total_duration,
            },
        );
    }
    profiles
}

/// Scale to unit length in place; a zero vector is left untouched.
pub(crate) fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn basis(dim: usize) -> Vec<f32> {
        let mut v = vec![0.0f32; EMBEDDING_DIM];
        v[dim] = 1.0;
        v
    }

    fn segment(tag: &str, start: f64, end: f64, embedding: Vec<f32>) -> DiarizationSegment {
        DiarizationSegment {
            speaker_tag: tag.into(),
            start_time: start,
            end_time: end,
            quality_score: 0.9,
            embedding,
        }
    }

    #[test]
    fn duration_weighted_average_with_total() {
        // Durations 2 s / 3 s / 1 s on three orthogonal embeddings:
        // weighted mean [2, 3, 1]/6 → normalized [2, 3, 1]/√14.
        let segments = vec![
            segment("spk_0", 0.0, 2.0, basis(0)),
            segment("spk_0", 3.0, 6.0, basis(1)),
            segment("spk_0", 7.0, 8.0, basis(2)),
        ];
        let profiles = aggregate_speaker_profiles(&segments, None);
        let profile = &profiles["spk_0"];

        assert_relative_eq!(profile.total_duration, 6.0);
        let root14 = 14.0f32.sqrt();
        assert_relative_eq!(profile.embedding[0], 2.0 / root14, max_relative = 1e-5);
        assert_relative_eq!(profile.embedding[1], 3.0 / root14, max_relative = 1e-5);
        assert_relative_eq!(profile.embedding[2], 1.0 / root14, max_relative = 1e-5);
    }

    #[test]
    fn malformed_segments_are_skipped_silently() {
        let segments = vec![
            segment("spk_0", 0.0, 2.0, basis(0)),
            // Negative duration
            segment("spk_0", 5.0, 4.0, basis(1)),
            // Wrong embedding dimension
            segment("spk_0", 6.0, 8.0, vec![1.0; 128]),
        ];
        let profiles = aggregate_speaker_profiles(&segments, None);
        let profile = &profiles["spk_0"];
        assert_relative_eq!(profile.total_duration, 2.0);
        assert_relative_eq!(profile.embedding[0], 1.0, max_relative = 1e-6);
    }

    #[test]
    fn tag_with_only_malformed_segments_is_absent() {
        let segments = vec![segment("spk_1", 2.0, 2.0, basis(0))];
        let profiles = aggregate_speaker_profiles(&segments, None);
        assert!(profiles.is_empty());
    }

    #[test]
    fn speaker_db_embedding_preferred_but_duration_kept() {
        let segments = vec![
            segment("spk_0", 0.0, 2.0, basis(0)),
            segment("spk_0", 3.0, 7.0, basis(1)),
        ];
        let mut db = HashMap::new();
        db.insert("spk_0".to_string(), {
            let mut e = vec![0.0f32; EMBEDDING_DIM];
            e[5] = 2.0; // not yet normalized
            e
        });

        let profiles = aggregate_speaker_profiles(&segments, Some(&db));
        let profile = &profiles["spk_0"];
        assert_relative_eq!(profile.total_duration, 6.0);
        assert_relative_eq!(profile.embedding[5], 1.0, max_relative = 1e-6);
        assert_relative_eq!(profile.embedding[0], 0.0);
    }

    #[test]
    fn groups_by_tag_independently() {
        let segments = vec![
            segment("spk_0", 0.0, 1.0, basis(0)),
            segment("spk_1", 1.0, 2.0, basis(1)),
        ];
        let profiles = aggregate_speaker_profiles(&segments, None);
        assert_eq!(profiles.len(), 2);
        assert_relative_eq!(profiles["spk_0"].embedding[0], 1.0, max_relative = 1e-6);
        assert_relative_eq!(profiles["spk_1"].embedding[1], 1.0, max_relative = 1e-6);
    }

    #[test]
    fn segment_serializes_with_camel_case_fields() {
        let seg = segment("spk_0", 0.5, 2.5, basis(3));
        let json = serde_json::to_value(&seg).expect("serialize segment");
        assert_eq!(json["speakerTag"], "spk_0");
        assert!(json.get("startTime").is_some());
        assert!(json.get("qualityScore").is_some());

        let round_trip: DiarizationSegment =
            serde_json::from_value(json).expect("deserialize segment");
        assert_eq!(round_trip.speaker_tag, "spk_0");
        assert_relative_eq!(round_trip.duration(), 2.0);
    }
}
