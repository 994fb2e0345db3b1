//! Cosine-distance matching of recording-local speakers against the
//! persistent speaker library.
//!
//! All failure modes degrade to "no match": an embedding of the wrong
//! dimension or zero norm is infinitely far from everything, and a recording
//! tag with no library hit under the threshold is simply absent from the
//! result map.

use std::collections::HashMap;

use tracing::debug;

use super::{KnownSpeaker, SpeakerEmbeddingProfile, EMBEDDING_DIM};

/// Default cosine-distance acceptance threshold for library matches.
pub const MATCH_THRESHOLD: f32 = 0.4;

/// A library hit for one recording-local speaker.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeakerMatch {
    /// ID of the matched [`KnownSpeaker`].
    pub id: String,
    /// Cosine distance to that speaker, in [0, 2].
    pub distance: f32,
}

/// Cosine distance between two embeddings: `1 − dot(â, b̂)`, in [0, 2]
/// (0 = identical direction, 1 = orthogonal, 2 = opposite).
///
/// Returns `+∞` when either vector is not exactly [`EMBEDDING_DIM`] long or
/// has zero norm — "no match possible", never an error.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != EMBEDDING_DIM || b.len() != EMBEDDING_DIM {
        return f32::INFINITY;
    }
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return f32::INFINITY;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    1.0 - dot / (norm_a * norm_b)
}

/// Find the closest known speaker, accepted only when its distance is
/// strictly below `threshold`.
///
/// Candidates are scanned in sorted-by-ID order so equal distances resolve
/// identically regardless of how the library was stored.
pub fn find_match(
    embedding: &[f32],
    known: &[KnownSpeaker],
    threshold: f32,
) -> Option<SpeakerMatch> {
    let mut candidates: Vec<&KnownSpeaker> = known.iter().collect();
    candidates.sort_by(|a, b| a.id.cmp(&b.id));

    let mut best: Option<SpeakerMatch> = None;
    for speaker in candidates {
        let distance = cosine_distance(embedding, &speaker.embedding);
        if best.as_ref().map_or(true, |m| distance < m.distance) {
            best = Some(SpeakerMatch {
                id: speaker.id.clone(),
                distance,
            });
        }
    }
    best.filter(|m| m.distance < threshold)
}

/// Match every recording-local speaker profile against the library
/// independently. Tags with no hit under `threshold` are absent from the
/// result — never an error.
pub fn match_all_speakers(
    profiles: &HashMap<String, SpeakerEmbeddingProfile>,
    known: &[KnownSpeaker],
    threshold: f32,
) -> HashMap<String, String> {
    let mut matched = HashMap::new();
    for (tag, profile) in profiles {
        if let Some(hit) = find_match(&profile.embedding, known, threshold) {
            debug!(
                tag = tag.as_str(),
                id = hit.id.as_str(),
                distance = hit.distance,
                "matched recording speaker to library identity"
            );
            matched.insert(tag.clone(), hit.id);
        }
    }
    matched
}
