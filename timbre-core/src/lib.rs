//! # timbre-core
//!
//! Reusable voice-fingerprint and speaker-attribution engine SDK.
//!
//! ## Architecture
//!
//! ```text
//! Decoded PCM ──► SpectralAnalyzer ──► per-frame features ──► VoiceProfile
//!                        │
//!                   EnergyVad (per-session speech/silence gate)
//!
//! DiarizationSegments ──► aggregate_speaker_profiles ──► SpeakerEmbeddingProfile
//!                                │
//!                         SpeakerTimeline ──► transcript unit → speaker tag
//!                                │
//!                         find_match / match_all_speakers ──► known-speaker IDs
//! ```
//!
//! Audio decoding, resampling, and neural diarization inference all happen
//! upstream — this crate consumes decoded f32 PCM and diarization output and
//! produces comparable feature vectors plus speaker continuity decisions.
//! Everything here is synchronous and in-memory; the only stateful type is
//! the per-session VAD.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod audio;
pub mod error;
pub mod profile;
pub mod speaker;
pub mod spectral;
pub mod vad;

// Convenience re-exports for downstream crates
pub use audio::chunk::AudioChunk;
pub use error::TimbreError;
pub use profile::{average_profiles, similarity, VoiceProfile};
pub use speaker::matching::{
    cosine_distance, find_match, match_all_speakers, SpeakerMatch, MATCH_THRESHOLD,
};
pub use speaker::timeline::SpeakerTimeline;
pub use speaker::{
    aggregate_speaker_profiles, DiarizationSegment, KnownSpeaker, SpeakerEmbeddingProfile,
    EMBEDDING_DIM,
};
pub use spectral::{AnalyzerConfig, SpectralAnalyzer, SpectralFeatures};
pub use vad::{EnergyVad, VadConfig, VadDecision, VoiceActivityDetector};
