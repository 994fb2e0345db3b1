//! Voice Activity Detection (VAD) abstraction.
//!
//! The `VoiceActivityDetector` trait is the extensibility seam: swap in
//! [`energy::EnergyVad`] (default) or a future neural detector without
//! touching callers. Implementations are stateful per recording session —
//! construct one instance per active capture and `reset()` it between
//! independent streams.

pub mod energy;

pub use energy::{EnergyVad, VadConfig};

use crate::audio::chunk::AudioChunk;

/// Whether a given audio frame contains speech or silence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VadDecision {
    /// Speech is present (including the hangover window after real speech).
    Speech,
    /// The frame is silent or below threshold.
    Silence,
}

impl VadDecision {
    pub fn is_speech(self) -> bool {
        self == VadDecision::Speech
    }
}

/// Trait for all VAD implementations.
///
/// Implementors may be stateful (hysteresis counters, RNN hidden states,
/// etc.). State is scoped to one recording stream; never share an instance
/// across concurrent sessions.
pub trait VoiceActivityDetector: Send + 'static {
    /// Analyse a frame-sized chunk and return a speech/silence decision.
    ///
    /// The chunk's `sample_rate` should match whatever rate this detector
    /// was configured for. Resampling is the caller's responsibility.
    fn classify(&mut self, chunk: &AudioChunk) -> VadDecision;

    /// Reset internal state. Must be called at the start of every new
    /// recording stream so no state leaks between recordings.
    fn reset(&mut self);
}
