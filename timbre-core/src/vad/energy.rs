//! Energy-based VAD: a two-state hysteresis machine with hangover.
//!
//! ## Algorithm
//!
//! 1. Compute RMS of the incoming frame.
//! 2. Silent → Speaking only after `min_speech_frames` consecutive frames at
//!    or above `energy_threshold` (rejects transient noise spikes).
//! 3. Speaking → Silent only after `min_silence_frames` consecutive frames
//!    below threshold (rejects mid-word energy dips).
//! 4. After the machine reverts to Silent, keep reporting `Speech` until
//!    `hangover_secs` of stream time have passed since the last energetic
//!    Speaking frame (prevents clipping trailing word endings).

use super::{VadDecision, VoiceActivityDetector};
use crate::audio::chunk::AudioChunk;

/// Tunables for [`EnergyVad`].
#[derive(Debug, Clone)]
pub struct VadConfig {
    /// RMS amplitude threshold. Frames at or above this count as energetic.
    /// Typical range: 0.01–0.05 for a quiet microphone.
    pub energy_threshold: f32,
    /// Consecutive energetic frames required to enter Speaking.
    pub min_speech_frames: u32,
    /// Consecutive quiet frames required to leave Speaking.
    pub min_silence_frames: u32,
    /// How long (stream seconds) to keep reporting speech after the last
    /// energetic frame once the machine has reverted to Silent.
    pub hangover_secs: f64,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            energy_threshold: 0.015,
            min_speech_frames: 3,
            min_silence_frames: 10,
            hangover_secs: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VadState {
    Silent,
    Speaking,
}

/// Per-session energy VAD.
///
/// Owns nothing but small counters; construct one per recording stream and
/// pass it by mutable reference into each classification call.
#[derive(Debug, Clone)]
pub struct EnergyVad {
    config: VadConfig,
    state: VadState,
    /// Consecutive energetic frames observed while Silent.
    speech_run: u32,
    /// Consecutive quiet frames observed while Speaking.
    silence_run: u32,
    /// Stream position in seconds, advanced by each classified chunk.
    clock_secs: f64,
    /// Stream time of the most recent energetic frame seen in Speaking.
    last_speech_at: Option<f64>,
}

impl EnergyVad {
    pub fn new(config: VadConfig) -> Self {
        Self {
            config,
            state: VadState::Silent,
            speech_run: 0,
            silence_run: 0,
            clock_secs: 0.0,
            last_speech_at: None,
        }
    }

    /// Compute the root-mean-square of a sample slice.
    fn rms(samples: &[f32]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
        (sum_sq / samples.len() as f32).sqrt()
    }
}

impl Default for EnergyVad {
    fn default() -> Self {
        Self::new(VadConfig::default())
    }
}

impl VoiceActivityDetector for EnergyVad {
    fn classify(&mut self, chunk: &AudioChunk) -> VadDecision {
        self.clock_secs += chunk.duration_secs();
        let now = self.clock_secs;
        let energetic = Self::rms(&chunk.samples) >= self.config.energy_threshold;

        match self.state {
            VadState::Silent if energetic => {
                self.speech_run += 1;
                if self.speech_run >= self.config.min_speech_frames {
                    self.state = VadState::Speaking;
                    self.silence_run = 0;
                    self.last_speech_at = Some(now);
                }
            }
            VadState::Silent => {
                // Consecutive requirement: any quiet frame restarts the run.
                self.speech_run = 0;
            }
            VadState::Speaking if energetic => {
                self.silence_run = 0;
                self.last_speech_at = Some(now);
            }
            VadState::Speaking => {
                self.silence_run += 1;
                if self.silence_run >= self.config.min_silence_frames {
                    self.state = VadState::Silent;
                    self.speech_run = 0;
                }
            }
        }

        let in_hangover = self
            .last_speech_at
            .map_or(false, |t| now - t <= self.config.hangover_secs);

        if self.state == VadState::Speaking || in_hangover {
            VadDecision::Speech
        } else {
            VadDecision::Silence
        }
    }

    fn reset(&mut self) {
        self.state = VadState::Silent;
        self.speech_run = 0;
        self.silence_run = 0;
        self.clock_secs = 0.0;
        self.last_speech_at = None;
    }
}
