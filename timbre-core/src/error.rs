use thiserror::Error;

/// All errors produced by timbre-core.
///
/// Degraded inputs (too little audio, malformed segments, zero-norm
/// embeddings) deliberately do NOT surface here — they fall back to the
/// empty profile, an infinite distance, or an absent map entry so callers
/// can skip classification instead of aborting a recording.
#[derive(Debug, Error)]
pub enum TimbreError {
    #[error("invalid analyzer config: {0}")]
    InvalidConfig(String),

    #[error("sample rate mismatch: analyzer expects {expected} Hz, chunk is {actual} Hz")]
    SampleRateMismatch { expected: u32, actual: u32 },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, TimbreError>;
