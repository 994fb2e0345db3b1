//! Input boundary types for decoded audio.
//!
//! The external decoding layer (container/codec handling, channel mixdown,
//! resampling) delivers mono f32 PCM at the pipeline's configured rate.
//! Nothing in this crate touches compressed audio or converts sample rates.

pub mod chunk;
