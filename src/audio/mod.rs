//! # Audio Format Module
//!
//! Everything the relay knows about audio bytes lives here. Nothing in this
//! module performs I/O.
//!
//! ## Key Components:
//! - **WAV Codec**: wraps raw PCM in a 44-byte RIFF/WAVE header and strips it again
//! - **Profile Validation**: the single supported wire profile and its checks
//!
//! ## Supported Profile:
//! - **Encoding**: `pcm_s16le` (signed 16-bit little-endian linear PCM)
//! - **Channels**: Mono (1 channel)
//! - **Sample Width**: 2 bytes
//! - **Sample Rate**: caller-chosen for transcription, 16kHz for synthesis

pub mod profile; // Supported audio profile and request validation
pub mod wav;     // PCM <-> WAV container codec

pub use profile::{AudioProfile, ProfileError, SampleEncoding};
pub use wav::{decode_wav, encode_wav, WavError, WavHeader};
