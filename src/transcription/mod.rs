//! # Transcription Module
//!
//! Speech-to-text through the hosted provider.
//!
//! ## Key Components:
//! - **Gateway**: validates client audio, wraps raw PCM in WAV, calls the provider
//! - **Text cleanup**: strips terminal escapes and stray control characters from results
//!
//! Nothing here keeps state between requests: each call owns its buffers and
//! drops them when the response is written.

pub mod gateway; // Raw PCM and file transcription
pub mod text;    // Transcript cleanup

pub use gateway::{RawPcmRequest, TranscriptionGateway};
