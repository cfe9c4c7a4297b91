//! # Synthesis Module
//!
//! Text-to-speech through the hosted provider, returned either as raw PCM
//! (header stripped) or as the provider's own container.

pub mod gateway;

pub use gateway::{RawSynthesisRequest, SynthesisGateway};
