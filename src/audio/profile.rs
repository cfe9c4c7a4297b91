//! # Audio Profile Validation
//!
//! The relay accepts exactly one audio profile: linear PCM, signed 16-bit
//! little-endian samples, mono. Anything else is rejected, never converted.
//!
//! ## Key Rust Concepts:
//! - **FromStr**: parsing the wire name (`"pcm_s16le"`) into a typed enum
//! - **Copy types**: `AudioProfile` is small enough to pass by value
//! - **thiserror**: each failure is a distinct, matchable variant

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Message returned to clients for any unsupported profile.
pub const SUPPORTED_PROFILE: &str =
    "only pcm_s16le, mono (channels=1), 16-bit (sample_width=2) audio is supported";

/// Highest sample rate accepted in a request.
pub const MAX_SAMPLE_RATE: i64 = 384_000;

/// Sample rate assumed for synthesized audio.
pub const SYNTHESIS_SAMPLE_RATE: u32 = 16_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("{SUPPORTED_PROFILE}")]
    UnsupportedProfile,

    #[error("sample_rate must be between 1 and {MAX_SAMPLE_RATE}, got {0}")]
    InvalidSampleRate(i64),

    #[error("pcm payload of {len} bytes is not a whole number of {block_align}-byte frames")]
    MisalignedBuffer { len: usize, block_align: usize },
}

/// Sample encoding named on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleEncoding {
    /// Signed 16-bit little-endian linear PCM
    #[serde(rename = "pcm_s16le")]
    PcmS16Le,
}

impl SampleEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            SampleEncoding::PcmS16Le => "pcm_s16le",
        }
    }
}

impl fmt::Display for SampleEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SampleEncoding {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pcm_s16le" => Ok(SampleEncoding::PcmS16Le),
            _ => Err(ProfileError::UnsupportedProfile),
        }
    }
}

/// Format of a PCM stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioProfile {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub encoding: SampleEncoding,
}

impl AudioProfile {
    /// The single supported profile at the given sample rate.
    pub fn mono_s16le(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            channels: 1,
            bits_per_sample: 16,
            encoding: SampleEncoding::PcmS16Le,
        }
    }

    /// Profile reported for every synthesis response.
    pub fn synthesis() -> Self {
        Self::mono_s16le(SYNTHESIS_SAMPLE_RATE)
    }

    /// Bytes per sample (the wire's `sample_width`).
    pub fn sample_width(&self) -> u16 {
        self.bits_per_sample / 8
    }

    /// Bytes per interleaved frame.
    pub fn block_align(&self) -> usize {
        usize::from(self.sample_width()) * usize::from(self.channels)
    }

    /// Check that a PCM buffer holds whole frames only.
    pub fn check_alignment(&self, pcm: &[u8]) -> Result<(), ProfileError> {
        let block_align = self.block_align();
        if block_align == 0 || pcm.len() % block_align != 0 {
            return Err(ProfileError::MisalignedBuffer {
                len: pcm.len(),
                block_align,
            });
        }
        Ok(())
    }
}

/// Accepts exactly `{pcm_s16le, channels = 1, sample_width = 2}`.
pub fn validate_profile(format: &str, channels: i64, sample_width: i64) -> Result<(), ProfileError> {
    let encoding: SampleEncoding = format.parse()?;
    if encoding != SampleEncoding::PcmS16Le || channels != 1 || sample_width != 2 {
        return Err(ProfileError::UnsupportedProfile);
    }
    Ok(())
}

pub fn validate_sample_rate(sample_rate: i64) -> Result<u32, ProfileError> {
    if !(1..=MAX_SAMPLE_RATE).contains(&sample_rate) {
        return Err(ProfileError::InvalidSampleRate(sample_rate));
    }
    u32::try_from(sample_rate).map_err(|_| ProfileError::InvalidSampleRate(sample_rate))
}
