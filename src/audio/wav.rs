//! # WAV Container Codec
//!
//! Converts between raw interleaved PCM samples and the canonical 44-byte-header
//! RIFF/WAVE container, and back.
//!
//! ## Header Layout (all integers little-endian):
//! ```text
//!  0..4   "RIFF"            4..8   36 + data_size      8..12  "WAVE"
//! 12..16  "fmt "           16..20  16 (fmt chunk size) 20..22  1 (PCM tag)
//! 22..24  channels         24..28  sample_rate         28..32  byte_rate
//! 32..34  block_align      34..36  bits_per_sample
//! 36..40  "data"           40..44  data_size           44..    PCM payload
//! ```
//!
//! Every header field is derived from the payload length and the audio profile,
//! so the header carries no state of its own.

use byteorder::{ByteOrder, LittleEndian};
use thiserror::Error;

/// Size of the canonical PCM WAV header.
pub const HEADER_LEN: usize = 44;

/// The codec only writes 16-bit samples.
pub const BITS_PER_SAMPLE: u16 = 16;

const PCM_FORMAT_TAG: u16 = 1;
const FMT_CHUNK_LEN: u32 = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WavError {
    /// The container is too short to hold a header followed by any payload.
    #[error("malformed WAV container: {len} bytes, need more than {HEADER_LEN}")]
    MalformedContainer { len: usize },
}

/// Wrap a PCM buffer in a canonical WAV container.
///
/// ## Parameters:
/// - **pcm**: interleaved signed 16-bit little-endian samples
/// - **sample_rate**: samples per second per channel
/// - **channels**: number of interleaved channels
///
/// ## Returns:
/// A new buffer of exactly `44 + pcm.len()` bytes.
pub fn encode_wav(pcm: &[u8], sample_rate: u32, channels: u16) -> Vec<u8> {
    let mut wav = Vec::with_capacity(HEADER_LEN + pcm.len());
    wav.extend_from_slice(&build_header(pcm.len(), sample_rate, channels));
    wav.extend_from_slice(pcm);
    wav
}

/// Strip the 44-byte header and return the PCM payload.
///
/// The header itself is trusted as-is: magic tags and format fields are not
/// checked, only that some payload follows the header.
pub fn decode_wav(wav: &[u8]) -> Result<&[u8], WavError> {
    if wav.len() <= HEADER_LEN {
        return Err(WavError::MalformedContainer { len: wav.len() });
    }
    Ok(&wav[HEADER_LEN..])
}

fn build_header(data_len: usize, sample_rate: u32, channels: u16) -> [u8; HEADER_LEN] {
    let bytes_per_sample = BITS_PER_SAMPLE / 8;
    // Request bodies are capped far below 4 GiB, so saturation never triggers in practice.
    let data_size = u32::try_from(data_len).unwrap_or(u32::MAX);
    let block_align = channels.saturating_mul(bytes_per_sample);
    let byte_rate = sample_rate.saturating_mul(u32::from(block_align));

    let mut header = [0u8; HEADER_LEN];

    header[0..4].copy_from_slice(b"RIFF");
    LittleEndian::write_u32(&mut header[4..8], data_size.saturating_add(36));
    header[8..12].copy_from_slice(b"WAVE");

    header[12..16].copy_from_slice(b"fmt ");
    LittleEndian::write_u32(&mut header[16..20], FMT_CHUNK_LEN);
    LittleEndian::write_u16(&mut header[20..22], PCM_FORMAT_TAG);
    LittleEndian::write_u16(&mut header[22..24], channels);
    LittleEndian::write_u32(&mut header[24..28], sample_rate);
    LittleEndian::write_u32(&mut header[28..32], byte_rate);
    LittleEndian::write_u16(&mut header[32..34], block_align);
    LittleEndian::write_u16(&mut header[34..36], BITS_PER_SAMPLE);

    header[36..40].copy_from_slice(b"data");
    LittleEndian::write_u32(&mut header[40..44], data_size);

    header
}

/// Fields of a canonical 44-byte header, read without any validation.
///
/// Used to report what a provider actually sent; decoding never depends on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavHeader {
    pub riff_tag: [u8; 4],
    pub wave_tag: [u8; 4],
    pub format_tag: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub data_size: u32,
}

impl WavHeader {
    pub fn parse(wav: &[u8]) -> Result<Self, WavError> {
        if wav.len() < HEADER_LEN {
            return Err(WavError::MalformedContainer { len: wav.len() });
        }

        let mut riff_tag = [0u8; 4];
        riff_tag.copy_from_slice(&wav[0..4]);
        let mut wave_tag = [0u8; 4];
        wave_tag.copy_from_slice(&wav[8..12]);

        Ok(Self {
            riff_tag,
            wave_tag,
            format_tag: LittleEndian::read_u16(&wav[20..22]),
            channels: LittleEndian::read_u16(&wav[22..24]),
            sample_rate: LittleEndian::read_u32(&wav[24..28]),
            byte_rate: LittleEndian::read_u32(&wav[28..32]),
            block_align: LittleEndian::read_u16(&wav[32..34]),
            bits_per_sample: LittleEndian::read_u16(&wav[34..36]),
            data_size: LittleEndian::read_u32(&wav[40..44]),
        })
    }

    /// True when the magic tags read "RIFF" and "WAVE".
    pub fn has_riff_magic(&self) -> bool {
        &self.riff_tag == b"RIFF" && &self.wave_tag == b"WAVE"
    }

    /// Whether the header declares the given linear PCM layout.
    pub fn matches(&self, sample_rate: u32, channels: u16, bits_per_sample: u16) -> bool {
        self.format_tag == PCM_FORMAT_TAG
            && self.sample_rate == sample_rate
            && self.channels == channels
            && self.bits_per_sample == bits_per_sample
    }
}
