//! # wav_to_json
//!
//! Turns a WAV recording into a ready-to-send `/stt_raw` request body, so the
//! relay can be exercised with `curl` without a device.
//!
//! ```text
//! wav_to_json test.wav req.json --lang-hint ru
//! curl -X POST localhost:8000/stt_raw -H 'content-type: application/json' -d @req.json
//! ```
//!
//! Only mono 16-bit PCM input is accepted, matching what the relay accepts.

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::Parser;
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "wav_to_json", version, about = "Convert a WAV file into an /stt_raw request body")]
struct Args {
    /// WAV file to read
    #[arg(default_value = "test.wav")]
    input: PathBuf,

    /// Where to write the JSON request body
    #[arg(default_value = "req.json")]
    output: PathBuf,

    /// Language hint placed in the request
    #[arg(long, default_value = "ru")]
    lang_hint: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct WavInfo {
    channels: u16,
    sample_rate: u32,
    sample_width: u16,
    bytes: usize,
}

#[derive(Debug, Serialize)]
struct SttRawBody {
    pcm_b64: String,
    sample_rate: u32,
    channels: u16,
    sample_width: u16,
    format: &'static str,
    lang_hint: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let (info, body) = build_request(&args.input, &args.lang_hint)?;
    println!("WAV info: {}", serde_json::to_string(&info)?);

    std::fs::write(&args.output, serde_json::to_vec(&body)?)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    println!("Saved request to: {}", args.output.display());

    Ok(())
}

fn build_request(path: &Path, lang_hint: &str) -> Result<(WavInfo, SttRawBody)> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let (header, data) =
        wav::read(&mut reader).with_context(|| format!("{} is not a readable WAV file", path.display()))?;

    let sample_width = header.bits_per_sample / 8;

    if header.channel_count != 1 {
        bail!("WAV must be mono (1 channel), got {} channels", header.channel_count);
    }
    let samples = match data {
        wav::BitDepth::Sixteen(samples) => samples,
        _ => bail!(
            "WAV must be 16-bit (sample_width=2), got {} bits per sample",
            header.bits_per_sample
        ),
    };

    let pcm: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();

    let info = WavInfo {
        channels: header.channel_count,
        sample_rate: header.sampling_rate,
        sample_width,
        bytes: pcm.len(),
    };

    let body = SttRawBody {
        pcm_b64: STANDARD.encode(&pcm),
        sample_rate: header.sampling_rate,
        channels: header.channel_count,
        sample_width,
        format: "pcm_s16le",
        lang_hint: lang_hint.to_string(),
    };

    Ok((info, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufWriter;

    fn write_wav(path: &Path, channels: u16, bits: u16, data: &wav::BitDepth) {
        let header = wav::Header::new(1, channels, 16000, bits);
        let mut writer = BufWriter::new(File::create(path).unwrap());
        wav::write(header, data, &mut writer).unwrap();
    }

    #[test]
    fn test_mono_16bit_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.wav");
        write_wav(&path, 1, 16, &wav::BitDepth::Sixteen(vec![1, -1, 256]));

        let (info, body) = build_request(&path, "kk").unwrap();
        assert_eq!(
            info,
            WavInfo {
                channels: 1,
                sample_rate: 16000,
                sample_width: 2,
                bytes: 6
            }
        );

        assert_eq!(
            STANDARD.decode(&body.pcm_b64).unwrap(),
            vec![0x01, 0x00, 0xFF, 0xFF, 0x00, 0x01]
        );

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["format"], "pcm_s16le");
        assert_eq!(json["lang_hint"], "kk");
        assert_eq!(json["sample_width"], 2);
    }

    #[test]
    fn test_stereo_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        write_wav(&path, 2, 16, &wav::BitDepth::Sixteen(vec![0, 0, 0, 0]));

        let err = build_request(&path, "ru").unwrap_err();
        assert!(err.to_string().contains("mono"));
    }

    #[test]
    fn test_8bit_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("8bit.wav");
        write_wav(&path, 1, 8, &wav::BitDepth::Eight(vec![128, 129]));

        let err = build_request(&path, "ru").unwrap_err();
        assert!(err.to_string().contains("16-bit"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(build_request(&dir.path().join("absent.wav"), "ru").is_err());
    }

    #[test]
    fn test_cli_defaults() {
        let args = Args::parse_from(["wav_to_json"]);
        assert_eq!(args.input, PathBuf::from("test.wav"));
        assert_eq!(args.output, PathBuf::from("req.json"));
        assert_eq!(args.lang_hint, "ru");
    }
}
