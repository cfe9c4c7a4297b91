//! # Speech Provider Capability
//!
//! The relay talks to exactly one hosted speech service. Gateways only see the
//! [`SpeechProvider`] trait, so tests can swap the network client for an
//! in-memory double.
//!
//! ## Key Components:
//! - **SpeechProvider**: transcribe a file, synthesize text
//! - **AudioFile**: a named, typed blob ready for multipart upload
//! - **SpeechFormat**: container formats the synthesis endpoint can return
//! - **OpenAiProvider**: the production implementation over HTTPS

pub mod openai;

#[cfg(test)]
pub mod fake;

pub use openai::OpenAiProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Longest provider error body kept in an error message.
const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

impl ProviderError {
    pub(crate) fn status(status: u16, body: &str) -> Self {
        let body = if body.chars().count() > MAX_ERROR_BODY_CHARS {
            let truncated: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            format!("{}...", truncated)
        } else {
            body.to_string()
        };
        ProviderError::Status { status, body }
    }
}

/// Audio container formats that can be requested from synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeechFormat {
    #[default]
    Mp3,
    Wav,
}

impl SpeechFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeechFormat::Mp3 => "mp3",
            SpeechFormat::Wav => "wav",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            SpeechFormat::Mp3 => "audio/mpeg",
            SpeechFormat::Wav => "audio/wav",
        }
    }
}

/// A file-like upload: name, MIME type and bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl AudioFile {
    /// A WAV container built by the relay itself.
    pub fn wav(bytes: Vec<u8>) -> Self {
        Self {
            file_name: "audio.wav".to_string(),
            mime_type: "audio/wav".to_string(),
            bytes,
        }
    }

    /// A client upload; the MIME type is guessed from the extension.
    pub fn upload(file_name: Option<&str>, bytes: Vec<u8>) -> Self {
        let file_name = file_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or("audio.wav")
            .to_string();
        let mime_type = mime_for(&file_name).to_string();
        Self {
            file_name,
            mime_type,
            bytes,
        }
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("wav") => "audio/wav",
        Some("mp3") | Some("mpga") | Some("mpeg") => "audio/mpeg",
        Some("m4a") => "audio/m4a",
        Some("mp4") => "audio/mp4",
        Some("webm") => "audio/webm",
        Some("ogg") | Some("oga") => "audio/ogg",
        Some("flac") => "audio/flac",
        _ => "application/octet-stream",
    }
}

/// Capability interface over the hosted speech service.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Submit a file for transcription.
    ///
    /// Returns the provider's response body as JSON; a body that is not JSON
    /// comes back as a JSON string.
    async fn transcribe(
        &self,
        file: AudioFile,
        model: &str,
        language: Option<&str>,
    ) -> Result<serde_json::Value, ProviderError>;

    /// Request synthesized speech in the given container format.
    async fn synthesize(
        &self,
        text: &str,
        model: &str,
        voice: &str,
        format: SpeechFormat,
    ) -> Result<Vec<u8>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_mime_detection() {
        assert_eq!(AudioFile::upload(Some("mic.wav"), vec![]).mime_type, "audio/wav");
        assert_eq!(AudioFile::upload(Some("Note.MP3"), vec![]).mime_type, "audio/mpeg");
        assert_eq!(AudioFile::upload(Some("clip.webm"), vec![]).mime_type, "audio/webm");
        assert_eq!(
            AudioFile::upload(Some("blob"), vec![]).mime_type,
            "application/octet-stream"
        );
    }

    #[test]
    fn test_upload_default_name() {
        let file = AudioFile::upload(None, vec![1, 2]);
        assert_eq!(file.file_name, "audio.wav");
        assert_eq!(file.mime_type, "audio/wav");

        let file = AudioFile::upload(Some("  "), vec![]);
        assert_eq!(file.file_name, "audio.wav");
    }

    #[test]
    fn test_speech_format() {
        assert_eq!(SpeechFormat::default(), SpeechFormat::Mp3);
        assert_eq!(SpeechFormat::Wav.content_type(), "audio/wav");
        let format: SpeechFormat = serde_json::from_str("\"wav\"").unwrap();
        assert_eq!(format, SpeechFormat::Wav);
        assert!(serde_json::from_str::<SpeechFormat>("\"ogg\"").is_err());
    }

    #[test]
    fn test_status_error_truncates_body() {
        let long = "x".repeat(2000);
        match ProviderError::status(500, &long) {
            ProviderError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body.len(), MAX_ERROR_BODY_CHARS + 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
